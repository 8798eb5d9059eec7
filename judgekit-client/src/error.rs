use crate::encode::EncodingError;

#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("judge responded with HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("submission did not finish after {attempts} polling attempts")]
    Timeout { attempts: u32 },

    #[error("execution was cancelled")]
    Cancelled,

    #[error("invalid test input: {0}")]
    Encoding(#[from] EncodingError),

    #[error("malformed judge response: {0}")]
    Decode(String),
}

impl JudgeError {
    /// The judge could not be reached or refused the request outright.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            JudgeError::Configuration(_) | JudgeError::Transport(_) | JudgeError::Http { .. }
        )
    }

    /// Errors that can only happen after the judge accepted a submission.
    pub fn proves_contact(&self) -> bool {
        matches!(self, JudgeError::Timeout { .. } | JudgeError::Decode(_))
    }
}
