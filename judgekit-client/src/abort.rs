use crate::error::JudgeError;

use std::future::Future;
use std::time::Duration;

use futures::future;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

/// Caller-side limits on a run: an optional deadline and an optional cancellation token.
#[derive(Debug, Clone, Default)]
pub struct Abort {
    deadline: Option<Instant>,
    token: Option<CancellationToken>,
}

impl Abort {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn is_aborted(&self) -> bool {
        let expired = self.deadline.map_or(false, |d| Instant::now() >= d);
        let cancelled = self.token.as_ref().map_or(false, CancellationToken::is_cancelled);
        expired || cancelled
    }

    pub fn check(&self) -> Result<(), JudgeError> {
        if self.is_aborted() {
            Err(JudgeError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Runs `fut` unless the deadline passes or the token fires first.
    pub async fn race<F: Future>(&self, fut: F) -> Result<F::Output, JudgeError> {
        self.check()?;

        let cancelled = async {
            match &self.token {
                Some(token) => token.cancelled().await,
                None => future::pending().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => time::sleep_until(deadline).await,
                None => future::pending().await,
            }
        };

        tokio::select! {
            output = fut => Ok(output),
            _ = cancelled => Err(JudgeError::Cancelled),
            _ = expired => Err(JudgeError::Cancelled),
        }
    }

    pub async fn sleep(&self, duration: Duration) -> Result<(), JudgeError> {
        self.race(time::sleep(duration)).await
    }
}
