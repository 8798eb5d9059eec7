use crate::abort::Abort;
use crate::config;
use crate::decode::{self, SubmissionResult};
use crate::encode::Submission;
use crate::error::JudgeError;

use judgekit_protocol::common::LanguageInfo;
use judgekit_protocol::judge0::{self, CreateSubmissionOutput, CreateSubmissionRequest, SubmissionOutput};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::{debug, error, trace, warn};

/// The raw Judge0 endpoints.
#[async_trait]
pub trait JudgeBackend: Send + Sync {
    async fn create_submission(&self, request: &CreateSubmissionRequest) -> Result<CreateSubmissionOutput, JudgeError>;

    async fn get_submission(&self, token: &str) -> Result<SubmissionOutput, JudgeError>;

    async fn list_languages(&self) -> Result<Vec<LanguageInfo>, JudgeError>;
}

pub struct HttpBackend {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &config::Judge) -> Result<Self, JudgeError> {
        let credential = config.credential().ok_or_else(|| {
            JudgeError::Configuration("judge API key is not configured (set JUDGE0_API_KEY)".into())
        })?;

        let header = |name: &str, value: &str| -> Result<(HeaderName, HeaderValue), JudgeError> {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| JudgeError::Configuration(format!("invalid header name `{}`: {}", name, err)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| JudgeError::Configuration(format!("invalid value for header `{}`: {}", name.as_str(), err)))?;
            Ok((name, value))
        };

        let mut headers = HeaderMap::new();
        let (name, mut value) = header(&config.auth_header, credential.expose())?;
        value.set_sensitive(true);
        headers.insert(name, value);
        let (name, value) = header(&config.host_header, &config.api_host)?;
        headers.insert(name, value);

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| JudgeError::Configuration(format!("failed to build http client: {}", err)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, JudgeError> {
        let res = req.send().await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            error!(?status, %body, "judge rejected the request");
            return Err(JudgeError::Http {
                status: status.as_u16(),
                body,
            });
        }

        res.json::<T>().await.map_err(|err| JudgeError::Decode(err.to_string()))
    }
}

#[async_trait]
impl JudgeBackend for HttpBackend {
    async fn create_submission(&self, request: &CreateSubmissionRequest) -> Result<CreateSubmissionOutput, JudgeError> {
        let url = format!("{}/submissions", self.base_url);
        let req = self
            .http_client
            .post(&url)
            .query(&[("base64_encoded", "true"), ("wait", "false")])
            .json(request);
        self.send(req).await
    }

    async fn get_submission(&self, token: &str) -> Result<SubmissionOutput, JudgeError> {
        let url = format!("{}/submissions/{}", self.base_url, token);
        let req = self.http_client.get(&url).query(&[("base64_encoded", "true")]);
        self.send(req).await
    }

    async fn list_languages(&self) -> Result<Vec<LanguageInfo>, JudgeError> {
        let url = format!("{}/languages", self.base_url);
        self.send(self.http_client.get(&url)).await
    }
}

/// Opaque handle of a created submission, consumed by [`JudgeClient::poll`].
#[derive(Debug)]
pub struct SubmissionHandle {
    token: String,
}

impl SubmissionHandle {
    pub fn token(&self) -> &str {
        &self.token
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn from_config(config: &config::Judge) -> Self {
        Self {
            interval: config.poll_interval(),
            max_attempts: config.max_poll_attempts,
        }
    }
}

pub struct JudgeClient {
    backend: Arc<dyn JudgeBackend>,
    policy: PollPolicy,
}

impl JudgeClient {
    /// Fails with [`JudgeError::Configuration`] when no credential is configured.
    pub fn new(config: &config::Judge) -> Result<Self, JudgeError> {
        let backend = HttpBackend::new(config)?;
        Ok(Self::with_backend(Arc::new(backend), PollPolicy::from_config(config)))
    }

    pub fn with_backend(backend: Arc<dyn JudgeBackend>, policy: PollPolicy) -> Self {
        Self { backend, policy }
    }

    #[tracing::instrument(skip_all, fields(language_id = submission.language_id))]
    pub async fn submit(&self, submission: &Submission) -> Result<SubmissionHandle, JudgeError> {
        let request = CreateSubmissionRequest {
            source_code: base64::encode(&submission.source_code),
            language_id: submission.language_id,
            stdin: submission.stdin.as_ref().map(base64::encode),
            cpu_time_limit: submission.limits.cpu_time_limit,
            memory_limit: submission.limits.memory_limit,
            wall_time_limit: submission.limits.wall_time_limit,
        };

        let output = self.backend.create_submission(&request).await?;
        if output.token.trim().is_empty() {
            return Err(JudgeError::Decode("judge returned an empty submission token".into()));
        }

        debug!(token = %output.token, "submission created");
        Ok(SubmissionHandle { token: output.token })
    }

    /// Polls until the submission reaches a terminal status.
    ///
    /// Issues at most `max_attempts` requests, sleeping `interval` between
    /// them but not after the last one.
    #[tracing::instrument(skip_all, fields(token = %handle.token))]
    pub async fn poll(&self, handle: SubmissionHandle, abort: &Abort) -> Result<SubmissionResult, JudgeError> {
        let PollPolicy { interval, max_attempts } = self.policy;

        for attempt in 1..=max_attempts {
            let raw = abort.race(self.backend.get_submission(&handle.token)).await??;

            let status_id = raw.status.as_ref().map(|status| status.id);
            match status_id {
                Some(id) if judge0::is_terminal(id) => {
                    debug!(attempt, status = id, "submission finished");
                    return decode::decode(raw);
                }
                _ => trace!(attempt, status = ?status_id, "submission pending"),
            }

            if attempt < max_attempts {
                abort.sleep(interval).await?;
            }
        }

        warn!(attempts = max_attempts, "submission did not finish in time");
        Err(JudgeError::Timeout { attempts: max_attempts })
    }

    pub async fn execute(&self, submission: &Submission, abort: &Abort) -> Result<SubmissionResult, JudgeError> {
        let handle = abort.race(self.submit(submission)).await??;
        self.poll(handle, abort).await
    }

    #[tracing::instrument(skip_all, err)]
    pub async fn languages(&self) -> Result<Vec<LanguageInfo>, JudgeError> {
        self.backend.list_languages().await
    }
}
