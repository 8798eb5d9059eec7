//! Payloads of the Judge0 REST API.
//!
//! Text fields travel base64-encoded (`base64_encoded=true`), the decoding
//! happens in the client.

use serde::{Deserialize, Serialize};

pub const STATUS_IN_QUEUE: u32 = 1;
pub const STATUS_PROCESSING: u32 = 2;
pub const STATUS_ACCEPTED: u32 = 3;
pub const STATUS_WRONG_ANSWER: u32 = 4;
pub const STATUS_TIME_LIMIT_EXCEEDED: u32 = 5;
pub const STATUS_COMPILATION_ERROR: u32 = 6;
pub const STATUS_INTERNAL_ERROR: u32 = 13;
pub const STATUS_EXEC_FORMAT_ERROR: u32 = 14;

/// Anything past "Processing" is final.
pub fn is_terminal(status_id: u32) -> bool {
    status_id > STATUS_PROCESSING
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    InQueue,
    Processing,
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    CompilationError,
    /// ids 7..=12: SIGSEGV, SIGXFSZ, SIGFPE, SIGABRT, NZEC, other
    RuntimeError,
    InternalError,
    ExecFormatError,
    Unknown,
}

impl StatusKind {
    pub fn from_id(id: u32) -> Self {
        match id {
            STATUS_IN_QUEUE => StatusKind::InQueue,
            STATUS_PROCESSING => StatusKind::Processing,
            STATUS_ACCEPTED => StatusKind::Accepted,
            STATUS_WRONG_ANSWER => StatusKind::WrongAnswer,
            STATUS_TIME_LIMIT_EXCEEDED => StatusKind::TimeLimitExceeded,
            STATUS_COMPILATION_ERROR => StatusKind::CompilationError,
            7..=12 => StatusKind::RuntimeError,
            STATUS_INTERNAL_ERROR => StatusKind::InternalError,
            STATUS_EXEC_FORMAT_ERROR => StatusKind::ExecFormatError,
            _ => StatusKind::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubmissionRequest {
    pub source_code: String,
    pub language_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,
    pub cpu_time_limit: f64,
    pub memory_limit: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wall_time_limit: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubmissionOutput {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionStatus {
    pub id: u32,
    pub description: String,
}

/// Judge0 reports `time` as a decimal string, some deployments as a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeField {
    Number(f64),
    Text(String),
}

impl TimeField {
    pub fn seconds(&self) -> Option<f64> {
        match self {
            TimeField::Number(n) => Some(*n),
            TimeField::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionOutput {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub status: Option<SubmissionStatus>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub time: Option<TimeField>,
    /// kilobytes
    #[serde(default)]
    pub memory: Option<u64>,
}
