use crate::common::{ExecutionReport, OverallStatus, Provider, TestCase};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Validate, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    #[validate(length(min = 1, max = 65536))]
    pub code: String,

    #[validate(length(min = 1, max = 32))]
    pub language: String,

    #[validate(length(min = 1, max = 64))]
    pub test_cases: Option<Vec<TestCase>>,
}

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct SyntaxRequest {
    #[validate(length(min = 1, max = 65536))]
    pub code: String,

    #[validate(length(min = 1, max = 32))]
    pub language: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSummary {
    pub passed: usize,
    pub total: usize,
    pub status: OverallStatus,
    pub language: String,
    pub test_cases: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionMetadata {
    pub service: String,
    pub provider: Provider,
    pub executed_at: DateTime<Utc>,
    pub has_compilation_error: bool,
    pub has_runtime_error: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteOutput {
    pub success: bool,
    pub execution: ExecutionReport,
    pub summary: ExecutionSummary,
    pub metadata: ExecutionMetadata,
}

impl ExecuteOutput {
    pub fn new(service: &str, language: &str, execution: ExecutionReport) -> Self {
        let summary = ExecutionSummary {
            passed: execution.total_passed,
            total: execution.total_tests,
            status: execution.overall_status,
            language: language.to_owned(),
            test_cases: execution.total_tests,
        };
        let metadata = ExecutionMetadata {
            service: service.to_owned(),
            provider: execution.provider,
            executed_at: Utc::now(),
            has_compilation_error: execution.compilation_error.is_some(),
            has_runtime_error: execution.runtime_error.is_some(),
        };
        Self {
            success: execution.success,
            execution,
            summary,
            metadata,
        }
    }
}

/// The two-sum cases used when a request carries no test cases.
pub fn sample_test_cases() -> Vec<TestCase> {
    vec![
        TestCase::new("1", "nums = [2,7,11,15], target = 9", "[0,1]"),
        TestCase::new("2", "nums = [3,2,4], target = 6", "[1,2]"),
        TestCase::new("3", "nums = [3,3], target = 6", "[0,1]"),
    ]
}
