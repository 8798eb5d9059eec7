use serde::{Deserialize, Serialize};

/// A single input/expected-output pair of a problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: String,
    pub input: String,
    pub expected_output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

impl TestCase {
    pub fn new(id: impl Into<String>, input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            input: input.into(),
            expected_output: expected_output.into(),
            description: None,
            hidden: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub test_cases: Vec<TestCase>,
}

impl Problem {
    pub fn from_cases(test_cases: Vec<TestCase>) -> Self {
        Self {
            id: None,
            title: None,
            test_cases,
        }
    }
}

/// Classification of a single case, independent of the judge's wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Accepted,
    WrongAnswer,
    CompilationError,
    RuntimeError,
    TimeLimitExceeded,
    /// The judge itself failed: internal error, exec format error or an unknown status.
    JudgeFailure,
    /// The case never produced a judge result: bad input, poll timeout, lost connection.
    ExecutionError,
}

impl Outcome {
    pub fn is_error(self) -> bool {
        !matches!(self, Outcome::Accepted | Outcome::WrongAnswer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseVerdict {
    pub test_case_id: String,
    pub passed: bool,
    pub input: String,
    pub expected: String,
    pub actual: String,
    /// seconds
    pub execution_time: f64,
    #[serde(rename = "memoryKB", default, skip_serializing_if = "Option::is_none")]
    pub memory_kb: Option<u64>,
    pub status: String,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Authoritative,
    Heuristic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Passed,
    Failed,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub success: bool,
    pub total_passed: usize,
    pub total_tests: usize,
    pub per_case: Vec<CaseVerdict>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compilation_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_error: Option<String>,
    pub provider: Provider,
    pub overall_status: OverallStatus,
    #[serde(default)]
    pub cancelled: bool,
}

impl ExecutionReport {
    /// Builds a report from the verdicts of a (possibly partial) run.
    ///
    /// `total_tests` is the size of the submitted suite, which may be larger
    /// than `per_case` when the run stopped early.
    pub fn from_verdicts(provider: Provider, total_tests: usize, per_case: Vec<CaseVerdict>) -> Self {
        let total_passed = per_case.iter().filter(|v| v.passed).count();
        let mut report = Self {
            success: total_passed > 0,
            total_passed,
            total_tests,
            per_case,
            compilation_error: None,
            runtime_error: None,
            provider,
            overall_status: OverallStatus::Error,
            cancelled: false,
        };
        report.overall_status = report.classify();
        report
    }

    /// A run that failed before any case could be judged.
    pub fn failed(provider: Provider, total_tests: usize, message: impl Into<String>) -> Self {
        let mut report = Self::from_verdicts(provider, total_tests, Vec::new());
        report.runtime_error = Some(message.into());
        report.overall_status = OverallStatus::Error;
        report
    }

    pub fn with_compilation_error(mut self, message: impl Into<String>) -> Self {
        self.compilation_error = Some(message.into());
        self.overall_status = self.classify();
        self
    }

    pub fn mark_cancelled(mut self) -> Self {
        self.cancelled = true;
        self
    }

    fn classify(&self) -> OverallStatus {
        if self.total_tests > 0 && self.total_passed == self.total_tests {
            return OverallStatus::Passed;
        }
        if self.total_passed > 0 {
            return OverallStatus::Failed;
        }
        if self.compilation_error.is_some() || self.runtime_error.is_some() {
            return OverallStatus::Error;
        }
        let any_wrong = self.per_case.iter().any(|v| !v.outcome.is_error());
        if any_wrong {
            OverallStatus::Failed
        } else {
            OverallStatus::Error
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub available: bool,
    pub status: HealthState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntaxCheck {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
