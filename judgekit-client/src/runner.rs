use crate::abort::Abort;
use crate::client::JudgeClient;
use crate::decode::{self, SubmissionResult};
use crate::encode::{self, Limits};
use crate::error::JudgeError;
use crate::lang::{self, Language};

use judgekit_protocol::common::{CaseVerdict, ExecutionReport, Outcome, Provider, TestCase};
use judgekit_protocol::judge0::StatusKind;

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

pub const EMPTY_SOURCE: &str = "source code cannot be empty";
pub const NO_TEST_CASES: &str = "at least one test case is required";
pub const COMPILATION_FAILED: &str = "Compilation failed";
pub const EXECUTION_ERROR: &str = "Execution Error";

/// Runs a test suite against the remote judge, one submission per case.
pub struct SuiteRunner {
    client: Arc<JudgeClient>,
    limits: Limits,
    concurrency: usize,
}

impl SuiteRunner {
    pub fn new(client: Arc<JudgeClient>, limits: Limits, concurrency: usize) -> Self {
        Self {
            client,
            limits,
            concurrency: concurrency.max(1),
        }
    }

    pub fn client(&self) -> &Arc<JudgeClient> {
        &self.client
    }

    /// Judges `cases` in order.
    ///
    /// Returns `Err` only when the judge could not be reached before it
    /// answered anything; every later failure becomes a verdict.
    #[tracing::instrument(skip_all, fields(language = %language, cases = cases.len()))]
    pub async fn run(
        &self,
        source: &str,
        language: &str,
        cases: &[TestCase],
        abort: &Abort,
    ) -> Result<ExecutionReport, JudgeError> {
        let total = cases.len();
        if source.trim().is_empty() {
            return Ok(ExecutionReport::failed(Provider::Authoritative, total, EMPTY_SOURCE));
        }
        if cases.is_empty() {
            return Ok(ExecutionReport::failed(Provider::Authoritative, total, NO_TEST_CASES));
        }

        let language = lang::resolve(language);
        let mut verdicts = Vec::with_capacity(total);
        let mut contacted = false;

        // Sequential until the judge has returned a result once; that first
        // judged case also decides whether the program compiles at all.
        let mut next = 0;
        while next < total {
            let case = &cases[next];
            next += 1;

            match self.judge_case(source, language, case, abort).await {
                Ok(result) => {
                    if result.is_compilation_error() {
                        return Ok(compilation_failed(total, verdicts, case, &result));
                    }
                    verdicts.push(verdict(case, &result));
                    break;
                }
                Err(JudgeError::Cancelled) => return Ok(partial(total, verdicts, true)),
                Err(err) if !contacted && err.is_unreachable() => {
                    warn!(case = %case.id, %err, "judge is unreachable");
                    return Err(err);
                }
                Err(err) => {
                    contacted |= err.proves_contact();
                    verdicts.push(failure(case, &err));
                }
            }
        }

        let rest = &cases[next..];
        let pending: Vec<_> = rest
            .iter()
            .map(|case| async move { (case, self.judge_case(source, language, case, abort).await) })
            .collect();
        let mut results = stream::iter(pending).buffered(self.concurrency);

        let mut cancelled = false;
        while let Some((case, outcome)) = results.next().await {
            match outcome {
                Ok(result) => verdicts.push(verdict(case, &result)),
                Err(JudgeError::Cancelled) => {
                    cancelled = true;
                    break;
                }
                Err(err) => verdicts.push(failure(case, &err)),
            }
        }

        Ok(partial(total, verdicts, cancelled))
    }

    #[tracing::instrument(skip_all, fields(case = %case.id))]
    async fn judge_case(
        &self,
        source: &str,
        language: Language,
        case: &TestCase,
        abort: &Abort,
    ) -> Result<SubmissionResult, JudgeError> {
        let submission = encode::encode(source, case, language, &self.limits)?;
        self.client.execute(&submission, abort).await
    }
}

fn partial(total: usize, verdicts: Vec<CaseVerdict>, cancelled: bool) -> ExecutionReport {
    let report = ExecutionReport::from_verdicts(Provider::Authoritative, total, verdicts);
    info!(
        passed = report.total_passed,
        judged = report.per_case.len(),
        total,
        cancelled,
        "test suite finished"
    );
    if cancelled {
        report.mark_cancelled()
    } else {
        report
    }
}

/// Cases that failed before the first judged one keep their verdicts.
fn compilation_failed(
    total: usize,
    mut verdicts: Vec<CaseVerdict>,
    case: &TestCase,
    result: &SubmissionResult,
) -> ExecutionReport {
    let message = non_empty(&result.compile_output)
        .or_else(|| non_empty(&result.stderr))
        .unwrap_or(COMPILATION_FAILED)
        .to_owned();
    info!(case = %case.id, "compilation failed, skipping remaining cases");

    verdicts.push(verdict(case, result));
    ExecutionReport::from_verdicts(Provider::Authoritative, total, verdicts).with_compilation_error(message)
}

fn non_empty(text: &Option<String>) -> Option<&str> {
    text.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn verdict(case: &TestCase, result: &SubmissionResult) -> CaseVerdict {
    let stdout = non_empty(&result.stdout);
    let stderr = non_empty(&result.stderr);
    let actual = stdout.or(stderr).unwrap_or_default().to_owned();

    let kind = StatusKind::from_id(result.status_id);
    let matches = decode::outputs_match(stdout.unwrap_or_default(), &case.expected_output);
    let passed = kind == StatusKind::Accepted && matches;

    let (outcome, status) = match kind {
        StatusKind::Accepted if matches => (Outcome::Accepted, result.status_description.clone()),
        StatusKind::Accepted | StatusKind::WrongAnswer => (Outcome::WrongAnswer, "Wrong Answer".to_owned()),
        StatusKind::TimeLimitExceeded => (Outcome::TimeLimitExceeded, result.status_description.clone()),
        StatusKind::CompilationError => (Outcome::CompilationError, result.status_description.clone()),
        StatusKind::RuntimeError => (Outcome::RuntimeError, result.status_description.clone()),
        _ => (Outcome::JudgeFailure, result.status_description.clone()),
    };

    let error = stderr
        .or_else(|| non_empty(&result.compile_output))
        .or_else(|| non_empty(&result.message))
        .map(str::to_owned);

    CaseVerdict {
        test_case_id: case.id.clone(),
        passed,
        input: case.input.clone(),
        expected: case.expected_output.clone(),
        actual,
        execution_time: result.time_seconds.unwrap_or(0.0),
        memory_kb: result.memory_kb,
        status,
        outcome,
        error,
    }
}

fn failure(case: &TestCase, err: &JudgeError) -> CaseVerdict {
    warn!(case = %case.id, %err, "test case could not be judged");
    CaseVerdict {
        test_case_id: case.id.clone(),
        passed: false,
        input: case.input.clone(),
        expected: case.expected_output.clone(),
        actual: String::new(),
        execution_time: 0.0,
        memory_kb: None,
        status: EXECUTION_ERROR.to_owned(),
        outcome: Outcome::ExecutionError,
        error: Some(err.to_string()),
    }
}
