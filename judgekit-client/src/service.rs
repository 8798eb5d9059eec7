use crate::abort::Abort;
use crate::client::JudgeClient;
use crate::config::Config;
use crate::encode::{Limits, Submission};
use crate::error::JudgeError;
use crate::fallback::FallbackEvaluator;
use crate::lang;
use crate::runner::SuiteRunner;

use judgekit_protocol::common::{ExecutionReport, Health, HealthState, LanguageInfo, Problem, Provider, SyntaxCheck};

use std::sync::Arc;

use tracing::{info, warn};

/// Caller-facing entry point: judges remotely when possible, heuristically otherwise.
pub struct CodeJudge {
    runner: Option<SuiteRunner>,
    fallback: FallbackEvaluator,
    config: Arc<Config>,
}

impl CodeJudge {
    /// Without a credential the judge runs in degraded mode; this never fails.
    pub fn new(config: Arc<Config>) -> Self {
        match JudgeClient::new(&config.judge) {
            Ok(client) => Self::with_client(Arc::new(client), config),
            Err(err) => {
                warn!(%err, "remote judge is not available, using heuristic evaluation");
                Self {
                    runner: None,
                    fallback: fallback_for(&config),
                    config,
                }
            }
        }
    }

    pub fn with_client(client: Arc<JudgeClient>, config: Arc<Config>) -> Self {
        let judge = &config.judge;
        let runner = SuiteRunner::new(client, Limits::from_config(judge), judge.concurrency);
        Self {
            runner: Some(runner),
            fallback: fallback_for(&config),
            config,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.runner.is_none()
    }

    pub async fn execute(&self, source: &str, language: &str, problem: &Problem) -> ExecutionReport {
        self.execute_with(source, language, problem, &Abort::none()).await
    }

    #[tracing::instrument(skip_all, fields(language = %language, problem = ?problem.id))]
    pub async fn execute_with(&self, source: &str, language: &str, problem: &Problem, abort: &Abort) -> ExecutionReport {
        let cases = &problem.test_cases;
        let runner = match &self.runner {
            Some(runner) => runner,
            None => return self.degrade(source, language, problem, "remote judge is not configured"),
        };

        match runner.run(source, language, cases, abort).await {
            Ok(report) => report,
            Err(err) => {
                warn!(%err, "remote judging failed");
                self.degrade(source, language, problem, &err.to_string())
            }
        }
    }

    fn degrade(&self, source: &str, language: &str, problem: &Problem, reason: &str) -> ExecutionReport {
        let total = problem.test_cases.len();
        if self.config.fallback.enabled {
            self.fallback.run(source, language, &problem.test_cases)
        } else {
            ExecutionReport::failed(Provider::Authoritative, total, reason)
        }
    }

    pub async fn available_languages(&self) -> Vec<LanguageInfo> {
        let runner = match &self.runner {
            Some(runner) => runner,
            None => return static_languages(),
        };
        match runner.client().languages().await {
            Ok(languages) if !languages.is_empty() => languages,
            Ok(_) => static_languages(),
            Err(err) => {
                warn!(%err, "failed to list judge languages");
                static_languages()
            }
        }
    }

    /// Probes the judge with a language listing.
    pub async fn health_check(&self) -> Health {
        let available = match &self.runner {
            Some(runner) => runner.client().languages().await.is_ok(),
            None => false,
        };
        let status = if available {
            HealthState::Healthy
        } else {
            HealthState::Fallback
        };
        info!(available, "health check");
        Health { available, status }
    }

    /// Compiles and runs the source once without input.
    pub async fn validate_syntax(&self, source: &str, language: &str) -> SyntaxCheck {
        let runner = match &self.runner {
            Some(runner) => runner,
            None => {
                return SyntaxCheck {
                    valid: false,
                    error: Some("remote judge is not configured".into()),
                }
            }
        };

        let submission = Submission {
            source_code: source.as_bytes().to_vec(),
            language_id: lang::resolve(language).id(),
            stdin: None,
            limits: Limits::from_config(&self.config.judge),
        };

        match runner.client().execute(&submission, &Abort::none()).await {
            Ok(result) => {
                let problem = result
                    .compile_output
                    .as_deref()
                    .or(result.stderr.as_deref())
                    .map(str::trim)
                    .filter(|s| !s.is_empty());
                SyntaxCheck {
                    valid: problem.is_none(),
                    error: problem.map(str::to_owned),
                }
            }
            Err(err) => SyntaxCheck {
                valid: false,
                error: Some(syntax_failure(&err)),
            },
        }
    }
}

fn syntax_failure(err: &JudgeError) -> String {
    warn!(%err, "syntax validation failed");
    format!("syntax validation failed: {}", err)
}

fn fallback_for(config: &Config) -> FallbackEvaluator {
    match config.fallback.seed {
        Some(seed) => FallbackEvaluator::seeded(seed),
        None => FallbackEvaluator::new(),
    }
}

/// Languages advertised when the judge cannot be asked.
pub fn static_languages() -> Vec<LanguageInfo> {
    [(71, "Python (3.8.1)"), (63, "JavaScript (Node.js 12.14.0)"), (62, "Java (OpenJDK 13.0.1)"), (54, "C++ (GCC 9.2.0)")]
        .iter()
        .map(|&(id, name)| LanguageInfo { id, name: name.to_owned() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use judgekit_protocol::external::sample_test_cases;

    fn degraded() -> CodeJudge {
        let mut config = Config::default();
        config.fallback.seed = Some(1);
        CodeJudge::new(Arc::new(config))
    }

    #[tokio::test]
    async fn missing_credential_degrades() {
        let judge = degraded();
        assert!(judge.is_degraded());

        let problem = Problem::from_cases(sample_test_cases());
        let report = judge.execute("def twoSum(nums, target):\n    return [0, 1]\n", "python", &problem).await;
        assert_eq!(report.provider, Provider::Heuristic);
        assert_eq!(report.total_tests, 3);
        assert_eq!(report.per_case.len(), 3);
    }

    #[tokio::test]
    async fn fallback_can_be_disabled() {
        let mut config = Config::default();
        config.fallback.enabled = false;
        let judge = CodeJudge::new(Arc::new(config));

        let problem = Problem::from_cases(sample_test_cases());
        let report = judge.execute("print(1)", "python", &problem).await;
        assert_eq!(report.provider, Provider::Authoritative);
        assert!(report.runtime_error.is_some());
        assert!(report.per_case.is_empty());
        assert!(!report.success);
    }

    #[tokio::test]
    async fn degraded_surface() {
        let judge = degraded();
        let languages = judge.available_languages().await;
        assert_eq!(languages.iter().map(|l| l.id).collect::<Vec<_>>(), vec![71, 63, 62, 54]);

        let health = judge.health_check().await;
        assert!(!health.available);
        assert_eq!(health.status, HealthState::Fallback);

        let check = judge.validate_syntax("print(1)", "python").await;
        assert!(!check.valid);
    }
}
