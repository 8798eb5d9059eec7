use crate::errors::{self, reject_error};
use crate::{App, SERVICE_NAME};

use judgekit_client::Abort;
use judgekit_protocol::common::Problem;
use judgekit_protocol::error::ErrorCode;
use judgekit_protocol::external::{sample_test_cases, ExecuteOutput, ExecuteRequest, SyntaxRequest};

use std::convert::Infallible;
use std::sync::Arc;

use tracing::info;
use validator::Validate;
use warp::reply::{self, Response};
use warp::{Filter, Rejection, Reply};

const BODY_LIMIT: u64 = 256 * 1024;

macro_rules! impl_filter{
    () => {
        impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone + Send + Sync + 'static
    };
    ($($ty:ty,)+) => {
        impl Filter<Extract = ($($ty,)+), Error = Infallible> + Clone + Send + Sync + 'static
    };
}

pub fn routes(app: Arc<App>) -> impl_filter!() {
    let prefix = warp::path("v1");
    prefix.and(judge_routes(app)).recover(errors::recover)
}

fn judge_routes(app: Arc<App>) -> impl_filter!() {
    let executions = warp::path("executions")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(BODY_LIMIT))
        .and(with_app(&app))
        .and(warp::body::json())
        .and_then(execute);

    let syntax = warp::path("syntax")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(BODY_LIMIT))
        .and(with_app(&app))
        .and(warp::body::json())
        .and_then(validate_syntax);

    let languages = warp::path("languages")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_app(&app))
        .and_then(languages);

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_app(&app))
        .and_then(health);

    executions.or(syntax).or(languages).or(health)
}

fn with_app(app: &Arc<App>) -> impl_filter!(Arc<App>,) {
    let app = app.clone();
    warp::any().map(move || app.clone())
}

fn validated<T: Validate>(body: &T) -> Result<(), Rejection> {
    body.validate()
        .map_err(|err| reject_error(ErrorCode::InvalidRequest, Some(err.to_string())))
}

/// POST /v1/executions
/// JSON: ExecuteRequest => ExecuteOutput
async fn execute(app: Arc<App>, body: ExecuteRequest) -> Result<Response, Rejection> {
    validated(&body)?;

    let problem = Problem::from_cases(body.test_cases.unwrap_or_else(sample_test_cases));
    let abort = match app.config.server.request_deadline() {
        Some(deadline) => Abort::none().with_timeout(deadline),
        None => Abort::none(),
    };

    let report = app.judge.execute_with(&body.code, &body.language, &problem, &abort).await;
    info!(
        language = %body.language,
        passed = report.total_passed,
        total = report.total_tests,
        provider = ?report.provider,
        "execution finished"
    );

    let output = ExecuteOutput::new(SERVICE_NAME, &body.language, report);
    Ok(reply::json(&output).into_response())
}

/// POST /v1/syntax
/// JSON: SyntaxRequest => SyntaxCheck
async fn validate_syntax(app: Arc<App>, body: SyntaxRequest) -> Result<Response, Rejection> {
    validated(&body)?;
    let check = app.judge.validate_syntax(&body.code, &body.language).await;
    Ok(reply::json(&check).into_response())
}

/// GET /v1/languages
/// JSON: Vec<LanguageInfo>
async fn languages(app: Arc<App>) -> Result<Response, Rejection> {
    let languages = app.judge.available_languages().await;
    Ok(reply::json(&languages).into_response())
}

/// GET /v1/health
/// JSON: Health
async fn health(app: Arc<App>) -> Result<Response, Rejection> {
    let health = app.judge.health_check().await;
    Ok(reply::json(&health).into_response())
}
