use judgekit_protocol::error::{ErrorCode, ErrorInfo};

use warp::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::reject::{PayloadTooLarge, Reject};
use warp::{reply, Rejection, Reply};

#[derive(Debug)]
struct Error(ErrorInfo);
impl Reject for Error {}

pub fn reject_error(code: ErrorCode, message: Option<String>) -> Rejection {
    warp::reject::custom(Error(ErrorInfo { code, message }))
}

pub async fn recover(rejection: Rejection) -> Result<impl Reply, Rejection> {
    let info = if let Some(Error(err)) = rejection.find() {
        err.clone()
    } else if let Some(err) = rejection.find::<BodyDeserializeError>() {
        ErrorInfo {
            code: ErrorCode::InvalidRequest,
            message: Some(err.to_string()),
        }
    } else if rejection.find::<PayloadTooLarge>().is_some() {
        ErrorInfo {
            code: ErrorCode::InvalidRequest,
            message: Some("payload too large".into()),
        }
    } else {
        return Err(rejection);
    };

    let status: StatusCode = info.code.as_status();
    Ok(reply::with_status(reply::json(&info), status))
}
