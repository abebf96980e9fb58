use std::convert::Infallible;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::reject::{
    LengthRequired, MethodNotAllowed, PayloadTooLarge, Reject, UnsupportedMediaType,
};
use warp::{Rejection, Reply};

use crate::application::AppError;

/// Service errors travel through warp as custom rejections.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl Reject for ApiError {}

/// Turn a service error into a warp rejection.
pub fn reject(err: AppError) -> Rejection {
    warp::reject::custom(ApiError(err))
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub details: String,
    pub error_code: &'static str,
}

impl ErrorDetails {
    fn new(status: StatusCode, message: impl Into<String>, error_code: &'static str) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
            details: status.canonical_reason().unwrap_or_default().to_string(),
            error_code,
        }
    }
}

fn classify(err: &AppError) -> (StatusCode, &'static str) {
    match err {
        AppError::AccountNotFound(_) => (StatusCode::NOT_FOUND, "ACCOUNT_NOT_FOUND"),
        AppError::InsufficientFunds { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_FUNDS")
        }
        AppError::InvalidAmount(_) | AppError::InvalidAccount(_) | AppError::InvalidTransfer(_) => {
            (StatusCode::BAD_REQUEST, "INVALID_REQUEST")
        }
        AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR"),
    }
}

/// Recover handler: map every rejection to an `ErrorDetails` body.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, code, message) = if let Some(ApiError(app_err)) = err.find::<ApiError>() {
        let (status, code) = classify(app_err);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = ?app_err, "request failed");
            (status, code, "Internal server error".to_string())
        } else {
            (status, code, app_err.to_string())
        }
    } else if let Some(e) = err.find::<BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, "INVALID_REQUEST", e.to_string())
    } else if let Some(e) = err.find::<UnsupportedMediaType>() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "INVALID_REQUEST", e.to_string())
    } else if let Some(e) = err.find::<PayloadTooLarge>() {
        (StatusCode::PAYLOAD_TOO_LARGE, "INVALID_REQUEST", e.to_string())
    } else if let Some(e) = err.find::<LengthRequired>() {
        // Must win over the MethodNotAllowed of sibling routes on the same path
        (StatusCode::LENGTH_REQUIRED, "INVALID_REQUEST", e.to_string())
    } else if err.find::<MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "METHOD_NOT_ALLOWED",
            "Method not allowed".to_string(),
        )
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found".to_string())
    } else {
        error!(rejection = ?err, "unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            "Internal server error".to_string(),
        )
    };

    let body = warp::reply::json(&ErrorDetails::new(status, message, code));
    Ok(warp::reply::with_status(body, status))
}
