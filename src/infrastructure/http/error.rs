//! HTTP Error Handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const UNAUTHORIZED: i32 = 401;
    pub const NOT_FOUND: i32 = 404;
    pub const CONFLICT: i32 = 409;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const BAD_GATEWAY: i32 = 502;
    pub const SERVICE_UNAVAILABLE: i32 = 503;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Internal(String),
    Conflict(String),
    BadGateway(String),
    ServiceUnavailable(String),
}

impl ApiError {
    fn parts(&self) -> (i32, &str) {
        match self {
            ApiError::NotFound(msg) => (errno::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (errno::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (errno::UNAUTHORIZED, msg),
            ApiError::Internal(msg) => (errno::INTERNAL_ERROR, msg),
            ApiError::Conflict(msg) => (errno::CONFLICT, msg),
            ApiError::BadGateway(msg) => (errno::BAD_GATEWAY, msg),
            ApiError::ServiceUnavailable(msg) => (errno::SERVICE_UNAVAILABLE, msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, msg) = self.parts();
        if code >= errno::INTERNAL_ERROR {
            tracing::error!(errno = code, error = %msg, "Request failed");
        } else {
            tracing::warn!(errno = code, error = %msg, "Request rejected");
        }

        (StatusCode::OK, Json(ErrorResponse::new(code, msg))).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        let message = e.to_string();
        match e {
            ApplicationError::EmptyScript | ApplicationError::ValidationError(_) => {
                ApiError::BadRequest(message)
            }
            ApplicationError::InvalidState(_) => ApiError::Conflict(message),
            ApplicationError::MissingCredential => ApiError::Unauthorized(message),
            ApplicationError::EmptyAudioResponse
            | ApplicationError::TooManyVoices(_)
            | ApplicationError::Synthesis(_)
            | ApplicationError::Decode(_) => ApiError::BadGateway(message),
            ApplicationError::SessionAcquisition(_) => ApiError::ServiceUnavailable(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_error_mapping() {
        let cases = [
            (ApplicationError::EmptyScript, errno::BAD_REQUEST),
            (ApplicationError::invalid_state("busy"), errno::CONFLICT),
            (ApplicationError::MissingCredential, errno::UNAUTHORIZED),
            (ApplicationError::TooManyVoices("x".into()), errno::BAD_GATEWAY),
            (
                ApplicationError::SessionAcquisition("no mic".into()),
                errno::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, expected) in cases {
            let message = err.to_string();
            let api: ApiError = err.into();
            assert_eq!(api.parts(), (expected, message.as_str()));
        }
    }
}
