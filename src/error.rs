/*
 * Responsibility
 * - the gateway's outward-facing AppError
 * - IntoResponse (HTTP status + short text body)
 * - resolver failure -> HTTP outcome translation
 */
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::resolver::{FailureCode, ResolverError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn unauthorized() -> Self {
        Self::Unauthorized("unauthorized".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn translate(code: FailureCode, message: &str) -> Self {
        // Backend wording is passed through for client errors only.
        let text = |fallback: &str| {
            if message.trim().is_empty() {
                fallback.to_string()
            } else {
                message.to_string()
            }
        };

        match code {
            FailureCode::InvalidArgument => AppError::BadRequest(text("bad request")),
            FailureCode::Unauthenticated => AppError::Unauthorized(text("unauthorized")),
            FailureCode::AlreadyExists => AppError::Conflict(text("conflict")),
            FailureCode::NotFound => AppError::NotFound(text("not found")),
            FailureCode::Internal => AppError::Internal,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

impl From<ResolverError> for AppError {
    fn from(e: ResolverError) -> Self {
        match &e {
            ResolverError::Rejected { code, message, .. } => AppError::translate(*code, message),
            // No structured answer from the backend: we could not tell, so never 401.
            _ => AppError::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(FailureCode::InvalidArgument, StatusCode::BAD_REQUEST)]
    #[case(FailureCode::Unauthenticated, StatusCode::UNAUTHORIZED)]
    #[case(FailureCode::AlreadyExists, StatusCode::CONFLICT)]
    #[case(FailureCode::NotFound, StatusCode::NOT_FOUND)]
    #[case(FailureCode::Internal, StatusCode::INTERNAL_SERVER_ERROR)]
    fn failure_codes_translate_to_statuses(#[case] code: FailureCode, #[case] expected: StatusCode) {
        let rejected = ResolverError::rejected("auth-service", "validate_token", code, "");
        assert_eq!(AppError::from(rejected).status(), expected);
    }

    #[test]
    fn unstructured_failures_are_internal() {
        let timeout = ResolverError::Timeout {
            backend: "auth-service",
            operation: "validate_token",
            elapsed: Duration::from_secs(1),
        };
        assert_eq!(AppError::from(timeout), AppError::Internal);

        let invalid = ResolverError::InvalidReply {
            backend: "user-service",
            operation: "get_user",
            message: "user_id: invalid length".into(),
        };
        assert_eq!(AppError::from(invalid), AppError::Internal);
    }

    #[test]
    fn backend_message_is_kept_for_client_errors() {
        let err = ResolverError::rejected(
            "auth-service",
            "create_user",
            FailureCode::AlreadyExists,
            "email already registered",
        );
        assert_eq!(
            AppError::from(err),
            AppError::Conflict("email already registered".into())
        );
    }

    #[test]
    fn internal_message_is_never_leaked() {
        let err = ResolverError::rejected(
            "auth-service",
            "validate_token",
            FailureCode::Internal,
            "db password rejected",
        );
        assert_eq!(AppError::from(err).to_string(), "internal server error");
    }

    #[tokio::test]
    async fn response_is_plain_text() {
        let response = AppError::NotFound("user not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"user not found");
    }
}
