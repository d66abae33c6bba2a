use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub type ResolverResult<T> = Result<T, ResolverError>;

/// Reasons the resolver reports for a refused call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCode {
    InvalidArgument,
    Unauthenticated,
    NotFound,
    AlreadyExists,
    Internal,
}

impl FailureCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::Unauthenticated => "unauthenticated",
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ResolverError {
    /// The backend answered and refused the call.
    #[error("{backend} {operation} failed ({code}): {message}")]
    Rejected {
        backend: &'static str,
        operation: &'static str,
        code: FailureCode,
        message: String,
    },

    #[error("{backend} {operation} timed out after {elapsed:?}")]
    Timeout {
        backend: &'static str,
        operation: &'static str,
        elapsed: Duration,
    },

    /// The backend could not be reached at all.
    #[error("{backend} {operation} unavailable: {message}")]
    Unavailable {
        backend: &'static str,
        operation: &'static str,
        message: String,
    },

    #[error("{backend} {operation} returned an invalid reply: {message}")]
    InvalidReply {
        backend: &'static str,
        operation: &'static str,
        message: String,
    },

    #[error("invalid backend address {addr}: {message}")]
    InvalidEndpoint { addr: String, message: String },
}

impl ResolverError {
    pub fn rejected(
        backend: &'static str,
        operation: &'static str,
        code: FailureCode,
        message: impl Into<String>,
    ) -> Self {
        Self::Rejected {
            backend,
            operation,
            code,
            message: message.into(),
        }
    }

    /// Only a structured refusal carries a meaningful code. Anything else means
    /// we could not tell, which is an internal failure and never "unauthenticated".
    pub fn failure_code(&self) -> FailureCode {
        match self {
            Self::Rejected { code, .. } => *code,
            _ => FailureCode::Internal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
}

/// Remote authority for credentials and accounts.
///
/// Every call is bounded by a timeout; an expired call is an error, not a hang.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolves a bearer token to the user it was issued for.
    /// The nil id means the token resolved to nobody.
    async fn validate(&self, credential: &str) -> ResolverResult<Uuid>;

    async fn create_user(&self, user: &NewUser) -> ResolverResult<Uuid>;

    /// Exchanges credentials for a bearer token.
    async fn login(&self, credentials: &Credentials) -> ResolverResult<String>;

    async fn logout(&self, credential: &str) -> ResolverResult<()>;

    async fn get_user(&self, user_id: Uuid) -> ResolverResult<UserProfile>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rejections_carry_their_code() {
        let rejected = ResolverError::rejected(
            "auth-service",
            "validate",
            FailureCode::Unauthenticated,
            "token expired",
        );
        assert_eq!(rejected.failure_code(), FailureCode::Unauthenticated);

        let timeout = ResolverError::Timeout {
            backend: "auth-service",
            operation: "validate",
            elapsed: Duration::from_secs(1),
        };
        assert_eq!(timeout.failure_code(), FailureCode::Internal);

        let unreachable = ResolverError::Unavailable {
            backend: "auth-service",
            operation: "validate",
            message: "connection refused".into(),
        };
        assert_eq!(unreachable.failure_code(), FailureCode::Internal);
    }
}
