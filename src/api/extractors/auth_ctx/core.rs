use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

use super::AuthCtx;

/// Extractor handing the middleware's `AuthCtx` to a handler.
///
/// A missing `AuthCtx` means the route was mounted without the access
/// middleware. That is a wiring bug, so it is a 500 rather than a 401.
pub struct AuthCtxExtractor(pub AuthCtx);

impl<S> FromRequestParts<S> for AuthCtxExtractor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthCtx>() {
            Some(ctx) => Ok(AuthCtxExtractor(*ctx)),
            None => {
                tracing::error!(path = %parts.uri.path(), "AuthCtx missing on protected route");
                Err(AppError::Internal)
            }
        }
    }
}
