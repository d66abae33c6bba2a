//! Cache-aside token validation.
//!
//! credential -> cache lookup -> (hit) identity
//!                            -> (miss / cache down) resolver validate -> identity | rejection
//!
//! The cache is only ever read here.

use std::sync::Arc;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::error::AppError;
use crate::services::cache::{CacheLookup, MissReason, TokenCache};
use crate::services::resolver::{IdentityResolver, ResolverError, grpc::AUTH_BACKEND};

pub struct Authenticator {
    cache: Arc<dyn TokenCache>,
    resolver: Arc<dyn IdentityResolver>,
    validate_timeout: Duration,
}

impl Authenticator {
    pub fn new(
        cache: Arc<dyn TokenCache>,
        resolver: Arc<dyn IdentityResolver>,
        validate_timeout: Duration,
    ) -> Self {
        Self {
            cache,
            resolver,
            validate_timeout,
        }
    }

    /// Resolves a non-empty bearer credential to a user id.
    pub async fn authenticate(&self, credential: &str) -> Result<Uuid, AppError> {
        if credential.is_empty() {
            return Err(AppError::unauthorized());
        }

        match self.cache.lookup(credential).await {
            CacheLookup::Hit(user_id) => {
                tracing::debug!(%user_id, "token resolved from cache");
                return Ok(user_id);
            }
            CacheLookup::Miss(MissReason::Absent) => {}
            CacheLookup::Miss(MissReason::Unavailable(err)) => {
                tracing::warn!(error = %err, "token cache unavailable, falling back to resolver");
            }
        }

        let started = Instant::now();
        let resolved =
            match tokio::time::timeout(self.validate_timeout, self.resolver.validate(credential))
                .await
            {
                Ok(resolved) => resolved,
                Err(_) => Err(ResolverError::Timeout {
                    backend: AUTH_BACKEND,
                    operation: "validate_token",
                    elapsed: started.elapsed(),
                }),
            };

        let user_id = resolved.map_err(|err| {
            tracing::warn!(
                error = %err,
                code = %err.failure_code(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "token validation failed"
            );
            AppError::from(err)
        })?;

        // A successful reply without an identity is the same as "unauthenticated".
        if user_id.is_nil() {
            tracing::warn!("resolver returned no identity for token");
            return Err(AppError::unauthorized());
        }

        tracing::debug!(%user_id, "token resolved by resolver");
        Ok(user_id)
    }
}
