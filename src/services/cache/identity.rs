//! Token -> identity lookups on top of a [`CacheClient`].
//!
//! Entries live under `<prefix>:<token>`, or under the bare token when the
//! prefix is empty, and hold the user id as a UUID string. Their expiry is
//! owned by the cache store.

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::services::cache::client::{CacheClient, CacheError, CacheResult};

/// Outcome of a token lookup.
///
/// A lookup never fails: every problem on the cache side collapses into a
/// [`CacheLookup::Miss`], and the caller falls back to the resolver.
#[derive(Debug)]
pub enum CacheLookup {
    Hit(Uuid),
    Miss(MissReason),
}

#[derive(Debug)]
pub enum MissReason {
    /// No entry for this token. The common case.
    Absent,
    /// The cache could not answer (transport error, timeout, unreadable value).
    Unavailable(CacheError),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenCache: Send + Sync {
    async fn lookup(&self, credential: &str) -> CacheLookup;

    /// Drops the entry for `credential`, if any.
    async fn evict(&self, credential: &str) -> CacheResult<()>;
}

pub struct IdentityCache<C: CacheClient> {
    client: C,
    prefix: String,
    timeout: Duration,
}

impl<C: CacheClient> IdentityCache<C> {
    pub fn new(client: C, prefix: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            prefix: prefix.into(),
            timeout,
        }
    }

    pub fn key(&self, credential: &str) -> String {
        if self.prefix.is_empty() {
            return credential.to_string();
        }
        format!("{}:{}", self.prefix, credential)
    }
}

fn parse_identity(raw: &str) -> Result<Uuid, CacheError> {
    let user_id =
        Uuid::parse_str(raw.trim()).map_err(|e| CacheError::InvalidValue(e.to_string()))?;

    // The nil id means "no identity"; it must never authenticate anyone.
    if user_id.is_nil() {
        return Err(CacheError::InvalidValue("nil identity".to_string()));
    }

    Ok(user_id)
}

#[async_trait]
impl<C: CacheClient> TokenCache for IdentityCache<C> {
    async fn lookup(&self, credential: &str) -> CacheLookup {
        let key = self.key(credential);

        let fetched = match tokio::time::timeout(self.timeout, self.client.get_string(&key)).await
        {
            Ok(fetched) => fetched,
            Err(_) => Err(CacheError::Timeout(self.timeout)),
        };

        match fetched {
            Ok(None) => CacheLookup::Miss(MissReason::Absent),
            Ok(Some(raw)) => match parse_identity(&raw) {
                Ok(user_id) => CacheLookup::Hit(user_id),
                Err(err) => CacheLookup::Miss(MissReason::Unavailable(err)),
            },
            Err(err) => CacheLookup::Miss(MissReason::Unavailable(err)),
        }
    }

    async fn evict(&self, credential: &str) -> CacheResult<()> {
        let key = self.key(credential);

        let removed = tokio::time::timeout(self.timeout, self.client.del(&key))
            .await
            .map_err(|_| CacheError::Timeout(self.timeout))??;

        tracing::debug!(
            backend = self.client.backend_name(),
            removed,
            "token cache entry evicted"
        );
        Ok(())
    }
}
