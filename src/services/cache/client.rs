//! Cache client interface used by higher-level services (token lookup, logout eviction).
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-layer errors (transport/command/serialization).
///
/// Note:
/// - We keep this independent from `AppError` so callers can decide how to fail.
///   Token lookup fails open (falls back to the resolver), nothing here is fatal.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
    #[error("cache value error: {0}")]
    InvalidValue(String),
    #[error("cache call timed out after {0:?}")]
    Timeout(Duration),
}

/// A minimal, string-based cache interface.
///
/// The gateway only reads token entries and deletes them on logout;
/// writing entries belongs to whoever issues tokens.
///
/// Implementations must be cheap to clone (typically `Arc<...>` inside).
#[async_trait]
pub trait CacheClient: Clone + Send + Sync + 'static {
    // Returns the cache backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Get UTF-8 string value. A missing key is `Ok(None)`, never an error.
    async fn get_string(&self, key: &str) -> CacheResult<Option<String>>;

    // Delete a key. Returns number of deleted keys.
    async fn del(&self, key: &str) -> CacheResult<u64>;
}
