use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tokio::sync::OnceCell;

use crate::services::cache::client::{CacheClient, CacheError, CacheResult};

/// Valkey/Redis-backed cache client.
///
/// The connection is opened on first use, not at construction: the gateway
/// starts while the cache is down and every call retries until it connects.
/// Once up, `ConnectionManager` multiplexes one reconnecting connection
/// shared by every request.
#[derive(Clone)]
pub struct ValkeyClient {
    client: redis::Client,
    manager: Arc<OnceCell<ConnectionManager>>,
}

impl ValkeyClient {
    // Create a Valkey client from a URL like `redis://localhost:6379/0`.
    // Only the URL is checked here; no connection is made.
    pub fn new(url: &str) -> Result<Self, CacheError> {
        let client =
            redis::Client::open(url).map_err(|e| CacheError::BackendConnection(e.to_string()))?;

        Ok(Self {
            client,
            manager: Arc::new(OnceCell::new()),
        })
    }

    /// Establishes the shared connection if it is not up yet.
    pub async fn connect(&self) -> CacheResult<()> {
        self.connection().await.map(|_| ())
    }

    async fn connection(&self) -> CacheResult<ConnectionManager> {
        // A failed attempt leaves the cell empty, so the next call tries again.
        let manager = self
            .manager
            .get_or_try_init(|| self.client.get_connection_manager())
            .await
            .map_err(|e| CacheError::BackendConnection(e.to_string()))?;

        Ok(manager.clone())
    }
}

#[async_trait]
impl CacheClient for ValkeyClient {
    fn backend_name(&self) -> &'static str {
        "valkey"
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection().await?;

        // GET returns Nil for a missing key, which decodes to `None`.
        let resp: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendCommand(e.to_string()))?;

        Ok(resp)
    }

    async fn del(&self, key: &str) -> CacheResult<u64> {
        let mut conn = self.connection().await?;

        // DEL returns number of keys removed (0 or 1 for a single key).
        let n: u64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendCommand(e.to_string()))?;

        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens on port 1.
    const UNREACHABLE: &str = "redis://127.0.0.1:1/0";

    #[test]
    fn construction_does_not_connect() {
        assert!(ValkeyClient::new(UNREACHABLE).is_ok());
    }

    #[test]
    fn malformed_url_is_rejected() {
        assert!(matches!(
            ValkeyClient::new("not a url"),
            Err(CacheError::BackendConnection(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_connection_error() {
        let client = ValkeyClient::new(UNREACHABLE).unwrap();

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            client.get_string("token:abc"),
        )
        .await;

        // Either the manager gives up on its own, or we stop waiting.
        if let Ok(result) = result {
            assert!(matches!(result, Err(CacheError::BackendConnection(_))));
        }
        assert!(client.manager.get().is_none());
    }
}
