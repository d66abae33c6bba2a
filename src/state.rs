/*
 * Responsibility
 * - shared context bound to the Router (AppState)
 *   - the authenticator plus the long-lived cache / resolver handles
 * - Clone is cheap (everything inside is an Arc)
 */
use std::sync::Arc;

use crate::services::{auth::Authenticator, cache::TokenCache, resolver::IdentityResolver};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<Authenticator>,
    pub resolver: Arc<dyn IdentityResolver>,
    pub token_cache: Arc<dyn TokenCache>,
}

impl AppState {
    pub fn new(
        auth: Arc<Authenticator>,
        resolver: Arc<dyn IdentityResolver>,
        token_cache: Arc<dyn TokenCache>,
    ) -> Self {
        Self {
            auth,
            resolver,
            token_cache,
        }
    }
}
