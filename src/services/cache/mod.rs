pub mod client;
pub mod identity;
pub mod valkey;

pub use identity::{CacheLookup, IdentityCache, MissReason, TokenCache};
pub use valkey::ValkeyClient;

#[cfg(test)]
pub use client::CacheError;
#[cfg(test)]
pub use identity::MockTokenCache;
