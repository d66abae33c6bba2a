/*
 * Responsibility
 * - the "authenticated context" type handlers see
 * - the access middleware resolves the token and stores it in request extensions;
 *   handlers only ever receive this type
 */

use uuid::Uuid;

/// Identity attached to a request that passed the access middleware.
///
/// `user_id` is never nil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthCtx {
    pub user_id: Uuid,
}

impl AuthCtx {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}
