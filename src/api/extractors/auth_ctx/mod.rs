/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - give handlers the context (AuthCtx) of an authenticated request
 * - axum-specific code stays in core, the type lives in types
 *
 * Public API:
 * - AuthCtx
 * - AuthCtxExtractor
 */

mod core;
mod types;

pub use self::core::AuthCtxExtractor;
pub use self::types::AuthCtx;
