//! Bearer token check for protected routes -> `AuthCtx` in request extensions.
//!
//! - `Authorization: Bearer <token>` is required; anything else is a 401
//!   without touching the cache or the resolver.
//! - Resolution (cache first, resolver on miss) is done by `Authenticator`.
//! - Handlers read the identity through `AuthCtxExtractor` and never re-derive it.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

/// Puts the access check in front of every route of `router`.
///
/// ```ignore
/// let protected = Router::new().route("/me", get(me));
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// app = app.nest("/api", protected);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // route_layer: unmatched paths stay 404 instead of being authenticated first
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

/// Returns the credential of an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively. A missing header, another scheme
/// or an empty token all yield `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim_start().split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(req.headers()).map(str::to_owned) else {
        tracing::debug!(path = %req.uri().path(), "request without bearer credential");
        return Err(AppError::Unauthorized("no credential".to_string()));
    };

    let user_id = state.auth.authenticate(&token).await?;

    // middleware -> extractor hand-off
    req.extensions_mut().insert(AuthCtx::new(user_id));

    Ok(next.run(req).await)
}
