/*
 * Responsibility
 * - URL layout of the gateway
 *   - /health, /auth/..  : public
 *   - /api/..            : behind the access middleware
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    api::handlers::{
        auth::{login, logout, register},
        health::health,
        users::{get_user, me},
    },
    middleware,
    state::AppState,
};

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout));

    let protected = Router::new()
        .route("/me", get(me))
        .route("/users/{user_id}", get(get_user));
    let protected = middleware::auth::access::apply(protected, state);

    Router::new()
        .route("/health", get(health))
        .nest("/auth", public)
        .nest("/api", protected)
}
