/*
 * Responsibility
 * - POST /auth/register, /auth/login, /auth/logout (public, no access middleware)
 * - marshal JSON <-> resolver calls; failures go through the AppError translation
 */
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use crate::{
    api::dto::auth::{LoginRequest, RegisterRequest, TokenResponse},
    error::AppError,
    middleware::auth::bearer_token,
    state::AppState,
};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<StatusCode, AppError> {
    req.validate()
        .map_err(|msg| AppError::BadRequest(msg.to_string()))?;

    let user_id = state
        .resolver
        .create_user(&req.into())
        .await
        .map_err(|err| {
            tracing::warn!(error = %err, "failed to register user");
            AppError::from(err)
        })?;

    tracing::info!(%user_id, "user registered");
    Ok(StatusCode::CREATED)
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::BadRequest(msg.to_string()))?;

    let token = state.resolver.login(&req.into()).await.map_err(|err| {
        tracing::warn!(error = %err, "failed to log in user");
        AppError::from(err)
    })?;

    Ok(Json(TokenResponse { token }))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| AppError::Unauthorized("no credential".to_string()))?;

    state.resolver.logout(token).await.map_err(|err| {
        tracing::warn!(error = %err, "failed to log out user");
        AppError::from(err)
    })?;

    // The backend has revoked the token; make sure the cache stops vouching for it.
    if let Err(err) = state.token_cache.evict(token).await {
        tracing::warn!(error = %err, "failed to evict token from cache");
    }

    Ok(StatusCode::OK)
}
