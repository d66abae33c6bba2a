/*
 * Responsibility
 * - GET /api/me, GET /api/users/{user_id} (protected)
 * - identity comes from AuthCtxExtractor only
 */
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    api::{
        dto::users::{MeResponse, UserResponse},
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    state::AppState,
};

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: ctx.user_id,
    })
}

pub async fn get_user(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user_id =
        Uuid::parse_str(&user_id).map_err(|_| AppError::BadRequest("invalid user id".into()))?;

    let profile = state.resolver.get_user(user_id).await.map_err(|err| {
        tracing::warn!(error = %err, requested_by = %ctx.user_id, %user_id, "failed to get user");
        AppError::from(err)
    })?;

    Ok(Json(profile.into()))
}
