use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use super::dto::UpdateProfileRequest;
use crate::{
    auth::{extractors::AuthUser, repo_types::UserProfile},
    diary::handlers::parse_id,
    dto::MessageResponse,
    error::{AppResult, AuthError},
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile/me", get(me))
        .route("/profile/:id", put(update_profile).delete(delete_profile))
}

/// The path id must name the caller's own account.
fn ensure_self(user_id: Uuid, raw: &str) -> AppResult<()> {
    let target = parse_id(raw)?;
    if target != user_id {
        warn!(%user_id, %target, "profile id does not match token");
        return Err(AuthError::IdentityMismatch.into());
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(state.profile.get_self(user_id).await?))
}

#[instrument(skip(state, body))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> AppResult<Json<UserProfile>> {
    ensure_self(user_id, &id)?;
    let Json(body) = body?;
    Ok(Json(state.profile.update_self(user_id, body).await?))
}

#[instrument(skip(state))]
pub async fn delete_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    ensure_self(user_id, &id)?;
    state.profile.delete_self(user_id).await?;
    Ok(Json(MessageResponse::new("account deleted successfully")))
}
