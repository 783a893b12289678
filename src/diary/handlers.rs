use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{CreateEntryRequest, UpdateEntryRequest};
use super::repo_types::DiaryEntry;
use crate::{
    auth::extractors::AuthUser,
    dto::MessageResponse,
    error::{AppResult, ValidationError},
    state::AppState,
};

pub fn diary_routes() -> Router<AppState> {
    Router::new()
        .route("/diary", get(list_entries).post(create_entry))
        .route(
            "/diary/:id",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidId)
}

#[instrument(skip(state, body))]
pub async fn create_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<CreateEntryRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DiaryEntry>)> {
    let Json(body) = body?;
    let entry = state.diary.create(user_id, body.title, body.content).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state))]
pub async fn list_entries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<DiaryEntry>>> {
    Ok(Json(state.diary.list(user_id).await?))
}

#[instrument(skip(state))]
pub async fn get_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<DiaryEntry>> {
    let id = parse_id(&id)?;
    Ok(Json(state.diary.get_by_id(user_id, id).await?))
}

#[instrument(skip(state, body))]
pub async fn update_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    body: Result<Json<UpdateEntryRequest>, JsonRejection>,
) -> AppResult<Json<DiaryEntry>> {
    let id = parse_id(&id)?;
    let Json(body) = body?;
    let entry = state
        .diary
        .update(user_id, id, body.title, body.content)
        .await?;
    Ok(Json(entry))
}

#[instrument(skip(state))]
pub async fn delete_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    state.diary.delete(user_id, id).await?;
    Ok(Json(MessageResponse::new("Diary entry deleted successfully")))
}
