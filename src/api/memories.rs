//! REST handlers for the memories resource.
//!
//! Each handler validates its input before touching the store, issues exactly
//! one store call, and turns every failure into an [`ApiError`].

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::api::error::{ApiError, ApiResult, Operation};
use crate::domain::memory::{Memory, MemoryInput, MemorySummary};
use crate::security::identity::CurrentUser;

pub const DELETED_MESSAGE: &str = "Memory deleted successfully.";

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

pub fn build_router() -> Router<AppState> {
    Router::new()
        .route("/memories", get(list_memories).post(create_memory))
        .route(
            "/memories/{id}",
            get(get_memory).put(update_memory).delete(delete_memory),
        )
}

/// Parse a path id, accepting only the canonical hyphenated UUID form.
pub fn parse_memory_id(raw: &str) -> Result<Uuid, ApiError> {
    if raw.len() != 36 {
        return Err(ApiError::InvalidId);
    }
    Uuid::parse_str(raw).ok().ok_or(ApiError::InvalidId)
}

/// GET /memories - Summaries of every memory, oldest first
async fn list_memories(State(state): State<AppState>) -> ApiResult<Json<Vec<MemorySummary>>> {
    let memories = state
        .store
        .find_many()
        .await
        .map_err(|e| ApiError::from_store(e, Operation::List))?;

    Ok(Json(memories.iter().map(MemorySummary::from).collect()))
}

/// GET /memories/{id}
async fn get_memory(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Memory>> {
    let id = parse_memory_id(&id)?;

    state
        .store
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from_store(e, Operation::Get))?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// POST /memories
async fn create_memory(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<MemoryInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Memory>)> {
    let Json(input) = payload?;
    let changes = input.validate()?;

    let memory = state
        .store
        .create(changes.owned_by(user_id))
        .await
        .map_err(|e| ApiError::from_store(e, Operation::Create))?;

    info!(memory_id = %memory.id, user_id = %memory.user_id, "Memory created");
    Ok((StatusCode::CREATED, Json(memory)))
}

/// PUT /memories/{id} - Full replace of the mutable fields
async fn update_memory(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MemoryInput>, JsonRejection>,
) -> ApiResult<Json<Memory>> {
    let id = parse_memory_id(&id)?;
    let Json(input) = payload?;
    let changes = input.validate()?;

    let memory = state
        .store
        .update(id, changes)
        .await
        .map_err(|e| ApiError::from_store(e, Operation::Update))?;

    info!(memory_id = %memory.id, "Memory updated");
    Ok(Json(memory))
}

/// DELETE /memories/{id}
async fn delete_memory(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let id = parse_memory_id(&id)?;

    state
        .store
        .delete(id)
        .await
        .map_err(|e| ApiError::from_store(e, Operation::Delete))?;

    info!(memory_id = %id, "Memory deleted");
    Ok(Json(DeleteResponse {
        message: DELETED_MESSAGE.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_memory_id_accepts_hyphenated_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_memory_id(&id.to_string()).unwrap(), id);
        assert_eq!(
            parse_memory_id(&id.to_string().to_uppercase()).unwrap(),
            id
        );
    }

    #[test]
    fn parse_memory_id_rejects_other_shapes() {
        let id = Uuid::new_v4();
        for raw in [
            "not-a-uuid".to_string(),
            String::new(),
            id.simple().to_string(),
            id.urn().to_string(),
            format!("{{{id}}}"),
            "zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz".to_string(),
        ] {
            assert!(
                matches!(parse_memory_id(&raw), Err(ApiError::InvalidId)),
                "accepted {raw}"
            );
        }
    }
}
