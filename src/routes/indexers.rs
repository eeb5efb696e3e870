//! Indexer Endpoints
//!
//! 인덱서 CRUD. 단건 조회는 자식 행(jobs/configs)을 함께 실어주고,
//! 삭제는 DB cascade 없이 자식 행을 명시적으로 지운 뒤 부모를 지움.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::analysis::{ensure_owner, DeleteResponse, OwnerQuery};
use crate::{
    db::{Indexer, IndexerConfig, IndexerJob},
    error::ApiError,
    AppState,
};

// ============ Request/Response Types ============

#[derive(Debug, Deserialize, Validate)]
pub struct CreateIndexerRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateIndexerRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    /// active | paused | error
    pub status: Option<String>,
}

/// 인덱서 + 자식 행
#[derive(Debug, Serialize)]
pub struct IndexerDetailResponse {
    pub indexer: Indexer,
    pub jobs: Vec<IndexerJob>,
    pub configs: Vec<IndexerConfig>,
}

// ============ Handlers ============

/// GET /api/indexers
pub async fn list_indexers(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<Indexer>>, ApiError> {
    let rows = state.db.list_indexers(query.user_id).await?;
    Ok(Json(rows))
}

/// POST /api/indexers
pub async fn create_indexer(
    State(state): State<AppState>,
    Json(req): Json<CreateIndexerRequest>,
) -> Result<Json<Indexer>, ApiError> {
    req.validate()?;
    let indexer = state.db.create_indexer(req.user_id, &req.name).await?;
    Ok(Json(indexer))
}

/// GET /api/indexers/:id
///
/// jobs/configs eager-load 포함
pub async fn get_indexer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<IndexerDetailResponse>, ApiError> {
    let indexer = state
        .db
        .get_indexer(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("indexer".to_string()))?;
    ensure_owner(indexer.user_id, query.user_id)?;

    let jobs = state.db.list_indexer_jobs(id).await?;
    let configs = state.db.list_indexer_configs(id).await?;

    Ok(Json(IndexerDetailResponse {
        indexer,
        jobs,
        configs,
    }))
}

/// PUT /api/indexers/:id
pub async fn update_indexer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<OwnerQuery>,
    Json(req): Json<UpdateIndexerRequest>,
) -> Result<Json<Indexer>, ApiError> {
    req.validate()?;

    if let Some(status) = &req.status {
        if !matches!(status.as_str(), "active" | "paused" | "error") {
            return Err(ApiError::BadRequest(format!(
                "invalid indexer status '{}'",
                status
            )));
        }
    }

    let existing = state
        .db
        .get_indexer(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("indexer".to_string()))?;
    ensure_owner(existing.user_id, query.user_id)?;

    let indexer = state
        .db
        .update_indexer(id, req.name.as_deref(), req.status.as_deref())
        .await?;
    Ok(Json(indexer))
}

/// DELETE /api/indexers/:id
pub async fn delete_indexer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let existing = state
        .db
        .get_indexer(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("indexer".to_string()))?;
    ensure_owner(existing.user_id, query.user_id)?;

    state.db.delete_indexer(id).await?;
    Ok(Json(DeleteResponse { deleted: true }))
}
