//! User Endpoints
//!
//! 이메일 기준 등록. 같은 이메일로 다시 POST 하면 기존 행이 반환됨
//! (DB 레벨 원자적 upsert, 사전 SELECT 없음).

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{db::User, error::ApiError, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<User>, ApiError> {
    req.validate()?;
    let user = state.db.upsert_user(&req.email).await?;
    Ok(Json(user))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .db
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user".to_string()))?;
    Ok(Json(user))
}
