//! Tool Data Endpoints
//!
//! 도구별 자유형 사용 데이터 (대시보드 위젯이 소비)

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::analysis::OwnerQuery;
use crate::{db::ToolData, error::ApiError, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateToolDataRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub tool_name: String,
    pub data: serde_json::Value,
}

/// GET /api/tool-data
pub async fn list_tool_data(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<ToolData>>, ApiError> {
    let rows = state.db.list_tool_data(query.user_id).await?;
    Ok(Json(rows))
}

/// POST /api/tool-data
pub async fn create_tool_data(
    State(state): State<AppState>,
    Json(req): Json<CreateToolDataRequest>,
) -> Result<Json<ToolData>, ApiError> {
    req.validate()?;
    let row = state
        .db
        .create_tool_data(req.user_id, &req.tool_name, &req.data)
        .await?;
    Ok(Json(row))
}
