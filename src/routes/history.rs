//! History Endpoints
//!
//! 분석 생성/실행/삭제 때 쌓이는 활동 로그 조회

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{db::AnalysisHistoryEntry, error::ApiError, AppState};

/// 히스토리 쿼리 파라미터
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub user_id: Uuid,
    /// 조회 개수 (기본 50, 최대 200)
    pub limit: Option<u32>,
}

/// GET /api/history
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<AnalysisHistoryEntry>>, ApiError> {
    let limit = query.limit.unwrap_or(50).min(200);
    let rows = state.db.list_history(query.user_id, limit).await?;
    Ok(Json(rows))
}
