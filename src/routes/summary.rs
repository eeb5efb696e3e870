//! Summary Endpoints
//!
//! (user, project) 당 1행의 롤업 조회. 행은 분석 생성/실행 시
//! bump_summary 가 원자적 upsert 로 유지함.

use axum::{
    extract::{Query, State},
    Json,
};

use super::analysis::ProjectQuery;
use crate::{db::AnalysisSummary, error::ApiError, AppState};

/// GET /api/summary
pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<AnalysisSummary>, ApiError> {
    let summary = state
        .db
        .get_summary(query.user_id, &query.project_name)
        .await?
        .ok_or_else(|| ApiError::NotFound("analysis summary".to_string()))?;

    Ok(Json(summary))
}
