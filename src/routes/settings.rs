//! Settings Endpoints
//!
//! 사용자당 1행. 아직 저장된 설정이 없는 사용자에게는 빈 preferences 를
//! 돌려줌 (새 사용자를 404 로 취급하지 않음).

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::analysis::OwnerQuery;
use crate::{error::ApiError, AppState};

// ============ Request/Response Types ============

#[derive(Debug, Deserialize, Validate)]
pub struct PutSettingsRequest {
    pub user_id: Uuid,
    pub preferences: serde_json::Value,
}

/// 설정 응답 (저장 전 사용자도 같은 형태로 받음)
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub user_id: Uuid,
    pub preferences: serde_json::Value,
    pub updated_at: String,
}

// ============ Handlers ============

/// GET /api/settings
pub async fn get_settings(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let settings = state.db.get_settings(query.user_id).await?;

    match settings {
        Some(row) => Ok(Json(SettingsResponse {
            user_id: row.user_id,
            preferences: row.preferences,
            updated_at: row.updated_at.to_rfc3339(),
        })),
        None => {
            // 저장된 설정이 없으면 빈 기본값
            Ok(Json(SettingsResponse {
                user_id: query.user_id,
                preferences: serde_json::json!({}),
                updated_at: chrono::Utc::now().to_rfc3339(),
            }))
        }
    }
}

/// PUT /api/settings
///
/// user_id UNIQUE 제약 위의 원자적 upsert
pub async fn put_settings(
    State(state): State<AppState>,
    Json(req): Json<PutSettingsRequest>,
) -> Result<Json<SettingsResponse>, ApiError> {
    req.validate()?;

    let row = state
        .db
        .upsert_settings(req.user_id, &req.preferences)
        .await?;

    Ok(Json(SettingsResponse {
        user_id: row.user_id,
        preferences: row.preferences,
        updated_at: row.updated_at.to_rfc3339(),
    }))
}
