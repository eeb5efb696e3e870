//! Analysis Endpoints
//!
//! 도구별 분석 레코드 CRUD + "complete project analysis" 뷰 +
//! 블록체인 분석 실행.
//!
//! 경로의 `:kind` 세그먼트가 도구를 결정하고 (`metadata`, `keyword`, ...),
//! 레코드 단건 접근은 전부 소유권 확인을 거침 (user_id 불일치 → 403).

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{AnalysisRecord, CompleteAnalysis},
    error::ApiError,
    types::{AnalysisData, AnalysisKind},
    AppState,
};

// ============ Request/Response Types ============

/// 호출자 식별 (소유권 확인용)
#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub user_id: Uuid,
}

/// (사용자, 프로젝트) 조회 파라미터
#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
    pub user_id: Uuid,
    pub project_name: String,
}

/// 분석 레코드 생성 요청
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAnalysisRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub project_name: String,
    #[validate(url)]
    pub project_url: String,
    /// `tool` 태그가 경로의 `:kind` 와 일치해야 함
    pub analysis_data: AnalysisData,
    #[validate(range(min = 0.0, max = 100.0))]
    pub overall_score: f64,
    /// completed | processing | failed (기본 completed)
    pub status: Option<String>,
}

/// 분석 레코드 부분 업데이트 요청
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAnalysisRequest {
    pub analysis_data: Option<AnalysisData>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub overall_score: Option<f64>,
    pub status: Option<String>,
}

/// 블록체인 분석 실행 요청
#[derive(Debug, Deserialize, Validate)]
pub struct RunBlockchainAnalysisRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub project_name: String,
    /// 분석 대상 컨트랙트 주소
    pub contract_address: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

// ============ Handlers ============

/// GET /api/analysis/:kind
///
/// 호출자의 레코드 목록 (created_at DESC)
pub async fn list_analysis(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<AnalysisRecord>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let rows = state.db.list_analysis(kind, query.user_id).await?;
    Ok(Json(rows))
}

/// POST /api/analysis/:kind
///
/// 레코드 생성. 생성과 함께 히스토리 1건을 남기고 프로젝트 요약을 갱신.
pub async fn create_analysis(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(req): Json<CreateAnalysisRequest>,
) -> Result<Json<AnalysisRecord>, ApiError> {
    let kind = parse_kind(&kind)?;
    req.validate()?;

    // 페이로드 태그와 경로 도구가 어긋난 저장은 거부
    if req.analysis_data.kind() != kind {
        return Err(ApiError::BadRequest(format!(
            "analysis_data does not match tool '{}'",
            kind
        )));
    }

    let data = serde_json::to_value(&req.analysis_data)
        .map_err(|_| ApiError::InternalError)?;
    let status = req.status.as_deref().unwrap_or("completed");

    let record = state
        .db
        .create_analysis(
            kind,
            req.user_id,
            &req.project_name,
            &req.project_url,
            &data,
            req.overall_score,
            status,
        )
        .await?;

    state
        .db
        .insert_history(req.user_id, kind.as_str(), Some(&req.project_name), "created")
        .await?;
    state
        .db
        .bump_summary(req.user_id, &req.project_name, kind.as_str(), req.overall_score)
        .await?;

    Ok(Json(record))
}

/// GET /api/analysis/:kind/:id
///
/// 단건 조회. 레코드의 user_id 가 호출자와 다르면 403.
pub async fn get_analysis(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<AnalysisRecord>, ApiError> {
    let kind = parse_kind(&kind)?;

    let record = state
        .db
        .get_analysis(kind, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("analysis record".to_string()))?;

    ensure_owner(record.user_id, query.user_id)?;
    Ok(Json(record))
}

/// PUT /api/analysis/:kind/:id
pub async fn update_analysis(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    Query(query): Query<OwnerQuery>,
    Json(req): Json<UpdateAnalysisRequest>,
) -> Result<Json<AnalysisRecord>, ApiError> {
    let kind = parse_kind(&kind)?;
    req.validate()?;

    if let Some(data) = &req.analysis_data {
        if data.kind() != kind {
            return Err(ApiError::BadRequest(format!(
                "analysis_data does not match tool '{}'",
                kind
            )));
        }
    }

    let existing = state
        .db
        .get_analysis(kind, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("analysis record".to_string()))?;
    ensure_owner(existing.user_id, query.user_id)?;

    let data = match &req.analysis_data {
        Some(d) => Some(serde_json::to_value(d).map_err(|_| ApiError::InternalError)?),
        None => None,
    };

    let record = state
        .db
        .update_analysis(kind, id, data.as_ref(), req.overall_score, req.status.as_deref())
        .await?;

    Ok(Json(record))
}

/// DELETE /api/analysis/:kind/:id
pub async fn delete_analysis(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let kind = parse_kind(&kind)?;

    let existing = state
        .db
        .get_analysis(kind, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("analysis record".to_string()))?;
    ensure_owner(existing.user_id, query.user_id)?;

    state.db.delete_analysis(kind, id).await?;
    state
        .db
        .insert_history(
            query.user_id,
            kind.as_str(),
            Some(&existing.project_name),
            "deleted",
        )
        .await?;

    Ok(Json(DeleteResponse { deleted: true }))
}

/// GET /api/analysis/complete
///
/// 9개 분석 테이블에서 도구별 최신 레코드를 동시에 읽어 한 뷰로 조립
pub async fn get_complete_analysis(
    State(state): State<AppState>,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<CompleteAnalysis>, ApiError> {
    let view = state
        .db
        .complete_analysis(query.user_id, &query.project_name)
        .await?;
    Ok(Json(view))
}

/// POST /api/analysis/blockchain/run
///
/// 익스플로러에서 컨트랙트 상태를 조회해 blockchain_analysis 레코드를
/// 생성하는 "실행" 경로. 점수는 익스플로러가 계산한 활동 점수를 그대로 사용.
pub async fn run_blockchain_analysis(
    State(state): State<AppState>,
    Json(req): Json<RunBlockchainAnalysisRequest>,
) -> Result<Json<AnalysisRecord>, ApiError> {
    req.validate()?;

    if !is_valid_ethereum_address(&req.contract_address) {
        return Err(ApiError::ValidationError(vec![
            "contract_address: invalid ethereum address".to_string(),
        ]));
    }

    let overview = state
        .explorer
        .contract_overview(&req.contract_address)
        .await
        .map_err(|_: anyhow::Error| ApiError::ServiceUnavailable("Block explorer".to_string()))?;

    let kind = AnalysisKind::Blockchain;
    let score = overview.activity_score;
    let project_url = format!("https://etherscan.io/address/{}", overview.contract_address);
    let data = serde_json::to_value(AnalysisData::Blockchain(overview))
        .map_err(|_| ApiError::InternalError)?;

    let record = state
        .db
        .create_analysis(
            kind,
            req.user_id,
            &req.project_name,
            &project_url,
            &data,
            score,
            "completed",
        )
        .await?;

    state
        .db
        .insert_history(req.user_id, kind.as_str(), Some(&req.project_name), "analyzed")
        .await?;
    state
        .db
        .bump_summary(req.user_id, &req.project_name, kind.as_str(), score)
        .await?;

    Ok(Json(record))
}

// ============ Helpers ============

fn parse_kind(segment: &str) -> Result<AnalysisKind, ApiError> {
    AnalysisKind::from_str(segment).map_err(ApiError::BadRequest)
}

/// 레코드 소유자와 호출자가 다르면 403
pub(crate) fn ensure_owner(record_user: Uuid, caller: Uuid) -> Result<(), ApiError> {
    if record_user != caller {
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

fn is_valid_ethereum_address(addr: &str) -> bool {
    // 0x로 시작하고 40자리 hex
    addr.starts_with("0x") && addr.len() == 42 && addr[2..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_parse_kind_known_and_unknown() {
        assert_eq!(parse_kind("content-audit").unwrap(), AnalysisKind::ContentAudit);
        assert!(matches!(
            parse_kind("nonsense"),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_ownership_mismatch_is_403() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        assert!(ensure_owner(owner, owner).is_ok());

        let err = ensure_owner(owner, stranger).unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_ethereum_address_validation() {
        assert!(is_valid_ethereum_address(
            "0x1234567890123456789012345678901234567890"
        ));
        assert!(!is_valid_ethereum_address("0x1234"));
        assert!(!is_valid_ethereum_address(
            "1234567890123456789012345678901234567890xx"
        ));
    }
}
