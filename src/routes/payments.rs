//! Payment Endpoints
//!
//! 도구 사용 결제 기록. tx_hash 가 UNIQUE 라서 같은 트랜잭션으로
//! 두 번 결제를 만들 수 없음. 중복이면 409 를 반환하고 행을 만들지 않음.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::analysis::{ensure_owner, OwnerQuery};
use crate::{db::ToolPayment, error::ApiError, AppState};

// ============ Request Types ============

/// 결제 생성 요청
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub tool_name: String,
    /// 0x + 64자리 hex
    pub tx_hash: String,
    /// wei 단위 10진수 문자열
    pub amount_wei: String,
    /// pending | confirmed | failed (기본 pending)
    pub status: Option<String>,
}

// ============ Handlers ============

/// GET /api/payments
pub async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<ToolPayment>>, ApiError> {
    let rows = state.db.list_payments(query.user_id).await?;
    Ok(Json(rows))
}

/// GET /api/payments/:id
pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<ToolPayment>, ApiError> {
    let payment = state
        .db
        .get_payment(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("payment".to_string()))?;

    ensure_owner(payment.user_id, query.user_id)?;
    Ok(Json(payment))
}

/// POST /api/payments
///
/// 동일 tx_hash 의 결제가 이미 있으면 409 (두 번째 행은 만들지 않음)
pub async fn create_payment(
    State(state): State<AppState>,
    Json(req): Json<CreatePaymentRequest>,
) -> Result<Json<ToolPayment>, ApiError> {
    req.validate()?;

    if !is_valid_tx_hash(&req.tx_hash) {
        return Err(ApiError::ValidationError(vec![
            "tx_hash: must be 0x-prefixed 32-byte hex".to_string(),
        ]));
    }
    if !is_decimal_string(&req.amount_wei) {
        return Err(ApiError::ValidationError(vec![
            "amount_wei: must be a decimal string".to_string(),
        ]));
    }

    let status = req.status.as_deref().unwrap_or("pending");

    let payment = state
        .db
        .create_payment(req.user_id, &req.tool_name, &req.tx_hash, &req.amount_wei, status)
        .await?
        .ok_or_else(|| {
            ApiError::Conflict("payment with this tx hash already exists".to_string())
        })?;

    Ok(Json(payment))
}

// ============ Helpers ============

fn is_valid_tx_hash(hash: &str) -> bool {
    hash.len() == 66
        && hash.starts_with("0x")
        && hex::decode(&hash[2..]).map(|b| b.len() == 32).unwrap_or(false)
}

fn is_decimal_string(s: &str) -> bool {
    !s.is_empty() && s.len() <= 78 && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_tx_hash_validation() {
        let valid = format!("0x{}", "ab".repeat(32));
        assert!(is_valid_tx_hash(&valid));

        assert!(!is_valid_tx_hash("0x1234")); // 길이 부족
        assert!(!is_valid_tx_hash(&format!("0x{}", "zz".repeat(32)))); // hex 아님
        assert!(!is_valid_tx_hash(&"ab".repeat(33))); // 0x 없음
    }

    #[test]
    fn test_amount_validation() {
        assert!(is_decimal_string("0"));
        assert!(is_decimal_string("1500000000000000000"));
        assert!(!is_decimal_string(""));
        assert!(!is_decimal_string("1.5"));
        assert!(!is_decimal_string("0x10"));
    }

    #[test]
    fn test_duplicate_payment_maps_to_409() {
        let err = ApiError::Conflict("payment with this tx hash already exists".to_string());
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }
}
