//! Database Models
//!
//! Destination-store row types, one struct per table.
//! JSON payload columns stay `serde_json::Value` at this boundary;
//! the typed `AnalysisData` union lives at the API edge.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// 사용자
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// 도구 사용 데이터 (도구별 자유형 페이로드)
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ToolData {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tool_name: String,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// 분석 레코드 (9개 분석 테이블이 같은 행 구성을 공유)
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_name: String,
    pub project_url: String,
    /// 도구별 페이로드 (`AnalysisData` 직렬화 결과)
    pub analysis_data: serde_json::Value,
    pub overall_score: Option<f64>,
    /// completed | processing | failed
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 인덱서
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Indexer {
    pub id: Uuid,
    pub name: String,
    /// active | paused | error
    pub status: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// 인덱서 작업 (indexer 1 : N jobs)
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IndexerJob {
    pub id: Uuid,
    pub indexer_id: Uuid,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 인덱서 설정 (indexer 1 : N configs)
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IndexerConfig {
    pub id: Uuid,
    pub indexer_id: Uuid,
    pub key: String,
    pub value: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// 블록 (block → transaction → event 소유 체인의 루트)
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Block {
    pub id: Uuid,
    pub block_number: i64,
    pub block_hash: String,
    pub parent_hash: String,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// 트랜잭션
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Transaction {
    pub id: Uuid,
    pub block_id: Uuid,
    pub tx_hash: String,
    pub from_address: String,
    pub to_address: Option<String>,
    /// wei 단위, 문자열 (u256 범위)
    pub value_wei: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// 트랜잭션 이벤트 (로그)
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TransactionEvent {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub event_name: String,
    pub log_index: i32,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// 도구 결제 (tx_hash unique, 중복 결제는 409)
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ToolPayment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tool_name: String,
    pub tx_hash: String,
    pub amount_wei: String,
    /// pending | confirmed | failed
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// 사용자 설정 (user_id 당 1행)
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserSettings {
    pub id: Uuid,
    pub user_id: Uuid,
    pub preferences: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// 분석 히스토리 엔트리
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnalysisHistoryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tool_name: String,
    pub project_name: Option<String>,
    /// created | analyzed | deleted
    pub action: String,
    pub created_at: DateTime<Utc>,
}

/// (user, project) 당 1행의 롤업
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnalysisSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_name: String,
    pub total_analyses: i32,
    pub tools_used: Vec<String>,
    pub average_score: f64,
    pub updated_at: DateTime<Utc>,
}

/// "complete project analysis" 뷰. 도구별 최신 레코드 1건씩
///
/// 9개 테이블을 동시에 읽어 조립 (db::Database::complete_analysis)
#[derive(Debug, Clone, Serialize)]
pub struct CompleteAnalysis {
    pub metadata: Option<AnalysisRecord>,
    pub content_audit: Option<AnalysisRecord>,
    pub keyword: Option<AnalysisRecord>,
    pub link_verification: Option<AnalysisRecord>,
    pub performance: Option<AnalysisRecord>,
    pub competition: Option<AnalysisRecord>,
    pub blockchain: Option<AnalysisRecord>,
    pub ai_dashboard: Option<AnalysisRecord>,
    pub social_web3: Option<AnalysisRecord>,
}
