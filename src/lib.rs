//! Web3 Project Analyzer API Library
//!
//! # Overview
//!
//! Web3/SEO 프로젝트 분석 대시보드의 백엔드.
//! 분석 레코드/결제/인덱서/블록체인 데이터를 Supabase 호스팅 PostgreSQL 에
//! 저장하고, 레거시(Prisma) 스토어에서의 일회성 마이그레이션 도구를 포함함.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     API (axum)                           │
//! │                                                          │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌─────────┐    │
//! │  │ Routes  │  │Services │  │   DB    │  │  Types  │    │
//! │  └────┬────┘  └────┬────┘  └────┬────┘  └────┬────┘    │
//! │       │            │            │            │          │
//! │       └────────────┴────────────┴────────────┘          │
//! │                         │                                │
//! └─────────────────────────┼────────────────────────────────┘
//!                           ▼
//!                  ┌────────────────┐       ┌──────────────┐
//!                  │ Supabase (PG)  │ ◀──── │ migrate-     │
//!                  └────────────────┘  REST │ legacy (ETL) │
//!                                           └──────┬───────┘
//!                                                  │ sqlx
//!                                           ┌──────▼───────┐
//!                                           │ Legacy (PG)  │
//!                                           └──────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: 환경 설정 관리
//! - `error`: 에러 타입 및 HTTP 매핑
//! - `routes`: HTTP 엔드포인트 핸들러
//! - `services`: 비즈니스 로직 (블록 익스플로러)
//! - `db`: 목적지 스토어 CRUD 파사드
//! - `types`: 분석 도구/페이로드 공통 타입
//! - `migrate`: 레거시 → Supabase ETL 엔진
//!
//! ## Usage
//!
//! ```rust,ignore
//! use web3_analyzer_api::{Config, Database, ExplorerClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let db = Database::connect(&config.database_url).await?;
//!
//!     // ... 서버 시작
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

pub mod config;
pub mod db;
pub mod error;
pub mod migrate;
pub mod routes;
pub mod services;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use db::Database;
pub use error::ApiError;
pub use services::ExplorerClient;

/// 애플리케이션 전역 상태
///
/// 모듈 전역 싱글톤 대신 생성자 주입 (테스트 더블과 수명 관리)
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub explorer: Arc<ExplorerClient>,
    pub config: Arc<Config>,
}
