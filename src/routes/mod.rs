//! API Routes Module
//!
//! 모든 HTTP 엔드포인트 정의
//!
//! # Routes
//! - `/health` - 헬스 체크
//! - `/api/users` - 사용자 등록/조회
//! - `/api/analysis/:kind` - 도구별 분석 레코드 CRUD
//! - `/api/analysis/complete` - 프로젝트 전체 분석 뷰
//! - `/api/analysis/blockchain/run` - 블록체인 분석 실행
//! - `/api/payments` - 도구 결제
//! - `/api/indexers` - 인덱서 (+jobs/configs)
//! - `/api/tool-data` - 도구 사용 데이터
//! - `/api/settings` - 사용자 설정
//! - `/api/history` - 활동 히스토리
//! - `/api/summary` - 프로젝트 요약

pub mod analysis;
pub mod health;
pub mod history;
pub mod indexers;
pub mod payments;
pub mod settings;
pub mod summary;
pub mod tools;
pub mod users;
