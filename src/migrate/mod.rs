//! Legacy → Supabase Migration Engine
//!
//! # Interview Q&A
//!
//! Q: 전체 실행 순서는 어떻게 정했는가?
//! A: 부모 → 자식 순서를 손으로 고정
//!
//!    users → tool_data → 분석 9종 → indexers(+jobs/configs)
//!    → blocks(→transactions→events) → payments → settings
//!    → history → summaries
//!
//!    쓰기가 트랜잭션으로 묶이지 않으므로 FK 가 깨지지 않으려면
//!    이 순서 자체가 유일한 보장 수단임
//!
//! Q: 행 단위 실패는 어떻게 다루는가?
//! A: best-effort 벌크 마이그레이션 + 행별 실패 리포트
//!    - 실패 행은 기록하고 계속 진행, 재시도 없음
//!    - 각 엔티티 함수가 MigrationReport 를 반환 → 호출자가
//!      실패 행 재처리 여부를 결정 (콘솔 로그에만 의존하지 않음)
//!    - 엔티티 함수 밖으로 튀어나온 에러(소스 fetch 실패 등)만
//!      전체 시퀀스를 중단시킴
//!
//! Q: 재실행하면 어떻게 되는가?
//! A: 엔티티마다 다름 (현재 동작 유지)
//!    - users / indexers / summaries: upsert → 멱등
//!    - 나머지: plain insert → 행 중복

pub mod entities;
pub mod map;
pub mod report;
pub mod source;
pub mod writer;

pub use report::{MigrationReport, RowFailure};
pub use source::LegacySource;
pub use writer::{DestinationWriter, SupabaseWriter};

use anyhow::Result;

use crate::types::AnalysisKind;

/// 전체 마이그레이션 실행
///
/// 소스 fetch 에러 등 엔티티 함수 내부에서 잡히지 않은 에러는 여기서
/// `?` 로 전파되어 남은 단계를 중단시킴. 레거시 커넥션 정리는 호출자
/// (bin) 가 결과와 무관하게 수행.
pub async fn run_full_migration(
    source: &LegacySource,
    dest: &dyn DestinationWriter,
) -> Result<Vec<MigrationReport>> {
    let mut reports = Vec::new();

    tracing::info!("migrating users");
    reports.push(entities::copy_users(&source.fetch_users().await?, dest).await);

    tracing::info!("migrating tool data");
    reports.push(entities::copy_tool_data(&source.fetch_tool_data().await?, dest).await);

    for kind in AnalysisKind::ALL {
        tracing::info!(tool = %kind, "migrating analysis table");
        reports.push(
            entities::copy_analysis(kind, &source.fetch_analysis(kind).await?, dest).await,
        );
    }

    tracing::info!("migrating indexers (+jobs/configs)");
    reports.extend(entities::copy_indexers(&source.fetch_indexers().await?, dest).await);

    tracing::info!("migrating blockchain data (blocks → transactions → events)");
    reports.extend(entities::copy_blocks(&source.fetch_blocks().await?, dest).await);

    tracing::info!("migrating payments");
    reports.push(entities::copy_payments(&source.fetch_payments().await?, dest).await);

    tracing::info!("migrating user settings");
    reports.push(entities::copy_settings(&source.fetch_settings().await?, dest).await);

    tracing::info!("migrating analysis history");
    reports.push(entities::copy_history(&source.fetch_history().await?, dest).await);

    tracing::info!("migrating analysis summaries");
    reports.push(entities::copy_summaries(&source.fetch_summaries().await?, dest).await);

    Ok(reports)
}
