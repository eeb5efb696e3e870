//! Legacy → Supabase Migration CLI
//!
//! 레거시(Prisma) PostgreSQL 의 전체 데이터를 Supabase 로 복사하는
//! 일회성 도구. 플래그 없음, 접속 정보는 환경변수로만 받음.
//!
//! ```text
//! LEGACY_DATABASE_URL=postgres://... \
//! SUPABASE_URL=https://xxx.supabase.co \
//! SUPABASE_ANON_KEY=... \
//! cargo run --bin migrate-legacy
//! ```
//!
//! 행 단위 실패는 기록 후 계속 진행하고, 마지막에 엔티티별 리포트를 출력.
//! 엔티티 함수 밖으로 전파된 에러만 비정상 종료(exit 1)를 만듦.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use web3_analyzer_api::migrate::{self, LegacySource, SupabaseWriter};
use web3_analyzer_api::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "migrate_legacy=info,web3_analyzer_api=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚚 Starting legacy → Supabase migration");

    let config = Config::from_env()?;

    let source = LegacySource::connect(&config.legacy_database_url).await?;
    tracing::info!("🗄️  Legacy database connected");

    let writer = SupabaseWriter::new(&config.supabase_url, &config.supabase_anon_key);

    // 전체 시퀀스 실행. 커넥션 정리는 결과와 무관하게 수행 (finally 상당)
    let outcome = migrate::run_full_migration(&source, &writer).await;
    source.close().await;

    let reports = match outcome {
        Ok(reports) => reports,
        Err(e) => {
            tracing::error!("❌ Migration aborted: {:#}", e);
            std::process::exit(1);
        }
    };

    // 엔티티별 리포트 출력
    let mut total_found = 0;
    let mut total_migrated = 0;
    for report in &reports {
        total_found += report.found;
        total_migrated += report.migrated;
        tracing::info!(
            entity = report.entity,
            found = report.found,
            migrated = report.migrated,
            failed = report.failures.len(),
            "migration report"
        );
        for failure in &report.failures {
            tracing::warn!(
                entity = report.entity,
                row = %failure.id,
                reason = %failure.reason,
                "row failed"
            );
        }
    }

    tracing::info!(
        total_found,
        total_migrated,
        total_failed = total_found - total_migrated,
        "✅ Migration finished"
    );

    Ok(())
}
