//! Web3 Project Analyzer API Server
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Client (Dashboard Frontend)                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum Web Server                         │
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                      Routes Layer                        ││
//! │  │  /health  /api/analysis/*  /api/payments  /api/indexers ││
//! │  │  /api/settings  /api/history  /api/summary  /api/users  ││
//! │  └─────────────────────────────────────────────────────────┘│
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                    Services Layer                        ││
//! │  │                    ExplorerClient                        ││
//! │  └─────────────────────────────────────────────────────────┘│
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                    Data Layer                            ││
//! │  │           PostgreSQL (Supabase) CRUD Facade              ││
//! │  └─────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// 라이브러리에서 가져오기
use web3_analyzer_api::{routes, AppState, Config, Database, ExplorerClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    // RUST_LOG=debug,sqlx=warn 형태로 레벨 제어 가능
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "web3_analyzer_api=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting Web3 Project Analyzer API Server");

    // 설정 로드
    let config = Config::from_env()?;
    tracing::info!("📋 Configuration loaded");

    // 데이터베이스 연결
    let db = Database::connect(&config.database_url).await?;
    tracing::info!("🗄️  Database connected");

    // 마이그레이션 실행
    db.run_migrations().await?;
    tracing::info!("📦 Migrations completed");

    // 서비스 초기화
    let explorer = ExplorerClient::new(&config.explorer_api_url, config.explorer_api_key.clone());
    tracing::info!("🔎 Block explorer client ready");

    // 앱 상태 구성
    let state = AppState {
        db: Arc::new(db),
        explorer: Arc::new(explorer),
        config: Arc::new(config.clone()),
    };

    // 라우터 구성
    let app = create_router(state);

    // 서버 시작
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🌐 Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// 라우터 생성
///
/// # Route Structure
///
/// ```text
/// GET  /health                        - 서버 상태 확인
///
/// POST /api/users                     - 사용자 등록 (email upsert)
/// GET  /api/users/:id                 - 사용자 조회
///
/// GET  /api/analysis/complete         - 프로젝트 전체 분석 뷰 (9테이블 동시 조회)
/// POST /api/analysis/blockchain/run   - 블록체인 분석 실행
/// GET  /api/analysis/:kind            - 분석 레코드 목록
/// POST /api/analysis/:kind            - 분석 레코드 생성
/// GET  /api/analysis/:kind/:id        - 단건 조회 (소유권 확인)
/// PUT  /api/analysis/:kind/:id        - 업데이트
/// DEL  /api/analysis/:kind/:id        - 삭제
///
/// GET  /api/payments                  - 결제 목록
/// POST /api/payments                  - 결제 생성 (중복 tx_hash → 409)
/// GET  /api/payments/:id              - 결제 조회
///
/// GET  /api/indexers                  - 인덱서 목록
/// POST /api/indexers                  - 인덱서 생성
/// GET  /api/indexers/:id              - 인덱서 + jobs/configs
/// PUT  /api/indexers/:id              - 업데이트
/// DEL  /api/indexers/:id              - 삭제 (자식 행 명시적 삭제)
///
/// GET  /api/tool-data                 - 도구 데이터 목록
/// POST /api/tool-data                 - 도구 데이터 생성
/// GET  /api/settings  PUT /api/settings
/// GET  /api/history   GET /api/summary
/// ```
fn create_router(state: AppState) -> Router {
    // CORS 설정
    // 프로덕션에서는 특정 도메인만 허용
    // 개발 환경에서는 localhost 허용
    use tower_http::cors::AllowOrigin;

    let cors = if state.config.is_production() {
        // 프로덕션: 특정 도메인만 허용 (환경변수로 설정)
        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "https://yourdomain.com".to_string());
        let origins: Vec<_> = allowed_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
            ])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    } else {
        // 개발: localhost 허용
        CorsLayer::new()
            .allow_origin([
                "http://localhost:5173".parse().unwrap(),  // Vite dev server
                "http://localhost:3000".parse().unwrap(),  // Alternative
                "http://127.0.0.1:5173".parse().unwrap(),
            ])
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        // Health check
        .route("/health", get(routes::health::health_check))

        // Users
        .route("/api/users", post(routes::users::create_user))
        .route("/api/users/:id", get(routes::users::get_user))

        // Analysis (static 경로가 :kind 캡처보다 우선 매칭됨)
        .route("/api/analysis/complete", get(routes::analysis::get_complete_analysis))
        .route("/api/analysis/blockchain/run", post(routes::analysis::run_blockchain_analysis))
        .route(
            "/api/analysis/:kind",
            get(routes::analysis::list_analysis).post(routes::analysis::create_analysis),
        )
        .route(
            "/api/analysis/:kind/:id",
            get(routes::analysis::get_analysis)
                .put(routes::analysis::update_analysis)
                .delete(routes::analysis::delete_analysis),
        )

        // Payments
        .route(
            "/api/payments",
            get(routes::payments::list_payments).post(routes::payments::create_payment),
        )
        .route("/api/payments/:id", get(routes::payments::get_payment))

        // Indexers
        .route(
            "/api/indexers",
            get(routes::indexers::list_indexers).post(routes::indexers::create_indexer),
        )
        .route(
            "/api/indexers/:id",
            get(routes::indexers::get_indexer)
                .put(routes::indexers::update_indexer)
                .delete(routes::indexers::delete_indexer),
        )

        // Tool data
        .route(
            "/api/tool-data",
            get(routes::tools::list_tool_data).post(routes::tools::create_tool_data),
        )

        // Settings / History / Summary
        .route(
            "/api/settings",
            get(routes::settings::get_settings).put(routes::settings::put_settings),
        )
        .route("/api/history", get(routes::history::list_history))
        .route("/api/summary", get(routes::summary::get_summary))

        // 미들웨어
        .layer(TraceLayer::new_for_http())
        .layer(cors)

        // 상태 주입
        .with_state(state)
}
