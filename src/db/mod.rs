//! Database Module
//!
//! # Interview Q&A
//!
//! Q: 왜 PostgreSQL(Supabase) 인가?
//! A: 대시보드 백엔드에 적합한 이유
//!
//!    1. JSON 지원: 도구별 분석 페이로드를 jsonb 로 저장
//!    2. 인덱싱: 사용자별, 시간별 조회 최적화
//!    3. UNIQUE 제약: tx_hash 중복 결제, (user, project) 요약 중복 차단
//!    4. 생태계: SQLx, Diesel 등 Rust 라이브러리 지원
//!
//! Q: upsert 를 애플리케이션에서 read-then-branch 로 하지 않는 이유는?
//! A: check-then-act 레이스 때문
//!
//!    ```sql
//!    INSERT ... ON CONFLICT (key) DO UPDATE ...
//!    ```
//!
//!    - DB 레벨 원자적 upsert 로 동시 호출자 간 경쟁 제거
//!    - 수동 select → branch → insert/update 패턴은 금지
//!
//! Q: 커넥션 풀은 어떻게 관리하는가?
//! A: SQLx 의 PgPool 사용
//!    - 최소/최대 커넥션 수 설정
//!    - 커넥션 재사용 (오버헤드 감소)
//!    - 타임아웃 처리

mod models;

pub use models::*;

use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::types::AnalysisKind;

/// 분석 테이블 공통 SELECT 컬럼
const ANALYSIS_COLUMNS: &str =
    "id, user_id, project_name, project_url, analysis_data, overall_score, status, created_at, updated_at";

/// 데이터베이스 연결 및 쿼리 담당 (CRUD 파사드)
///
/// 엔티티 × 연산 당 메서드 1개. 필터는 동등 조건, 목록은 created_at DESC,
/// 단건은 id 로 fetch_optional.
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 데이터베이스 연결
    ///
    /// # Connection Pool Settings
    ///
    /// - max_connections: 10 (트래픽에 따라 조정)
    /// - min_connections: 1 (idle 시 최소 유지)
    /// - acquire_timeout: 3초 (커넥션 획득 대기)
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(3))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// 마이그레이션 실행
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await?;
        Ok(())
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ============ Users ============

    /// 이메일 기준 사용자 생성/갱신 (원자적 upsert)
    pub async fn upsert_user(&self, email: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email)
            VALUES ($1, $2)
            ON CONFLICT (email)
            DO UPDATE SET email = EXCLUDED.email
            RETURNING id, email, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// 사용자 단건 조회
    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    // ============ Tool Data ============

    pub async fn list_tool_data(&self, user_id: Uuid) -> Result<Vec<ToolData>> {
        let rows = sqlx::query_as::<_, ToolData>(
            r#"
            SELECT id, user_id, tool_name, data, created_at
            FROM tool_data
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn create_tool_data(
        &self,
        user_id: Uuid,
        tool_name: &str,
        data: &serde_json::Value,
    ) -> Result<ToolData> {
        let row = sqlx::query_as::<_, ToolData>(
            r#"
            INSERT INTO tool_data (id, user_id, tool_name, data)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, tool_name, data, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(tool_name)
        .bind(data)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    // ============ Analysis (9개 테이블 공통) ============
    //
    // 테이블명은 AnalysisKind 의 고정 목록에서만 나옴 (동적 입력 아님)

    pub async fn list_analysis(
        &self,
        kind: AnalysisKind,
        user_id: Uuid,
    ) -> Result<Vec<AnalysisRecord>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE user_id = $1 ORDER BY created_at DESC",
            ANALYSIS_COLUMNS,
            kind.table()
        );

        let rows = sqlx::query_as::<_, AnalysisRecord>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn get_analysis(
        &self,
        kind: AnalysisKind,
        id: Uuid,
    ) -> Result<Option<AnalysisRecord>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            ANALYSIS_COLUMNS,
            kind.table()
        );

        let row = sqlx::query_as::<_, AnalysisRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// (user, project) 의 최신 레코드 1건
    pub async fn latest_analysis(
        &self,
        kind: AnalysisKind,
        user_id: Uuid,
        project_name: &str,
    ) -> Result<Option<AnalysisRecord>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE user_id = $1 AND project_name = $2 \
             ORDER BY created_at DESC LIMIT 1",
            ANALYSIS_COLUMNS,
            kind.table()
        );

        let row = sqlx::query_as::<_, AnalysisRecord>(&sql)
            .bind(user_id)
            .bind(project_name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn create_analysis(
        &self,
        kind: AnalysisKind,
        user_id: Uuid,
        project_name: &str,
        project_url: &str,
        analysis_data: &serde_json::Value,
        overall_score: f64,
        status: &str,
    ) -> Result<AnalysisRecord> {
        let sql = format!(
            "INSERT INTO {} (id, user_id, project_name, project_url, analysis_data, overall_score, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {}",
            kind.table(),
            ANALYSIS_COLUMNS
        );

        let row = sqlx::query_as::<_, AnalysisRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(project_name)
            .bind(project_url)
            .bind(analysis_data)
            .bind(overall_score)
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    /// 부분 업데이트 (없는 필드는 기존 값 유지)
    pub async fn update_analysis(
        &self,
        kind: AnalysisKind,
        id: Uuid,
        analysis_data: Option<&serde_json::Value>,
        overall_score: Option<f64>,
        status: Option<&str>,
    ) -> Result<AnalysisRecord> {
        let sql = format!(
            "UPDATE {} SET \
                analysis_data = COALESCE($2, analysis_data), \
                overall_score = COALESCE($3, overall_score), \
                status = COALESCE($4, status), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {}",
            kind.table(),
            ANALYSIS_COLUMNS
        );

        let row = sqlx::query_as::<_, AnalysisRecord>(&sql)
            .bind(id)
            .bind(analysis_data)
            .bind(overall_score)
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn delete_analysis(&self, kind: AnalysisKind, id: Uuid) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());

        sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// "complete project analysis" 뷰
    ///
    /// 9개 분석 테이블을 동시 조회. 독립적인 읽기이므로 조정 불필요.
    /// 이 코드베이스에서 유일하게 순차 await 를 벗어나는 지점.
    pub async fn complete_analysis(
        &self,
        user_id: Uuid,
        project_name: &str,
    ) -> Result<CompleteAnalysis> {
        let (
            metadata,
            content_audit,
            keyword,
            link_verification,
            performance,
            competition,
            blockchain,
            ai_dashboard,
            social_web3,
        ) = tokio::try_join!(
            self.latest_analysis(AnalysisKind::Metadata, user_id, project_name),
            self.latest_analysis(AnalysisKind::ContentAudit, user_id, project_name),
            self.latest_analysis(AnalysisKind::Keyword, user_id, project_name),
            self.latest_analysis(AnalysisKind::LinkVerification, user_id, project_name),
            self.latest_analysis(AnalysisKind::Performance, user_id, project_name),
            self.latest_analysis(AnalysisKind::Competition, user_id, project_name),
            self.latest_analysis(AnalysisKind::Blockchain, user_id, project_name),
            self.latest_analysis(AnalysisKind::AiDashboard, user_id, project_name),
            self.latest_analysis(AnalysisKind::SocialWeb3, user_id, project_name),
        )?;

        Ok(CompleteAnalysis {
            metadata,
            content_audit,
            keyword,
            link_verification,
            performance,
            competition,
            blockchain,
            ai_dashboard,
            social_web3,
        })
    }

    // ============ Payments ============

    pub async fn list_payments(&self, user_id: Uuid) -> Result<Vec<ToolPayment>> {
        let rows = sqlx::query_as::<_, ToolPayment>(
            r#"
            SELECT id, user_id, tool_name, tx_hash, amount_wei, status, created_at
            FROM tool_payments
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_payment(&self, id: Uuid) -> Result<Option<ToolPayment>> {
        let row = sqlx::query_as::<_, ToolPayment>(
            r#"
            SELECT id, user_id, tool_name, tx_hash, amount_wei, status, created_at
            FROM tool_payments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// 결제 생성. 동일 tx_hash 가 이미 있으면 `None` (호출부에서 409 처리)
    ///
    /// ON CONFLICT DO NOTHING + RETURNING 조합이라 중복 검사와 삽입이
    /// 한 문장에서 원자적으로 끝남 (사전 SELECT 없음)
    pub async fn create_payment(
        &self,
        user_id: Uuid,
        tool_name: &str,
        tx_hash: &str,
        amount_wei: &str,
        status: &str,
    ) -> Result<Option<ToolPayment>> {
        let row = sqlx::query_as::<_, ToolPayment>(
            r#"
            INSERT INTO tool_payments (id, user_id, tool_name, tx_hash, amount_wei, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (tx_hash) DO NOTHING
            RETURNING id, user_id, tool_name, tx_hash, amount_wei, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(tool_name)
        .bind(tx_hash.to_lowercase())
        .bind(amount_wei)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============ Indexers ============

    pub async fn list_indexers(&self, user_id: Uuid) -> Result<Vec<Indexer>> {
        let rows = sqlx::query_as::<_, Indexer>(
            r#"
            SELECT id, name, status, user_id, created_at
            FROM indexers
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_indexer(&self, id: Uuid) -> Result<Option<Indexer>> {
        let row = sqlx::query_as::<_, Indexer>(
            "SELECT id, name, status, user_id, created_at FROM indexers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn create_indexer(&self, user_id: Uuid, name: &str) -> Result<Indexer> {
        let row = sqlx::query_as::<_, Indexer>(
            r#"
            INSERT INTO indexers (id, name, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, status, user_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_indexer(
        &self,
        id: Uuid,
        name: Option<&str>,
        status: Option<&str>,
    ) -> Result<Indexer> {
        let row = sqlx::query_as::<_, Indexer>(
            r#"
            UPDATE indexers
            SET name = COALESCE($2, name), status = COALESCE($3, status)
            WHERE id = $1
            RETURNING id, name, status, user_id, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_indexer_jobs(&self, indexer_id: Uuid) -> Result<Vec<IndexerJob>> {
        let rows = sqlx::query_as::<_, IndexerJob>(
            r#"
            SELECT id, indexer_id, status, started_at, finished_at, error, created_at
            FROM indexer_jobs
            WHERE indexer_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(indexer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn list_indexer_configs(&self, indexer_id: Uuid) -> Result<Vec<IndexerConfig>> {
        let rows = sqlx::query_as::<_, IndexerConfig>(
            r#"
            SELECT id, indexer_id, key, value, created_at
            FROM indexer_configs
            WHERE indexer_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(indexer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// 인덱서 삭제
    ///
    /// DB cascade 없음. 자식 행(jobs/configs)을 명시적으로 순회하며
    /// 한 건씩 지운 뒤 부모를 지움 (마이그레이션과 같은 소유권 규칙)
    pub async fn delete_indexer(&self, id: Uuid) -> Result<()> {
        let jobs = self.list_indexer_jobs(id).await?;
        for job in &jobs {
            sqlx::query("DELETE FROM indexer_jobs WHERE id = $1")
                .bind(job.id)
                .execute(&self.pool)
                .await?;
        }

        let configs = self.list_indexer_configs(id).await?;
        for config in &configs {
            sqlx::query("DELETE FROM indexer_configs WHERE id = $1")
                .bind(config.id)
                .execute(&self.pool)
                .await?;
        }

        sqlx::query("DELETE FROM indexers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // ============ Settings ============

    pub async fn get_settings(&self, user_id: Uuid) -> Result<Option<UserSettings>> {
        let row = sqlx::query_as::<_, UserSettings>(
            "SELECT id, user_id, preferences, updated_at FROM user_settings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// 설정 upsert (user_id 당 1행)
    pub async fn upsert_settings(
        &self,
        user_id: Uuid,
        preferences: &serde_json::Value,
    ) -> Result<UserSettings> {
        let row = sqlx::query_as::<_, UserSettings>(
            r#"
            INSERT INTO user_settings (id, user_id, preferences)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id)
            DO UPDATE SET
                preferences = EXCLUDED.preferences,
                updated_at = NOW()
            RETURNING id, user_id, preferences, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(preferences)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    // ============ History ============

    pub async fn list_history(
        &self,
        user_id: Uuid,
        limit: u32,
    ) -> Result<Vec<AnalysisHistoryEntry>> {
        let rows = sqlx::query_as::<_, AnalysisHistoryEntry>(
            r#"
            SELECT id, user_id, tool_name, project_name, action, created_at
            FROM analysis_history
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn insert_history(
        &self,
        user_id: Uuid,
        tool_name: &str,
        project_name: Option<&str>,
        action: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO analysis_history (id, user_id, tool_name, project_name, action)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(tool_name)
        .bind(project_name)
        .bind(action)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ============ Summaries ============

    pub async fn get_summary(
        &self,
        user_id: Uuid,
        project_name: &str,
    ) -> Result<Option<AnalysisSummary>> {
        let row = sqlx::query_as::<_, AnalysisSummary>(
            r#"
            SELECT id, user_id, project_name, total_analyses, tools_used, average_score, updated_at
            FROM analysis_summaries
            WHERE user_id = $1 AND project_name = $2
            "#,
        )
        .bind(user_id)
        .bind(project_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// 분석 1건 반영: 카운트 증가, 도구 목록 합류, 평균 점수 갱신
    ///
    /// (user_id, project_name) UNIQUE 제약 위에서 원자적 upsert
    pub async fn bump_summary(
        &self,
        user_id: Uuid,
        project_name: &str,
        tool_name: &str,
        score: f64,
    ) -> Result<AnalysisSummary> {
        let row = sqlx::query_as::<_, AnalysisSummary>(
            r#"
            INSERT INTO analysis_summaries
                (id, user_id, project_name, total_analyses, tools_used, average_score)
            VALUES ($1, $2, $3, 1, ARRAY[$4]::text[], $5)
            ON CONFLICT (user_id, project_name)
            DO UPDATE SET
                total_analyses = analysis_summaries.total_analyses + 1,
                tools_used = CASE
                    WHEN $4 = ANY(analysis_summaries.tools_used)
                        THEN analysis_summaries.tools_used
                    ELSE array_append(analysis_summaries.tools_used, $4)
                END,
                average_score =
                    (analysis_summaries.average_score * analysis_summaries.total_analyses + $5)
                    / (analysis_summaries.total_analyses + 1),
                updated_at = NOW()
            RETURNING id, user_id, project_name, total_analyses, tools_used, average_score, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(project_name)
        .bind(tool_name)
        .bind(score)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}
