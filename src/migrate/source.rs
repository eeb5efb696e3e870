//! Legacy Source Reader
//!
//! Prisma 가 관리하던 레거시 PostgreSQL 에서 전체 행을 읽어옴.
//! 테이블/컬럼이 PascalCase/camelCase quoted identifier 라서
//! SELECT 절에서 snake_case 로 alias 해 구조체에 매핑.
//!
//! 자식 엔티티(인덱서의 jobs/configs, 블록의 transactions/events)는
//! 부모를 읽은 뒤 부모별로 eager-load 해 트리로 돌려줌. 기록 순서가
//! 트랜잭션 없이도 부모→자식을 지키도록.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use uuid::Uuid;

use crate::types::AnalysisKind;

// ============ Legacy Row Types ============

#[derive(Debug, Clone, FromRow)]
pub struct LegacyUser {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LegacyToolData {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tool_name: String,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// 9개 분석 테이블이 공유하는 행 구성
#[derive(Debug, Clone, FromRow)]
pub struct LegacyAnalysis {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_name: String,
    pub project_url: String,
    pub analysis_data: serde_json::Value,
    pub overall_score: Option<f64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LegacyIndexer {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LegacyIndexerJob {
    pub id: Uuid,
    pub indexer_id: Uuid,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LegacyIndexerConfig {
    pub id: Uuid,
    pub indexer_id: Uuid,
    pub key: String,
    pub value: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LegacyBlock {
    pub id: Uuid,
    pub block_number: i64,
    pub block_hash: String,
    pub parent_hash: String,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LegacyTransaction {
    pub id: Uuid,
    pub block_id: Uuid,
    pub tx_hash: String,
    pub from_address: String,
    pub to_address: Option<String>,
    pub value_wei: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LegacyTransactionEvent {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub event_name: String,
    pub log_index: i32,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LegacyToolPayment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tool_name: String,
    pub tx_hash: String,
    pub amount_wei: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LegacyUserSettings {
    pub id: Uuid,
    pub user_id: Uuid,
    pub preferences: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LegacyHistoryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tool_name: String,
    pub project_name: Option<String>,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LegacySummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_name: String,
    pub total_analyses: i32,
    pub tools_used: Vec<String>,
    pub average_score: f64,
    pub updated_at: DateTime<Utc>,
}

// ============ Eager-loaded Trees ============

/// 인덱서 + 자식 행 (jobs/configs)
#[derive(Debug, Clone)]
pub struct IndexerTree {
    pub indexer: LegacyIndexer,
    pub jobs: Vec<LegacyIndexerJob>,
    pub configs: Vec<LegacyIndexerConfig>,
}

/// 트랜잭션 + 이벤트
#[derive(Debug, Clone)]
pub struct TransactionTree {
    pub transaction: LegacyTransaction,
    pub events: Vec<LegacyTransactionEvent>,
}

/// 블록 + 트랜잭션 트리
#[derive(Debug, Clone)]
pub struct BlockTree {
    pub block: LegacyBlock,
    pub transactions: Vec<TransactionTree>,
}

// ============ Source ============

/// 레거시 스토어 읽기 전용 클라이언트
pub struct LegacySource {
    pool: PgPool,
}

impl LegacySource {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .min_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(3))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// 커넥션 정리 (orchestrator 의 finally 단계에서 호출)
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn fetch_users(&self) -> Result<Vec<LegacyUser>> {
        let rows = sqlx::query_as::<_, LegacyUser>(
            r#"
            SELECT "id", "email", "createdAt" AS "created_at"
            FROM "User"
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn fetch_tool_data(&self) -> Result<Vec<LegacyToolData>> {
        let rows = sqlx::query_as::<_, LegacyToolData>(
            r#"
            SELECT "id", "userId" AS "user_id", "toolName" AS "tool_name",
                   "data", "createdAt" AS "created_at"
            FROM "ToolData"
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn fetch_analysis(&self, kind: AnalysisKind) -> Result<Vec<LegacyAnalysis>> {
        let sql = format!(
            r#"
            SELECT "id", "userId" AS "user_id", "projectName" AS "project_name",
                   "projectUrl" AS "project_url", "analysisData" AS "analysis_data",
                   "overallScore" AS "overall_score", "status",
                   "createdAt" AS "created_at", "updatedAt" AS "updated_at"
            FROM "{}"
            "#,
            kind.legacy_table()
        );

        let rows = sqlx::query_as::<_, LegacyAnalysis>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// 인덱서 + jobs/configs eager-load
    pub async fn fetch_indexers(&self) -> Result<Vec<IndexerTree>> {
        let indexers = sqlx::query_as::<_, LegacyIndexer>(
            r#"
            SELECT "id", "name", "status", "userId" AS "user_id", "createdAt" AS "created_at"
            FROM "Indexer"
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut trees = Vec::with_capacity(indexers.len());
        for indexer in indexers {
            let jobs = sqlx::query_as::<_, LegacyIndexerJob>(
                r#"
                SELECT "id", "indexerId" AS "indexer_id", "status",
                       "startedAt" AS "started_at", "finishedAt" AS "finished_at",
                       "error", "createdAt" AS "created_at"
                FROM "IndexerJob"
                WHERE "indexerId" = $1
                "#,
            )
            .bind(indexer.id)
            .fetch_all(&self.pool)
            .await?;

            let configs = sqlx::query_as::<_, LegacyIndexerConfig>(
                r#"
                SELECT "id", "indexerId" AS "indexer_id", "key", "value",
                       "createdAt" AS "created_at"
                FROM "IndexerConfig"
                WHERE "indexerId" = $1
                "#,
            )
            .bind(indexer.id)
            .fetch_all(&self.pool)
            .await?;

            trees.push(IndexerTree {
                indexer,
                jobs,
                configs,
            });
        }

        Ok(trees)
    }

    /// 블록 → 트랜잭션 → 이벤트 eager-load
    pub async fn fetch_blocks(&self) -> Result<Vec<BlockTree>> {
        let blocks = sqlx::query_as::<_, LegacyBlock>(
            r#"
            SELECT "id", "blockNumber" AS "block_number", "blockHash" AS "block_hash",
                   "parentHash" AS "parent_hash", "timestamp", "createdAt" AS "created_at"
            FROM "Block"
            ORDER BY "blockNumber"
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut trees = Vec::with_capacity(blocks.len());
        for block in blocks {
            let transactions = sqlx::query_as::<_, LegacyTransaction>(
                r#"
                SELECT "id", "blockId" AS "block_id", "txHash" AS "tx_hash",
                       "fromAddress" AS "from_address", "toAddress" AS "to_address",
                       "valueWei" AS "value_wei", "status", "createdAt" AS "created_at"
                FROM "Transaction"
                WHERE "blockId" = $1
                "#,
            )
            .bind(block.id)
            .fetch_all(&self.pool)
            .await?;

            let mut tx_trees = Vec::with_capacity(transactions.len());
            for transaction in transactions {
                let events = sqlx::query_as::<_, LegacyTransactionEvent>(
                    r#"
                    SELECT "id", "transactionId" AS "transaction_id",
                           "eventName" AS "event_name", "logIndex" AS "log_index",
                           "payload", "createdAt" AS "created_at"
                    FROM "TransactionEvent"
                    WHERE "transactionId" = $1
                    ORDER BY "logIndex"
                    "#,
                )
                .bind(transaction.id)
                .fetch_all(&self.pool)
                .await?;

                tx_trees.push(TransactionTree {
                    transaction,
                    events,
                });
            }

            trees.push(BlockTree {
                block,
                transactions: tx_trees,
            });
        }

        Ok(trees)
    }

    pub async fn fetch_payments(&self) -> Result<Vec<LegacyToolPayment>> {
        let rows = sqlx::query_as::<_, LegacyToolPayment>(
            r#"
            SELECT "id", "userId" AS "user_id", "toolName" AS "tool_name",
                   "txHash" AS "tx_hash", "amountWei" AS "amount_wei",
                   "status", "createdAt" AS "created_at"
            FROM "ToolPayment"
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn fetch_settings(&self) -> Result<Vec<LegacyUserSettings>> {
        let rows = sqlx::query_as::<_, LegacyUserSettings>(
            r#"
            SELECT "id", "userId" AS "user_id", "preferences", "updatedAt" AS "updated_at"
            FROM "UserSettings"
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn fetch_history(&self) -> Result<Vec<LegacyHistoryEntry>> {
        let rows = sqlx::query_as::<_, LegacyHistoryEntry>(
            r#"
            SELECT "id", "userId" AS "user_id", "toolName" AS "tool_name",
                   "projectName" AS "project_name", "action", "createdAt" AS "created_at"
            FROM "AnalysisHistory"
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn fetch_summaries(&self) -> Result<Vec<LegacySummary>> {
        let rows = sqlx::query_as::<_, LegacySummary>(
            r#"
            SELECT "id", "userId" AS "user_id", "projectName" AS "project_name",
                   "totalAnalyses" AS "total_analyses", "toolsUsed" AS "tools_used",
                   "averageScore" AS "average_score", "updatedAt" AS "updated_at"
            FROM "AnalysisSummary"
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
