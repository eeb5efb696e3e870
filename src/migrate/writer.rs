//! Destination Writer
//!
//! 목적지 스토어(Supabase PostgREST) 기록 추상화.
//!
//! # Design Decision
//!
//! trait 로 분리한 이유:
//! - 마이그레이션 루프를 네트워크 없이 테스트 (MockWriter)
//! - 목적지 교체 시 영향 최소화
//!
//! upsert 는 PostgREST 의 `Prefer: resolution=merge-duplicates` 를 사용.
//! 스토어 레벨의 원자적 insert-on-conflict-update (수동 read-then-branch 금지)

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// 목적지 스토어 기록 인터페이스
#[async_trait]
pub trait DestinationWriter: Send + Sync {
    /// 행 1건 삽입
    async fn insert(&self, table: &str, row: Value) -> Result<()>;

    /// 행 1건 upsert. `on_conflict` 는 충돌 키 컬럼 (콤마 구분 복합키 허용)
    async fn upsert(&self, table: &str, row: Value, on_conflict: &str) -> Result<()>;
}

/// Supabase PostgREST 기반 구현
///
/// `{SUPABASE_URL}/rest/v1/{table}` 에 JSON 행을 POST.
/// anon key 는 `apikey` + `Authorization: Bearer` 두 헤더 모두에 실림.
pub struct SupabaseWriter {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseWriter {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
    }

    async fn execute(&self, req: reqwest::RequestBuilder) -> Result<()> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        // 실패 본문은 PostgREST 의 에러 JSON (진단을 위해 그대로 전달)
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("destination write failed ({}): {}", status, body)
    }
}

#[async_trait]
impl DestinationWriter for SupabaseWriter {
    async fn insert(&self, table: &str, row: Value) -> Result<()> {
        let req = self
            .authed(self.client.post(self.table_url(table)))
            .header("Prefer", "return=minimal")
            .json(&row);
        self.execute(req).await
    }

    async fn upsert(&self, table: &str, row: Value, on_conflict: &str) -> Result<()> {
        let req = self
            .authed(self.client.post(self.table_url(table)))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&row);
        self.execute(req).await
    }
}

/// 테스트용 인메모리 writer
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::{BTreeMap, HashMap, HashSet};
    use std::sync::Mutex;

    /// 기록을 테이블별로 쌓아두는 mock.
    /// - insert: append-only 로그 (재실행 시 중복이 그대로 보임)
    /// - upsert: 충돌 키 기준 맵 (재실행해도 1행 유지)
    /// - fail_on(id): 해당 id 행의 기록을 실패시킴
    pub struct MockWriter {
        inserted: Mutex<HashMap<String, Vec<Value>>>,
        upserted: Mutex<HashMap<String, BTreeMap<String, Value>>>,
        fail_ids: Mutex<HashSet<String>>,
    }

    impl MockWriter {
        pub fn new() -> Self {
            Self {
                inserted: Mutex::new(HashMap::new()),
                upserted: Mutex::new(HashMap::new()),
                fail_ids: Mutex::new(HashSet::new()),
            }
        }

        pub fn fail_on(&self, id: &str) {
            self.fail_ids.lock().unwrap().insert(id.to_string());
        }

        pub fn inserted_rows(&self, table: &str) -> usize {
            self.inserted
                .lock()
                .unwrap()
                .get(table)
                .map(|rows| rows.len())
                .unwrap_or(0)
        }

        pub fn upserted_rows(&self, table: &str) -> usize {
            self.upserted
                .lock()
                .unwrap()
                .get(table)
                .map(|rows| rows.len())
                .unwrap_or(0)
        }

        fn should_fail(&self, row: &Value) -> bool {
            row["id"]
                .as_str()
                .map(|id| self.fail_ids.lock().unwrap().contains(id))
                .unwrap_or(false)
        }
    }

    #[async_trait]
    impl DestinationWriter for MockWriter {
        async fn insert(&self, table: &str, row: Value) -> Result<()> {
            if self.should_fail(&row) {
                anyhow::bail!("simulated write failure");
            }
            self.inserted
                .lock()
                .unwrap()
                .entry(table.to_string())
                .or_default()
                .push(row);
            Ok(())
        }

        async fn upsert(&self, table: &str, row: Value, on_conflict: &str) -> Result<()> {
            if self.should_fail(&row) {
                anyhow::bail!("simulated write failure");
            }
            // 복합 충돌 키는 콤마 구분 → 값을 이어붙여 맵 키로 사용
            let key = on_conflict
                .split(',')
                .map(|col| row[col.trim()].to_string())
                .collect::<Vec<_>>()
                .join("|");
            self.upserted
                .lock()
                .unwrap()
                .entry(table.to_string())
                .or_default()
                .insert(key, row);
            Ok(())
        }
    }
}
