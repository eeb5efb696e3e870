//! Field Mapper
//!
//! 소스 행(camelCase 컬럼에서 읽힘) → 목적지 insert 형태(snake_case 키의
//! JSON 오브젝트) 순수 변환.
//!
//! 규칙 (검증 없음, 필수 필드 누락은 목적지 insert 에러로만 드러남):
//! - 타임스탬프는 ISO-8601(밀리초, `Z`) 문자열로
//! - jsonb 페이로드는 그대로 통과
//! - 소스에 없는 옵션 필드는 JSON null

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

use super::source::{
    LegacyAnalysis, LegacyBlock, LegacyHistoryEntry, LegacyIndexer, LegacyIndexerConfig,
    LegacyIndexerJob, LegacySummary, LegacyToolData, LegacyToolPayment, LegacyTransaction,
    LegacyTransactionEvent, LegacyUser, LegacyUserSettings,
};

/// JS `Date.toISOString()` 과 동일한 렌더링 (밀리초 + Z)
fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn user(row: &LegacyUser) -> Value {
    json!({
        "id": row.id,
        "email": row.email,
        "created_at": iso(row.created_at),
    })
}

pub fn tool_data(row: &LegacyToolData) -> Value {
    json!({
        "id": row.id,
        "user_id": row.user_id,
        "tool_name": row.tool_name,
        "data": row.data,
        "created_at": iso(row.created_at),
    })
}

pub fn analysis(row: &LegacyAnalysis) -> Value {
    json!({
        "id": row.id,
        "user_id": row.user_id,
        "project_name": row.project_name,
        "project_url": row.project_url,
        "analysis_data": row.analysis_data,
        "overall_score": row.overall_score,
        "status": row.status,
        "created_at": iso(row.created_at),
        "updated_at": iso(row.updated_at),
    })
}

pub fn indexer(row: &LegacyIndexer) -> Value {
    json!({
        "id": row.id,
        "name": row.name,
        "status": row.status,
        "user_id": row.user_id,
        "created_at": iso(row.created_at),
    })
}

pub fn indexer_job(row: &LegacyIndexerJob) -> Value {
    json!({
        "id": row.id,
        "indexer_id": row.indexer_id,
        "status": row.status,
        "started_at": row.started_at.map(iso),
        "finished_at": row.finished_at.map(iso),
        "error": row.error,
        "created_at": iso(row.created_at),
    })
}

pub fn indexer_config(row: &LegacyIndexerConfig) -> Value {
    json!({
        "id": row.id,
        "indexer_id": row.indexer_id,
        "key": row.key,
        "value": row.value,
        "created_at": iso(row.created_at),
    })
}

pub fn block(row: &LegacyBlock) -> Value {
    json!({
        "id": row.id,
        "block_number": row.block_number,
        "block_hash": row.block_hash,
        "parent_hash": row.parent_hash,
        "timestamp": iso(row.timestamp),
        "created_at": iso(row.created_at),
    })
}

pub fn transaction(row: &LegacyTransaction) -> Value {
    json!({
        "id": row.id,
        "block_id": row.block_id,
        "tx_hash": row.tx_hash,
        "from_address": row.from_address,
        "to_address": row.to_address,
        "value_wei": row.value_wei,
        "status": row.status,
        "created_at": iso(row.created_at),
    })
}

pub fn transaction_event(row: &LegacyTransactionEvent) -> Value {
    json!({
        "id": row.id,
        "transaction_id": row.transaction_id,
        "event_name": row.event_name,
        "log_index": row.log_index,
        "payload": row.payload,
        "created_at": iso(row.created_at),
    })
}

pub fn payment(row: &LegacyToolPayment) -> Value {
    json!({
        "id": row.id,
        "user_id": row.user_id,
        "tool_name": row.tool_name,
        "tx_hash": row.tx_hash,
        "amount_wei": row.amount_wei,
        "status": row.status,
        "created_at": iso(row.created_at),
    })
}

pub fn settings(row: &LegacyUserSettings) -> Value {
    json!({
        "id": row.id,
        "user_id": row.user_id,
        "preferences": row.preferences,
        "updated_at": iso(row.updated_at),
    })
}

pub fn history(row: &LegacyHistoryEntry) -> Value {
    json!({
        "id": row.id,
        "user_id": row.user_id,
        "tool_name": row.tool_name,
        "project_name": row.project_name,
        "action": row.action,
        "created_at": iso(row.created_at),
    })
}

pub fn summary(row: &LegacySummary) -> Value {
    json!({
        "id": row.id,
        "user_id": row.user_id,
        "project_name": row.project_name,
        "total_analyses": row.total_analyses,
        "tools_used": row.tools_used,
        "average_score": row.average_score,
        "updated_at": iso(row.updated_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
    }

    fn sorted_keys(value: &Value) -> Vec<String> {
        let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_timestamps_render_as_iso_with_millis() {
        let row = LegacyUser {
            id: Uuid::new_v4(),
            email: "dev@example.com".to_string(),
            created_at: ts(),
        };

        let mapped = user(&row);
        // JS 의 Date.toISOString() 출력과 문자 단위로 동일해야 함
        assert_eq!(mapped["created_at"], "2024-01-15T10:30:00.000Z");
        assert_eq!(
            mapped["created_at"],
            row.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
        );
    }

    #[test]
    fn test_analysis_keys_are_snake_case_complete() {
        let row = LegacyAnalysis {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            project_name: "my-dapp".to_string(),
            project_url: "https://mydapp.io".to_string(),
            analysis_data: json!({"tool": "metadata", "issues": []}),
            overall_score: Some(87.5),
            status: "completed".to_string(),
            created_at: ts(),
            updated_at: ts(),
        };

        // camelCase 소스 필드 전부가 snake_case 키로 나와야 함 (누락 금지)
        assert_eq!(
            sorted_keys(&analysis(&row)),
            vec![
                "analysis_data",
                "created_at",
                "id",
                "overall_score",
                "project_name",
                "project_url",
                "status",
                "updated_at",
                "user_id",
            ]
        );
    }

    #[test]
    fn test_json_payload_passes_through_unchanged() {
        let payload = json!({
            "tool": "keyword",
            "keywords": [{"term": "defi", "volume": 8100, "difficulty": 62.0}],
        });
        let row = LegacyAnalysis {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            project_name: "p".to_string(),
            project_url: "https://p.io".to_string(),
            analysis_data: payload.clone(),
            overall_score: None,
            status: "completed".to_string(),
            created_at: ts(),
            updated_at: ts(),
        };

        let mapped = analysis(&row);
        assert_eq!(mapped["analysis_data"], payload);
        // 없는 점수는 null
        assert!(mapped["overall_score"].is_null());
    }

    #[test]
    fn test_absent_optionals_become_null() {
        let row = LegacyTransaction {
            id: Uuid::new_v4(),
            block_id: Uuid::new_v4(),
            tx_hash: "0xabc".to_string(),
            from_address: "0x1".to_string(),
            to_address: None,
            value_wei: "0".to_string(),
            status: "confirmed".to_string(),
            created_at: ts(),
        };

        let mapped = transaction(&row);
        assert!(mapped.as_object().unwrap().contains_key("to_address"));
        assert!(mapped["to_address"].is_null());
    }

    #[test]
    fn test_job_keys_complete() {
        let row = LegacyIndexerJob {
            id: Uuid::new_v4(),
            indexer_id: Uuid::new_v4(),
            status: "running".to_string(),
            started_at: Some(ts()),
            finished_at: None,
            error: None,
            created_at: ts(),
        };

        assert_eq!(
            sorted_keys(&indexer_job(&row)),
            vec![
                "created_at",
                "error",
                "finished_at",
                "id",
                "indexer_id",
                "started_at",
                "status",
            ]
        );
        assert_eq!(indexer_job(&row)["started_at"], "2024-01-15T10:30:00.000Z");
    }

    #[test]
    fn test_summary_keys_complete() {
        let row = LegacySummary {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            project_name: "my-dapp".to_string(),
            total_analyses: 4,
            tools_used: vec!["metadata".to_string(), "keyword".to_string()],
            average_score: 73.25,
            updated_at: ts(),
        };

        assert_eq!(
            sorted_keys(&summary(&row)),
            vec![
                "average_score",
                "id",
                "project_name",
                "tools_used",
                "total_analyses",
                "updated_at",
                "user_id",
            ]
        );
    }
}
