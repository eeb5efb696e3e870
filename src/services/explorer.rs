//! Block Explorer Service
//!
//! # Interview Q&A
//!
//! Q: 블록체인 분석에 왜 익스플로러 API 를 쓰는가?
//! A: 노드 직접 조회 대비 트레이드오프
//!    - 잔액/트랜잭션 이력/소스 검증 여부를 REST 한 번에 조회
//!    - 자체 노드 운영 비용 없음
//!    - 대신 rate limit 존재 → 캐시 필수
//!
//! Q: 캐시 전략은?
//! A: 주소별 60초 인메모리 캐시
//!    - 이유: 같은 컨트랙트를 연속 분석할 때 API 호출 비용 절감
//!    - 트레이드오프: 최신 상태가 아닐 수 있음
//!    - 프로세스 단위 캐시라 멀티 인스턴스 간 공유 안 됨

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::types::BlockchainAnalysisData;

/// Etherscan 호환 응답 래퍼
#[derive(Debug, Deserialize)]
struct ExplorerResponse<T> {
    status: String,
    #[allow(dead_code)]
    message: String,
    result: T,
}

/// 익스플로러 클라이언트 (Etherscan 호환 API)
pub struct ExplorerClient {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    /// 주소별 캐시 (빈번한 재분석 최적화)
    cache: RwLock<HashMap<String, CachedOverview>>,
}

struct CachedOverview {
    data: BlockchainAnalysisData,
    cached_at: Instant,
}

impl ExplorerClient {
    /// 캐시 유효 시간 (초)
    const CACHE_TTL_SECS: u64 = 60;

    /// txlist 1페이지 조회 크기. 활동 점수 계산에는 이 정도면 충분
    const TX_PAGE_SIZE: u32 = 200;

    pub fn new(api_url: &str, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.to_string(),
            api_key,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// 컨트랙트 개요 조회 (잔액 + 트랜잭션 수 + 검증 여부)
    pub async fn contract_overview(&self, address: &str) -> Result<BlockchainAnalysisData> {
        let address = address.to_lowercase();

        // 캐시 확인
        {
            let cache = self.cache.read().unwrap();
            if let Some(cached) = cache.get(&address) {
                if cached.cached_at.elapsed().as_secs() < Self::CACHE_TTL_SECS {
                    return Ok(cached.data.clone());
                }
            }
        }

        let data = self.fetch_overview(&address).await?;

        // 캐시 갱신
        {
            let mut cache = self.cache.write().unwrap();
            cache.insert(
                address,
                CachedOverview {
                    data: data.clone(),
                    cached_at: Instant::now(),
                },
            );
        }

        Ok(data)
    }

    async fn fetch_overview(&self, address: &str) -> Result<BlockchainAnalysisData> {
        let balance_wei = self.fetch_balance(address).await?;
        let tx_count = self.fetch_tx_count(address).await?;
        let verified = self.fetch_verified(address).await?;

        Ok(BlockchainAnalysisData {
            contract_address: address.to_string(),
            tx_count,
            balance_wei: balance_wei.to_string(),
            verified,
            activity_score: activity_score(tx_count, balance_wei, verified),
        })
    }

    async fn fetch_balance(&self, address: &str) -> Result<u128> {
        let resp: ExplorerResponse<String> = self
            .get(&[
                ("module", "account"),
                ("action", "balance"),
                ("address", address),
                ("tag", "latest"),
            ])
            .await?;

        resp.result
            .parse::<u128>()
            .context("explorer returned non-numeric balance")
    }

    async fn fetch_tx_count(&self, address: &str) -> Result<u64> {
        let page_size = Self::TX_PAGE_SIZE.to_string();
        let resp: ExplorerResponse<serde_json::Value> = self
            .get(&[
                ("module", "account"),
                ("action", "txlist"),
                ("address", address),
                ("page", "1"),
                ("offset", page_size.as_str()),
                ("sort", "desc"),
            ])
            .await?;

        // 트랜잭션이 없으면 status "0" + result 가 빈 배열/문자열로 옴
        if resp.status != "1" {
            return Ok(0);
        }
        let count = resp
            .result
            .as_array()
            .map(|txs| txs.len() as u64)
            .context("unexpected txlist shape")?;
        Ok(count)
    }

    async fn fetch_verified(&self, address: &str) -> Result<bool> {
        let resp: ExplorerResponse<serde_json::Value> = self
            .get(&[
                ("module", "contract"),
                ("action", "getabi"),
                ("address", address),
            ])
            .await?;

        // 미검증 컨트랙트는 status "0" ("Contract source code not verified")
        Ok(resp.status == "1")
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T> {
        let mut req = self.client.get(&self.api_url).query(params);
        if let Some(key) = &self.api_key {
            req = req.query(&[("apikey", key.as_str())]);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("explorer request failed: {}", status);
        }
        Ok(resp.json::<T>().await?)
    }
}

/// 활동 점수 (0~100)
///
/// 최근 트랜잭션 양 70점 + 잔액 보유 20점 + 소스 검증 10점
fn activity_score(tx_count: u64, balance_wei: u128, verified: bool) -> f64 {
    let tx_part = (tx_count.min(140) as f64) / 2.0; // 0..70
    let balance_part = if balance_wei > 0 { 20.0 } else { 0.0 };
    let verified_part = if verified { 10.0 } else { 0.0 };
    tx_part + balance_part + verified_part
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_score_caps_at_100() {
        assert_eq!(activity_score(10_000, 1, true), 100.0);
    }

    #[test]
    fn test_activity_score_empty_contract() {
        assert_eq!(activity_score(0, 0, false), 0.0);
    }

    #[test]
    fn test_activity_score_partial() {
        // 트랜잭션 40건, 잔액 없음, 미검증 → 20점
        assert_eq!(activity_score(40, 0, false), 20.0);
    }
}
