//! Common Types Module
//!
//! 분석 도구 종류와 도구별 페이로드 정의
//!
//! # Design Decision
//!
//! 분석 페이로드는 도구마다 형태가 다름 → 태그드 유니온으로 모델링
//! - `tool` 필드를 serde discriminant 로 사용
//! - 저장 시에는 jsonb 컬럼에 직렬화, API 경계에서는 타입 안전
//! - untyped JSON 통로는 두지 않음 (페이로드 ↔ 도구 불일치는 400)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 분석 도구 종류
///
/// 도구 1종 = 목적지 테이블 1개. URL 경로 세그먼트와 페이로드 태그 모두
/// kebab-case 문자열 사용 (`content-audit`, `ai-dashboard`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisKind {
    Metadata,
    ContentAudit,
    Keyword,
    LinkVerification,
    Performance,
    Competition,
    Blockchain,
    AiDashboard,
    SocialWeb3,
}

impl AnalysisKind {
    /// 전체 도구 목록 (마이그레이션 실행 순서이기도 함)
    pub const ALL: [AnalysisKind; 9] = [
        AnalysisKind::Metadata,
        AnalysisKind::ContentAudit,
        AnalysisKind::Keyword,
        AnalysisKind::LinkVerification,
        AnalysisKind::Performance,
        AnalysisKind::Competition,
        AnalysisKind::Blockchain,
        AnalysisKind::AiDashboard,
        AnalysisKind::SocialWeb3,
    ];

    /// URL/태그 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Metadata => "metadata",
            AnalysisKind::ContentAudit => "content-audit",
            AnalysisKind::Keyword => "keyword",
            AnalysisKind::LinkVerification => "link-verification",
            AnalysisKind::Performance => "performance",
            AnalysisKind::Competition => "competition",
            AnalysisKind::Blockchain => "blockchain",
            AnalysisKind::AiDashboard => "ai-dashboard",
            AnalysisKind::SocialWeb3 => "social-web3",
        }
    }

    /// 목적지 테이블명 (snake_case)
    pub fn table(&self) -> &'static str {
        match self {
            AnalysisKind::Metadata => "metadata_analysis",
            AnalysisKind::ContentAudit => "content_audit_analysis",
            AnalysisKind::Keyword => "keyword_analysis",
            AnalysisKind::LinkVerification => "link_verification_analysis",
            AnalysisKind::Performance => "performance_analysis",
            AnalysisKind::Competition => "competition_analysis",
            AnalysisKind::Blockchain => "blockchain_analysis",
            AnalysisKind::AiDashboard => "ai_dashboard_analysis",
            AnalysisKind::SocialWeb3 => "social_web3_analysis",
        }
    }

    /// 레거시(Prisma) 테이블명 (PascalCase, quoted identifier)
    pub fn legacy_table(&self) -> &'static str {
        match self {
            AnalysisKind::Metadata => "MetadataAnalysis",
            AnalysisKind::ContentAudit => "ContentAuditAnalysis",
            AnalysisKind::Keyword => "KeywordAnalysis",
            AnalysisKind::LinkVerification => "LinkVerificationAnalysis",
            AnalysisKind::Performance => "PerformanceAnalysis",
            AnalysisKind::Competition => "CompetitionAnalysis",
            AnalysisKind::Blockchain => "BlockchainAnalysis",
            AnalysisKind::AiDashboard => "AiDashboardAnalysis",
            AnalysisKind::SocialWeb3 => "SocialWeb3Analysis",
        }
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown analysis kind '{}'", s))
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 키워드 통계
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordStat {
    pub term: String,
    /// 월간 검색량
    pub volume: u64,
    /// 난이도 (0~100)
    pub difficulty: f64,
}

/// 경쟁사 통계
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorStat {
    pub domain: String,
    pub score: f64,
}

/// 블록체인 분석 결과 (ExplorerClient 가 생성)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockchainAnalysisData {
    /// 분석 대상 컨트랙트 주소 (lowercase)
    pub contract_address: String,
    pub tx_count: u64,
    /// wei 단위 잔액 (u128 범위 → 문자열로 직렬화)
    pub balance_wei: String,
    /// 소스 검증 여부
    pub verified: bool,
    /// 활동 점수 (0~100)
    pub activity_score: f64,
}

/// 도구별 분석 페이로드
///
/// `tool` 태그로 구분되는 discriminated union.
/// 각 variant 는 해당 도구의 `AnalysisKind` 와 1:1 대응.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "kebab-case")]
pub enum AnalysisData {
    Metadata {
        title: Option<String>,
        description: Option<String>,
        canonical_url: Option<String>,
        issues: Vec<String>,
    },
    ContentAudit {
        word_count: u32,
        readability_score: f64,
        duplicate_ratio: f64,
        issues: Vec<String>,
    },
    Keyword {
        keywords: Vec<KeywordStat>,
    },
    LinkVerification {
        total_links: u32,
        broken_links: u32,
        nofollow_links: u32,
        broken_urls: Vec<String>,
    },
    Performance {
        load_time_ms: u32,
        page_size_kb: u32,
        request_count: u32,
        lighthouse_score: f64,
    },
    Competition {
        competitors: Vec<CompetitorStat>,
    },
    Blockchain(BlockchainAnalysisData),
    AiDashboard {
        summary: String,
        insights: Vec<String>,
    },
    SocialWeb3 {
        followers: u32,
        mentions: u32,
        engagement_rate: f64,
    },
}

impl AnalysisData {
    /// 페이로드가 속한 도구 종류
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisData::Metadata { .. } => AnalysisKind::Metadata,
            AnalysisData::ContentAudit { .. } => AnalysisKind::ContentAudit,
            AnalysisData::Keyword { .. } => AnalysisKind::Keyword,
            AnalysisData::LinkVerification { .. } => AnalysisKind::LinkVerification,
            AnalysisData::Performance { .. } => AnalysisKind::Performance,
            AnalysisData::Competition { .. } => AnalysisKind::Competition,
            AnalysisData::Blockchain(_) => AnalysisKind::Blockchain,
            AnalysisData::AiDashboard { .. } => AnalysisKind::AiDashboard,
            AnalysisData::SocialWeb3 { .. } => AnalysisKind::SocialWeb3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in AnalysisKind::ALL {
            assert_eq!(kind.as_str().parse::<AnalysisKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_kind_unknown() {
        assert!("seo-magic".parse::<AnalysisKind>().is_err());
    }

    #[test]
    fn test_payload_tag_matches_kind() {
        let data = AnalysisData::LinkVerification {
            total_links: 120,
            broken_links: 3,
            nofollow_links: 14,
            broken_urls: vec!["https://example.com/404".to_string()],
        };

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["tool"], "link-verification");
        assert_eq!(data.kind(), AnalysisKind::LinkVerification);
    }

    #[test]
    fn test_blockchain_payload_round_trip() {
        let data = AnalysisData::Blockchain(BlockchainAnalysisData {
            contract_address: "0x1234567890123456789012345678901234567890".to_string(),
            tx_count: 42,
            balance_wei: "1500000000000000000".to_string(),
            verified: true,
            activity_score: 51.0,
        });

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["tool"], "blockchain");
        assert_eq!(json["tx_count"], 42);

        let back: AnalysisData = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), AnalysisKind::Blockchain);
    }
}
