//! Services Module
//!
//! 비즈니스 로직을 담당하는 서비스 레이어
//!
//! # Services
//! - `ExplorerClient`: 블록 익스플로러 연동 (블록체인 분석 실행)

mod explorer;

pub use explorer::ExplorerClient;
