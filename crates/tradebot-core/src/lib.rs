//! # TradeBot Core
//!
//! 백테스트 대시보드의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 서버와 클라이언트가 공유하는 기본 타입을 제공합니다:
//! - 캔들, 거래 기록, 백테스트 통계
//! - HTTP 와이어 계약 (요청/응답 타입)
//! - 타임프레임 정의
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
