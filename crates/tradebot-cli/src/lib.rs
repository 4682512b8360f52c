//! 백테스트 대시보드 클라이언트.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 백테스트 서버 HTTP 클라이언트
//! - 대시보드 구성 요소 (상태 로더, 백테스트 실행기, CSV 업로드, 거래 테이블, 차트)
//! - 터미널 화면

pub mod client;
pub mod dashboard;

pub use client::{ClientError, ClientResult, DashboardApi, HttpDashboardApi};
pub use dashboard::{Dashboard, DashboardState, RunOutcome, Selection};
