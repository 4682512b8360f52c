//! 백테스트 대시보드 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API (상태, 캔들, 백테스트, 거래 기록 다운로드)
//! - 헬스 체크 엔드포인트
//! - 대시보드 정적 파일 서빙 (선택)
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`error`]: 통합 에러 응답

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiErrorResponse, ApiResult};
pub use routes::{create_api_router, create_router};
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
