//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/` - 대시보드 정적 파일 (설정된 경우) 또는 안내 문구
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/status` - 초기 잔고와 심볼 목록
//! - `/api/candles` - 차트용 최근 캔들
//! - `/api/backtest` - 백테스트 실행 (JSON/폼/CSV 업로드)
//! - `/download_trades` - 누적 거래 기록 CSV

pub mod backtest;
pub mod candles;
pub mod health;
pub mod status;
pub mod trades;

use std::sync::Arc;

use axum::{extract::State, routing::get, Router};
use tower_http::services::ServeDir;
use tracing::info;

use crate::state::AppState;

pub use backtest::{backtest_router, run_backtest};
pub use candles::{candles_router, get_candles, CandlesQuery};
pub use health::{health_router, HealthResponse};
pub use status::{get_status, status_router};
pub use trades::{download_trades, trades_router};

/// API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/api/status", status_router())
        .nest("/api/candles", candles_router())
        .nest("/api/backtest", backtest_router())
        .nest("/download_trades", trades_router())
}

/// 루트 경로를 포함한 전체 라우터 생성.
///
/// `storage.static_dir`가 설정되어 있으면 대시보드 파일을 서빙하고,
/// 없으면 `/`에서 서버 안내 문구를 반환합니다.
pub fn create_router(state: Arc<AppState>) -> Router {
    let router = create_api_router();

    let router = match state.config.storage.static_dir.clone() {
        Some(dir) => {
            info!(dir = %dir.display(), "Serving dashboard files");
            router.fallback_service(ServeDir::new(dir))
        }
        None => router.route("/", get(banner)),
    };

    router.with_state(state)
}

async fn banner(State(state): State<Arc<AppState>>) -> String {
    format!("TradeBot backtest API v{}", state.version)
}
