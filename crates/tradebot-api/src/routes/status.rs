//! 대시보드 초기 상태 endpoint.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use tradebot_core::StatusResponse;

use crate::state::AppState;

/// 선택 가능한 심볼과 초기 잔고.
///
/// GET /api/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        balance: state.config.strategy.initial_balance,
        symbols: state.config.market.symbols.clone(),
    })
}

/// 상태 라우터 생성.
pub fn status_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_status))
}
