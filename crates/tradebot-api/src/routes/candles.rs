//! 차트용 캔들 조회 endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{Method, StatusCode, Uri},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{debug, warn};
use tradebot_core::{CandlesResponse, Timeframe};

use crate::error::{ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// `GET /api/candles` 쿼리.
///
/// 잘못된 값도 직접 400으로 응답하기 위해 문자열로 받습니다.
#[derive(Debug, Default, Deserialize)]
pub struct CandlesQuery {
    pub symbol: Option<String>,
    pub limit: Option<String>,
    pub interval: Option<String>,
}

/// 최근 캔들 조회.
///
/// GET /api/candles?symbol=&limit=&interval=
pub async fn get_candles(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    Query(query): Query<CandlesQuery>,
) -> ApiResult<Json<CandlesResponse>> {
    let reject = |status: StatusCode, code: &str, message: String| {
        ApiErrorResponse::new(code, message)
            .with_request_info(&method, &uri)
            .with_status(status)
    };

    let symbol = query
        .symbol
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| state.default_symbol())
        .to_uppercase();

    let interval: Timeframe = match query.interval.as_deref().map(str::trim) {
        None | Some("") => Timeframe::M1,
        Some(raw) => raw
            .parse()
            .map_err(|e: String| reject(StatusCode::BAD_REQUEST, "INVALID_INTERVAL", e))?,
    };

    let limit: u32 = match query.limit.as_deref().map(str::trim) {
        None | Some("") => state.config.market.default_candle_limit,
        Some(raw) => raw.parse().map_err(|_| {
            reject(
                StatusCode::BAD_REQUEST,
                "INVALID_LIMIT",
                format!("invalid limit: {}", raw),
            )
        })?,
    };
    let max_limit = state.config.market.max_candle_limit;
    if limit > max_limit {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "INVALID_LIMIT",
            format!("limit must be at most {}: {}", max_limit, limit),
        ));
    }

    debug!(%symbol, %interval, limit, "Fetching chart candles");

    let candles = state
        .candles
        .fetch_candles(&symbol, interval, limit)
        .await
        .map_err(|e| {
            warn!(%symbol, error = %e, "Candle fetch failed");
            reject(StatusCode::INTERNAL_SERVER_ERROR, "SOURCE_ERROR", e.to_string())
        })?;

    Ok(Json(CandlesResponse { symbol, candles }))
}

/// 캔들 라우터 생성.
pub fn candles_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_candles))
}
