//! 거래 기록 CSV 다운로드 endpoint.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use tracing::{debug, warn};

use crate::error::{ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 다운로드 파일 이름.
const DOWNLOAD_FILE_NAME: &str = "trades.csv";

/// 누적된 거래 기록을 첨부 파일로 반환합니다.
///
/// GET /download_trades
pub async fn download_trades(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let path = state.trade_log.path();

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Trade log not found");
            return Err(ApiErrorResponse::simple("NOT_FOUND", "no trades file")
                .with_status(StatusCode::NOT_FOUND));
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read trade log");
            return Err(ApiErrorResponse::new("IO_ERROR", e.to_string())
                .with_status(StatusCode::INTERNAL_SERVER_ERROR));
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DOWNLOAD_FILE_NAME),
            ),
        ],
        bytes,
    ))
}

/// 거래 기록 라우터 생성.
pub fn trades_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(download_trades))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::{body::Body, http::Request};
    use rust_decimal_macros::dec;
    use tower::ServiceExt;
    use tradebot_core::{ExitReason, Trade};

    fn app(state: Arc<AppState>) -> Router {
        Router::new()
            .nest("/download_trades", trades_router())
            .with_state(state)
    }

    async fn get(app: Router) -> axum::response::Response {
        app.oneshot(
            Request::builder()
                .uri("/download_trades")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_log_is_404() {
        let response = get(app(Arc::new(create_test_state()))).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "no trades file");
    }

    #[tokio::test]
    async fn test_existing_log_is_attachment() {
        let state = Arc::new(create_test_state());
        state
            .trade_log
            .append(&[Trade {
                time: 1_700_000_000_000,
                entry: dec!(100),
                exit: dec!(99),
                profit: dec!(-0.2),
                balance_after: dec!(9.8),
                reason: ExitReason::StopLoss,
            }])
            .unwrap();

        let response = get(app(Arc::clone(&state))).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"trades.csv\""
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("time,entry,exit,profit,balance_after,reason"));
        assert!(text.contains(",SL"));

        std::fs::remove_file(state.trade_log.path()).ok();
    }
}
