//! TradeBot 백테스트 API 서버.
//!
//! 설정을 로드하고 캔들 소스를 준비한 뒤 Axum 서버를 시작합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use tradebot_api::routes::create_router;
use tradebot_api::state::AppState;
use tradebot_core::{init_logging, AppConfig, LogConfig};
use tradebot_exchange::build_source;

/// CORS 레이어 생성.
///
/// `CORS_ORIGINS`(쉼표 구분)가 있으면 해당 origin만 허용하고, 없으면 모두 허용합니다.
fn cors_layer() -> CorsLayer {
    let configured = std::env::var("CORS_ORIGINS")
        .ok()
        .filter(|origins| !origins.trim().is_empty());

    let mut restricted = false;
    let allow_origin = match &configured {
        Some(origins) => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                restricted = true;
                AllowOrigin::list(origins)
            }
        }
        None => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::ACCEPT])
        // 와일드카드 origin과 자격 증명은 함께 쓸 수 없음
        .allow_credentials(restricted)
        .max_age(Duration::from_secs(3600))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config_path =
        std::env::var("TRADEBOT_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    let config = AppConfig::load(&config_path)?;

    init_logging(LogConfig::from(&config.logging))?;
    info!(config = %config_path, "Starting TradeBot API server...");

    let addr: SocketAddr = config.bind_address().parse().map_err(|e| {
        error!(
            host = %config.server.host,
            port = config.server.port,
            error = %e,
            "Invalid socket address, check server.host and server.port"
        );
        e
    })?;

    let candles = build_source(&config.market)?;
    let request_timeout = Duration::from_secs(config.server.request_timeout_secs);

    let state = Arc::new(AppState::new(config, candles));
    info!(
        version = %state.version,
        candle_source = state.candles.name(),
        trade_log = %state.trade_log.path().display(),
        symbols = ?state.config.market.symbols,
        "Application state initialized"
    );

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(cors_layer());

    info!(%addr, "API server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM을 수신하면 반환합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
