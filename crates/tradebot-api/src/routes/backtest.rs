//! 백테스트 실행 endpoint.
//!
//! 하나의 엔드포인트가 두 가지 입력을 받습니다.
//!
//! - JSON / URL-encoded 폼: 심볼과 기간으로 캔들을 조회한 뒤 실행
//! - multipart `csv` 파일: 업로드된 캔들로 바로 실행
//!
//! 결과 거래는 거래 기록 CSV에 누적됩니다.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State},
    http::{header, Method, StatusCode, Uri},
    routing::post,
    Form, Json, Router,
};
use chrono::{Duration, Utc};
use serde_json::{Map, Value};
use tracing::{info, warn, Instrument};
use tradebot_analytics::{BacktestConfig, BacktestEngine, BacktestError, BacktestReport};
use tradebot_core::{backtest_span, BacktestRequest, BacktestResponse, Candle, Timeframe};
use tradebot_exchange::parse_candles_csv;

use crate::error::{ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 업로드 가능한 최대 요청 크기 (50MB).
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// 1개월을 30일로 계산합니다.
const DAYS_PER_MONTH: i64 = 30;

type Rejection = (StatusCode, Json<ApiErrorResponse>);

/// 요청 메타데이터를 담아 에러 응답을 만드는 헬퍼.
struct Rejector<'a> {
    method: &'a Method,
    uri: &'a Uri,
}

impl Rejector<'_> {
    fn reject(&self, status: StatusCode, code: &str, message: impl Into<String>) -> Rejection {
        ApiErrorResponse::new(code, message)
            .with_request_info(self.method, self.uri)
            .with_status(status)
    }
}

/// 파싱된 업로드 요청.
struct CsvUpload {
    text: String,
    overrides: BacktestRequest,
}

/// 백테스트 실행.
///
/// POST /api/backtest
pub async fn run_backtest(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    request: Request,
) -> ApiResult<Json<BacktestResponse>> {
    let rejector = Rejector {
        method: &method,
        uri: &uri,
    };

    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    let report = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| rejector.reject(StatusCode::BAD_REQUEST, "INVALID_INPUT", e.body_text()))?;

        match read_multipart(multipart, &rejector).await? {
            (Some(upload), _) => run_uploaded(&state, upload, &rejector).await?,
            (None, fields) => run_fetched(&state, fields, &rejector).await?,
        }
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(fields) = Form::<BacktestRequest>::from_request(request, &state)
            .await
            .map_err(|e| rejector.reject(StatusCode::BAD_REQUEST, "INVALID_INPUT", e.body_text()))?;
        run_fetched(&state, fields, &rejector).await?
    } else {
        let body = Bytes::from_request(request, &state)
            .await
            .map_err(|e| rejector.reject(StatusCode::BAD_REQUEST, "INVALID_INPUT", e.body_text()))?;
        let fields = parse_json_request(&body)
            .map_err(|e| rejector.reject(StatusCode::BAD_REQUEST, "INVALID_INPUT", e))?;
        run_fetched(&state, fields, &rejector).await?
    };

    Ok(Json(BacktestResponse {
        stats: report.stats,
        trades: report.trades,
    }))
}

/// JSON 본문을 요청으로 변환합니다. 빈 본문은 기본 요청입니다.
fn parse_json_request(body: &[u8]) -> Result<BacktestRequest, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(BacktestRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| format!("invalid request body: {}", e))
}

/// multipart 필드를 읽습니다.
///
/// `csv` 파일이 있으면 업로드 요청을, 없으면 텍스트 필드로 만든 일반 요청을 돌려줍니다.
async fn read_multipart(
    mut multipart: Multipart,
    rejector: &Rejector<'_>,
) -> Result<(Option<CsvUpload>, BacktestRequest), Rejection> {
    let mut csv_text: Option<String> = None;
    let mut fields = Map::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| rejector.reject(StatusCode::BAD_REQUEST, "INVALID_INPUT", e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| rejector.reject(StatusCode::BAD_REQUEST, "INVALID_INPUT", e.body_text()))?;

        if name == "csv" {
            let text = String::from_utf8(bytes.to_vec()).map_err(|_| {
                rejector.reject(StatusCode::BAD_REQUEST, "INVALID_INPUT", "csv file is not valid UTF-8")
            })?;
            csv_text = Some(text);
        } else if !name.is_empty() {
            fields.insert(name, Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        }
    }

    let request: BacktestRequest = serde_json::from_value(Value::Object(fields))
        .map_err(|e| rejector.reject(StatusCode::BAD_REQUEST, "INVALID_INPUT", e.to_string()))?;

    Ok(match csv_text {
        Some(text) => (
            Some(CsvUpload {
                text,
                overrides: request.clone(),
            }),
            request,
        ),
        None => (None, request),
    })
}

/// 업로드된 CSV로 백테스트를 실행합니다.
async fn run_uploaded(
    state: &Arc<AppState>,
    upload: CsvUpload,
    rejector: &Rejector<'_>,
) -> Result<BacktestReport, Rejection> {
    let config = backtest_config(state, &upload.overrides, rejector)?;
    let candles = parse_candles_csv(&upload.text)
        .map_err(|e| rejector.reject(StatusCode::BAD_REQUEST, "INVALID_CSV", e.to_string()))?;

    info!(count = candles.len(), "Running backtest on uploaded candles");
    execute(state, config, candles, rejector)
        .instrument(backtest_span!("backtest_upload", "csv"))
        .await
}

/// 캔들 소스에서 기간만큼 조회한 뒤 백테스트를 실행합니다.
async fn run_fetched(
    state: &Arc<AppState>,
    request: BacktestRequest,
    rejector: &Rejector<'_>,
) -> Result<BacktestReport, Rejection> {
    let config = backtest_config(state, &request, rejector)?;

    let symbol = request
        .symbol
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| state.default_symbol())
        .to_uppercase();
    let interval: Timeframe = match request.interval.as_deref().map(str::trim) {
        None | Some("") => Timeframe::M1,
        Some(raw) => raw
            .parse()
            .map_err(|e: String| rejector.reject(StatusCode::BAD_REQUEST, "INVALID_INTERVAL", e))?,
    };
    let months = request.months.unwrap_or(1);
    let start = Duration::try_days(DAYS_PER_MONTH * i64::from(months))
        .and_then(|window| Utc::now().checked_sub_signed(window))
        .ok_or_else(|| {
            rejector.reject(
                StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
                format!("months out of range: {}", months),
            )
        })?;

    let span = backtest_span!("backtest_fetch", symbol, interval);
    async {
        let start_ms = start.timestamp_millis();
        info!(months, start_ms, "Fetching candles for backtest");

        let candles = state
            .candles
            .fetch_since(&symbol, interval, start_ms)
            .await
            .map_err(|e| {
                warn!(error = %e, "Candle fetch failed");
                rejector.reject(StatusCode::INTERNAL_SERVER_ERROR, "SOURCE_ERROR", e.to_string())
            })?;

        if candles.is_empty() {
            return Err(rejector.reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "NO_CANDLES",
                "no candles retrieved",
            ));
        }

        execute(state, config, candles, rejector).await
    }
    .instrument(span)
    .await
}

/// 서버 기본값 위에 요청 오버라이드를 적용하고 검증합니다.
fn backtest_config(
    state: &AppState,
    request: &BacktestRequest,
    rejector: &Rejector<'_>,
) -> Result<BacktestConfig, Rejection> {
    let mut config = state.backtest_defaults();
    if let Some(balance) = request.initial_balance {
        config = config.with_initial_balance(balance);
    }
    if let Some(risk) = request.risk_per_trade {
        config = config.with_risk_per_trade(risk);
    }
    if let Some(stop) = request.stop_loss_pct {
        config = config.with_stop_loss_pct(stop);
    }

    config
        .validate()
        .map_err(|e| rejector.reject(StatusCode::BAD_REQUEST, "INVALID_INPUT", e.to_string()))?;
    Ok(config)
}

/// 백테스트를 블로킹 스레드에서 실행하고 거래 기록에 추가합니다.
async fn execute(
    state: &Arc<AppState>,
    config: BacktestConfig,
    candles: Vec<Candle>,
    rejector: &Rejector<'_>,
) -> Result<BacktestReport, Rejection> {
    let trade_log = Arc::clone(&state.trade_log);

    let outcome = tokio::task::spawn_blocking(move || {
        let report = BacktestEngine::new(config).run(&candles)?;
        if let Err(e) = trade_log.append(&report.trades) {
            warn!(path = %trade_log.path().display(), error = %e, "Failed to write trade log");
        }
        Ok::<_, BacktestError>(report)
    })
    .await
    .map_err(|e| rejector.reject(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", e.to_string()))?;

    match outcome {
        Ok(report) => Ok(report),
        Err(BacktestError::NoCandles) => Err(rejector.reject(
            StatusCode::BAD_REQUEST,
            "NO_CANDLES",
            BacktestError::NoCandles.to_string(),
        )),
        Err(e @ BacktestError::ConfigError(_)) => {
            Err(rejector.reject(StatusCode::BAD_REQUEST, "INVALID_INPUT", e.to_string()))
        }
        Err(e) => Err(rejector.reject(
            StatusCode::INTERNAL_SERVER_ERROR,
            "BACKTEST_ERROR",
            e.to_string(),
        )),
    }
}

/// 백테스트 라우터 생성.
pub fn backtest_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(run_backtest))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
