//! Binance 공개 klines REST 클라이언트.
//!
//! 인증이 필요 없는 `/api/v3/klines` 엔드포인트만 사용합니다.
//! 한 번에 최대 1000개까지 조회할 수 있으므로 그 이상은 `startTime`을
//! 옮겨가며 페이지 단위로 가져오고, 페이지 사이에 잠시 대기합니다.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, error, info};
use tradebot_core::{Candle, MarketConfig, Timeframe};

use crate::error::{ExchangeError, ExchangeResult};
use crate::source::CandleSource;

/// 에러 메시지에 포함할 응답 본문 최대 길이.
const ERROR_BODY_LIMIT: usize = 200;

/// Binance 클라이언트 설정.
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    /// klines 엔드포인트 전체 URL
    pub klines_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// User-Agent 헤더
    pub user_agent: String,
    /// 페이지 간 대기 시간 (밀리초)
    pub page_delay_ms: u64,
    /// 페이지당 최대 캔들 수 (Binance 상한 1000)
    pub max_page_size: u32,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self::from(&MarketConfig::default())
    }
}

impl From<&MarketConfig> for BinanceConfig {
    fn from(config: &MarketConfig) -> Self {
        Self {
            klines_url: config.klines_url.clone(),
            timeout_secs: config.timeout_secs,
            user_agent: config.user_agent.clone(),
            page_delay_ms: config.page_delay_ms,
            max_page_size: config.max_page_size.clamp(1, 1000),
        }
    }
}

impl BinanceConfig {
    /// klines URL을 설정합니다 (테스트 서버 등).
    pub fn with_klines_url(mut self, url: impl Into<String>) -> Self {
        self.klines_url = url.into();
        self
    }

    /// 페이지 간 대기 시간을 설정합니다.
    pub fn with_page_delay_ms(mut self, delay_ms: u64) -> Self {
        self.page_delay_ms = delay_ms;
        self
    }

    /// 페이지 크기를 설정합니다.
    pub fn with_max_page_size(mut self, size: u32) -> Self {
        self.max_page_size = size.clamp(1, 1000);
        self
    }
}

/// `/api/v3/klines` 응답의 한 행.
#[derive(Debug, Deserialize)]
#[allow(dead_code)] // 응답 필드 전체 매핑 (일부만 사용)
struct BinanceKline(
    i64,    // 0: Open time
    String, // 1: Open
    String, // 2: High
    String, // 3: Low
    String, // 4: Close
    String, // 5: Volume
    i64,    // 6: Close time
    String, // 7: Quote asset volume
    i64,    // 8: Number of trades
    String, // 9: Taker buy base asset volume
    String, // 10: Taker buy quote asset volume
    String, // 11: Ignore
);

/// Binance klines 클라이언트.
pub struct BinanceClient {
    config: BinanceConfig,
    client: Client,
}

impl BinanceClient {
    /// 새 클라이언트 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ExchangeError::NetworkError`를 반환합니다.
    pub fn new(config: BinanceConfig) -> ExchangeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ExchangeError::NetworkError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self { config, client })
    }

    /// 설정 반환.
    pub fn config(&self) -> &BinanceConfig {
        &self.config
    }

    /// 캔들 한 페이지를 조회합니다.
    pub async fn fetch_page(
        &self,
        symbol: &str,
        interval: Timeframe,
        limit: u32,
        start_time: Option<i64>,
    ) -> ExchangeResult<Vec<Candle>> {
        let mut params = vec![
            ("symbol", symbol.to_uppercase()),
            ("interval", interval.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(start) = start_time {
            params.push(("startTime", start.to_string()));
        }

        debug!(url = %self.config.klines_url, ?params, "GET klines");

        let response = self
            .client
            .get(&self.config.klines_url)
            .query(&params)
            .send()
            .await?;

        let rows: Vec<BinanceKline> = Self::handle_response(response).await?;
        rows.into_iter().map(Self::to_candle).collect()
    }

    /// 최근 `limit`개의 캔들을 조회합니다.
    ///
    /// 페이지 크기 이하면 한 번에, 초과하면 `limit`개 전 시점부터 앞으로
    /// 페이지를 넘기며 조회합니다.
    pub async fn fetch_recent(
        &self,
        symbol: &str,
        interval: Timeframe,
        limit: u32,
    ) -> ExchangeResult<Vec<Candle>> {
        let page_size = self.config.max_page_size;
        if limit <= page_size {
            return self.fetch_page(symbol, interval, limit, None).await;
        }

        let mut candles = Vec::new();
        let mut remaining = limit;
        let span = i64::from(limit).saturating_mul(interval.as_millis());
        let mut start = Utc::now().timestamp_millis().saturating_sub(span).max(0);

        while remaining > 0 {
            let page = self
                .fetch_page(symbol, interval, remaining.min(page_size), Some(start))
                .await?;
            let Some(last) = page.last() else {
                break;
            };

            start = last.time + 1;
            remaining = remaining.saturating_sub(page.len() as u32);
            candles.extend(page);

            if remaining > 0 {
                self.pause().await;
            }
        }

        info!(symbol, %interval, count = candles.len(), "Fetched recent candles");
        Ok(candles)
    }

    /// `start_ms`부터 짧은 페이지가 나올 때까지 모든 캔들을 조회합니다.
    pub async fn fetch_range(
        &self,
        symbol: &str,
        interval: Timeframe,
        start_ms: i64,
    ) -> ExchangeResult<Vec<Candle>> {
        let page_size = self.config.max_page_size;
        let mut candles = Vec::new();
        let mut start = start_ms;

        loop {
            let page = self
                .fetch_page(symbol, interval, page_size, Some(start))
                .await?;
            let Some(last) = page.last() else {
                break;
            };

            let full_page = page.len() as u32 >= page_size;
            let next_start = last.time + 1;
            candles.extend(page);

            if !full_page || next_start <= start {
                break;
            }
            start = next_start;
            self.pause().await;
        }

        info!(symbol, %interval, start_ms, count = candles.len(), "Fetched candle range");
        Ok(candles)
    }

    async fn pause(&self) {
        if self.config.page_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.page_delay_ms)).await;
        }
    }

    /// API 응답 처리.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> ExchangeResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                error!("Failed to parse klines response: {} - Body: {}", e, truncate(&body));
                ExchangeError::ParseError(e.to_string())
            })
        } else {
            Err(ExchangeError::ApiError {
                code: i32::from(status.as_u16()),
                message: truncate(&body),
            })
        }
    }

    fn to_candle(row: BinanceKline) -> ExchangeResult<Candle> {
        Ok(Candle {
            time: row.0,
            open: parse_decimal(&row.1)?,
            high: parse_decimal(&row.2)?,
            low: parse_decimal(&row.3)?,
            close: parse_decimal(&row.4)?,
            volume: parse_decimal(&row.5)?,
        })
    }
}

#[async_trait]
impl CandleSource for BinanceClient {
    fn name(&self) -> &str {
        "binance"
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: Timeframe,
        limit: u32,
    ) -> ExchangeResult<Vec<Candle>> {
        self.fetch_recent(symbol, interval, limit).await
    }

    async fn fetch_since(
        &self,
        symbol: &str,
        interval: Timeframe,
        start_ms: i64,
    ) -> ExchangeResult<Vec<Candle>> {
        self.fetch_range(symbol, interval, start_ms).await
    }
}

fn parse_decimal(raw: &str) -> ExchangeResult<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| ExchangeError::ParseError(format!("invalid decimal '{}': {}", raw, e)))
}

fn truncate(body: &str) -> String {
    body.chars().take(ERROR_BODY_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_kline_row_to_candle() {
        let row: BinanceKline = serde_json::from_str(
            r#"[1700000000000,"2000.10","2010.00","1995.5","2005.25","123.456",1700000059999,"0",10,"0","0","0"]"#,
        )
        .unwrap();
        let candle = BinanceClient::to_candle(row).unwrap();

        assert_eq!(candle.time, 1_700_000_000_000);
        assert_eq!(candle.open, dec!(2000.10));
        assert_eq!(candle.low, dec!(1995.5));
        assert_eq!(candle.volume, dec!(123.456));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let body = "é".repeat(300);
        let cut = truncate(&body);
        assert_eq!(cut.chars().count(), 200);
    }

    #[test]
    fn test_config_clamps_page_size() {
        let config = BinanceConfig::default().with_max_page_size(5000);
        assert_eq!(config.max_page_size, 1000);
        assert_eq!(config.user_agent, "TradeBot-Smart/1.0");
        assert_eq!(config.timeout_secs, 20);
    }
}
