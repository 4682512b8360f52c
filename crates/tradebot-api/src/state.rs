//! 애플리케이션 상태 관리.
//!
//! 모든 핸들러가 공유하는 상태를 정의합니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tradebot_analytics::{BacktestConfig, TradeLog};
use tradebot_core::AppConfig;
use tradebot_exchange::CandleSource;

/// 애플리케이션 공유 상태.
///
/// `Arc<AppState>` 형태로 axum 라우터에 주입됩니다.
pub struct AppState {
    /// 로드된 설정 (불변)
    pub config: Arc<AppConfig>,

    /// 캔들 소스 (Binance 또는 합성 데이터)
    pub candles: Arc<dyn CandleSource>,

    /// 거래 기록 CSV
    pub trade_log: Arc<TradeLog>,

    /// 서버 시작 시간
    pub started_at: DateTime<Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    pub fn new(config: AppConfig, candles: Arc<dyn CandleSource>) -> Self {
        let trade_log = TradeLog::new(config.storage.trade_log_path.clone());
        Self {
            config: Arc::new(config),
            candles,
            trade_log: Arc::new(trade_log),
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 캔들 소스 교체 (빌더 패턴).
    pub fn with_candle_source(mut self, candles: Arc<dyn CandleSource>) -> Self {
        self.candles = candles;
        self
    }

    /// 거래 기록 파일 교체 (빌더 패턴).
    pub fn with_trade_log(mut self, trade_log: TradeLog) -> Self {
        self.trade_log = Arc::new(trade_log);
        self
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    /// 설정의 전략 값으로 만든 백테스트 기본 설정.
    pub fn backtest_defaults(&self) -> BacktestConfig {
        BacktestConfig::from(&self.config.strategy)
    }

    /// 요청에 심볼이 없을 때 사용할 심볼.
    pub fn default_symbol(&self) -> &str {
        self.config.market.default_symbol()
    }
}

/// 테스트용 구성 요소.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_support {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tradebot_core::{Candle, Timeframe};
    use tradebot_exchange::{ExchangeError, ExchangeResult};

    use super::*;

    static NEXT_LOG: AtomicUsize = AtomicUsize::new(0);

    /// 고정된 캔들(또는 에러)을 돌려주는 캔들 소스.
    #[derive(Debug, Clone, Default)]
    pub struct StubCandles {
        pub candles: Vec<Candle>,
        pub failure: Option<String>,
    }

    impl StubCandles {
        pub fn with_candles(candles: Vec<Candle>) -> Self {
            Self {
                candles,
                failure: None,
            }
        }

        pub fn failing(message: impl Into<String>) -> Self {
            Self {
                candles: Vec::new(),
                failure: Some(message.into()),
            }
        }

        fn result(&self, limit: Option<usize>) -> ExchangeResult<Vec<Candle>> {
            if let Some(message) = &self.failure {
                return Err(ExchangeError::NetworkError(message.clone()));
            }
            let candles = match limit {
                Some(n) => self.candles.iter().rev().take(n).rev().copied().collect(),
                None => self.candles.clone(),
            };
            Ok(candles)
        }
    }

    #[async_trait]
    impl CandleSource for StubCandles {
        fn name(&self) -> &str {
            "stub"
        }

        async fn fetch_candles(
            &self,
            _symbol: &str,
            _interval: Timeframe,
            limit: u32,
        ) -> ExchangeResult<Vec<Candle>> {
            self.result(Some(limit as usize))
        }

        async fn fetch_since(
            &self,
            _symbol: &str,
            _interval: Timeframe,
            _start_ms: i64,
        ) -> ExchangeResult<Vec<Candle>> {
            self.result(None)
        }
    }

    /// 테스트마다 겹치지 않는 거래 기록 경로.
    pub fn temp_trade_log_path() -> PathBuf {
        std::env::temp_dir().join(format!(
            "tradebot-api-{}-{}.csv",
            std::process::id(),
            NEXT_LOG.fetch_add(1, Ordering::SeqCst)
        ))
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 네트워크 없이 동작하도록 빈 스텁 캔들 소스와 임시 거래 기록 경로를 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    let mut config = AppConfig::default();
    config.storage.trade_log_path = test_support::temp_trade_log_path();

    AppState::new(config, Arc::new(test_support::StubCandles::default()))
}
