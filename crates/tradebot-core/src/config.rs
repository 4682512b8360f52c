//! 설정 관리.
//!
//! 설정은 다음 순서로 합성됩니다 (뒤가 우선):
//! 1. 코드 기본값
//! 2. TOML 파일 (선택)
//! 3. `TRADEBOT__SECTION__KEY` 형식의 환경 변수
//! 4. 기존 배포 스크립트 호환용 단일 환경 변수 (`SYMBOLS`, `INITIAL_BALANCE`, `PORT` ...)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{TradeBotError, TradeBotResult};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 시세 소스 설정
    pub market: MarketConfig,
    /// 전략/백테스트 설정
    pub strategy: StrategyConfig,
    /// 파일 저장 설정
    pub storage: StorageConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 타임아웃 (초). 여러 달치 분봉 페이지네이션을 고려해 넉넉하게 잡습니다.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_secs: 120,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 캔들 데이터 출처.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketSource {
    /// Binance 공개 REST API
    #[default]
    Binance,
    /// 결정적 합성 데이터 (오프라인)
    Synthetic,
}

impl FromStr for MarketSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "binance" => Ok(Self::Binance),
            "synthetic" | "mock" => Ok(Self::Synthetic),
            other => Err(format!("Unknown market source: {}", other)),
        }
    }
}

/// 시세 소스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MarketConfig {
    /// 캔들 출처
    pub source: MarketSource,
    /// 대시보드에 노출할 심볼 목록
    pub symbols: Vec<String>,
    /// Binance klines 엔드포인트
    pub klines_url: String,
    /// HTTP 타임아웃 (초)
    pub timeout_secs: u64,
    /// 요청 User-Agent
    pub user_agent: String,
    /// 페이지 간 대기 시간 (밀리초)
    pub page_delay_ms: u64,
    /// 페이지당 최대 캔들 수
    pub max_page_size: u32,
    /// `/api/candles` 기본 조회 개수
    pub default_candle_limit: u32,
    /// `/api/candles` 최대 조회 개수
    pub max_candle_limit: u32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            source: MarketSource::Binance,
            symbols: ["ETHUSDT", "BTCUSDT", "BNBUSDT", "SOLUSDT", "ADAUSDT"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            klines_url: "https://api.binance.com/api/v3/klines".to_string(),
            timeout_secs: 20,
            user_agent: "TradeBot-Smart/1.0".to_string(),
            page_delay_ms: 120,
            max_page_size: 1000,
            default_candle_limit: 500,
            max_candle_limit: 10_000,
        }
    }
}

impl MarketConfig {
    /// 기본 심볼 (목록의 첫 번째).
    pub fn default_symbol(&self) -> &str {
        self.symbols.first().map(String::as_str).unwrap_or("ETHUSDT")
    }
}

/// 전략/백테스트 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// 시작 잔고
    pub initial_balance: Decimal,
    /// 단기 EMA 기간
    pub ema_fast: usize,
    /// 장기 EMA 기간
    pub ema_slow: usize,
    /// RSI 기간
    pub rsi_period: usize,
    /// 거래량 필터 배수
    pub volume_multiplier: Decimal,
    /// 평균 거래량 윈도우
    pub volume_window: usize,
    /// 손절 비율 (0.01 = 1%)
    pub stop_loss_pct: Decimal,
    /// 거래당 위험 비율 (0.02 = 2%)
    pub risk_per_trade: Decimal,
    /// 진입 허용 RSI 하한 (배타적)
    pub rsi_lower: Decimal,
    /// 진입 허용 RSI 상한 (배타적)
    pub rsi_upper: Decimal,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            initial_balance: dec!(10),
            ema_fast: 8,
            ema_slow: 21,
            rsi_period: 14,
            volume_multiplier: dec!(1.0),
            volume_window: 20,
            stop_loss_pct: dec!(0.01),
            risk_per_trade: dec!(0.02),
            rsi_lower: dec!(25),
            rsi_upper: dec!(75),
        }
    }
}

/// 파일 저장 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 거래 기록 CSV 경로
    pub trade_log_path: PathBuf,
    /// 정적 대시보드 디렉터리 (설정 시 `/`에서 제공)
    pub static_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            trade_log_path: PathBuf::from("trades.csv"),
            static_dir: None,
        }
    }
}

/// 단일 환경 변수 이름 목록 (기존 배포 호환).
pub const LEGACY_ENV_KEYS: &[&str] = &[
    "SYMBOLS",
    "INITIAL_BALANCE",
    "EMA_FAST",
    "EMA_SLOW",
    "RSI_PERIOD",
    "VOLUME_MULTIPLIER",
    "STOP_LOSS_PCT",
    "RISK_PER_TRADE",
    "KL_LIMIT",
    "BINANCE_KLINES",
    "PORT",
];

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> TradeBotResult<Self> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("TRADEBOT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("market.symbols")
                    .try_parsing(true),
            );

        let mut config: AppConfig = builder.build()?.try_deserialize()?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 기본 경로(`config/default.toml`)에서 설정을 로드합니다.
    pub fn load_default() -> TradeBotResult<Self> {
        Self::load("config/default.toml")
    }

    /// 단일 환경 변수 오버라이드를 적용합니다.
    ///
    /// `lookup`은 키에 해당하는 값을 돌려주는 함수이며, 보통 `std::env::var`입니다.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> TradeBotResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in LEGACY_ENV_KEYS {
            let Some(raw) = lookup(key) else {
                continue;
            };
            let value = raw.trim();
            if value.is_empty() {
                continue;
            }

            match *key {
                "SYMBOLS" => {
                    self.market.symbols = value
                        .split(',')
                        .map(|s| s.trim().to_uppercase())
                        .filter(|s| !s.is_empty())
                        .collect();
                }
                "INITIAL_BALANCE" => self.strategy.initial_balance = parse_env(key, value)?,
                "EMA_FAST" => self.strategy.ema_fast = parse_env(key, value)?,
                "EMA_SLOW" => self.strategy.ema_slow = parse_env(key, value)?,
                "RSI_PERIOD" => self.strategy.rsi_period = parse_env(key, value)?,
                "VOLUME_MULTIPLIER" => self.strategy.volume_multiplier = parse_env(key, value)?,
                "STOP_LOSS_PCT" => self.strategy.stop_loss_pct = parse_env(key, value)?,
                "RISK_PER_TRADE" => self.strategy.risk_per_trade = parse_env(key, value)?,
                "KL_LIMIT" => self.market.max_page_size = parse_env(key, value)?,
                "BINANCE_KLINES" => self.market.klines_url = value.to_string(),
                "PORT" => self.server.port = parse_env(key, value)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// 설정 검증.
    pub fn validate(&self) -> TradeBotResult<()> {
        if self.market.symbols.is_empty() {
            return Err(TradeBotError::Config(
                "심볼 목록이 비어 있습니다".to_string(),
            ));
        }
        if self.market.max_page_size == 0 || self.market.max_page_size > 1000 {
            return Err(TradeBotError::Config(format!(
                "페이지 크기는 1~1000 이어야 합니다: {}",
                self.market.max_page_size
            )));
        }
        if self.market.default_candle_limit == 0
            || self.market.default_candle_limit > self.market.max_candle_limit
        {
            return Err(TradeBotError::Config(format!(
                "기본 캔들 수는 1~{} 이어야 합니다: {}",
                self.market.max_candle_limit, self.market.default_candle_limit
            )));
        }

        let strategy = &self.strategy;
        if strategy.initial_balance <= Decimal::ZERO {
            return Err(TradeBotError::Config(
                "초기 잔고는 0보다 커야 합니다".to_string(),
            ));
        }
        if strategy.risk_per_trade < Decimal::ZERO {
            return Err(TradeBotError::Config(
                "위험 비율은 0 이상이어야 합니다".to_string(),
            ));
        }
        if strategy.stop_loss_pct < Decimal::ZERO || strategy.stop_loss_pct >= Decimal::ONE {
            return Err(TradeBotError::Config(
                "손절 비율은 0 이상 1 미만이어야 합니다".to_string(),
            ));
        }
        if strategy.ema_fast == 0
            || strategy.ema_slow == 0
            || strategy.rsi_period == 0
            || strategy.volume_window == 0
        {
            return Err(TradeBotError::Config(
                "지표 기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if strategy.rsi_lower >= strategy.rsi_upper {
            return Err(TradeBotError::Config(format!(
                "RSI 하한은 상한보다 작아야 합니다: {} >= {}",
                strategy.rsi_lower, strategy.rsi_upper
            )));
        }
        Ok(())
    }

    /// `host:port` 형식의 바인딩 주소.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> TradeBotResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| TradeBotError::Config(format!("{}={} 파싱 실패: {}", key, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.market.symbols.len(), 5);
        assert_eq!(config.market.default_symbol(), "ETHUSDT");
        assert_eq!(config.strategy.initial_balance, dec!(10));
        assert_eq!(config.strategy.ema_fast, 8);
        assert_eq!(config.strategy.ema_slow, 21);
        assert_eq!(config.storage.trade_log_path, PathBuf::from("trades.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_legacy_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(lookup(&[
                ("SYMBOLS", "btcusdt, solusdt"),
                ("INITIAL_BALANCE", "25.5"),
                ("EMA_FAST", "5"),
                ("STOP_LOSS_PCT", "0.02"),
                ("PORT", "9000"),
                ("BINANCE_KLINES", "http://localhost:1234/klines"),
            ]))
            .unwrap();

        assert_eq!(config.market.symbols, vec!["BTCUSDT", "SOLUSDT"]);
        assert_eq!(config.strategy.initial_balance, dec!(25.5));
        assert_eq!(config.strategy.ema_fast, 5);
        assert_eq!(config.strategy.stop_loss_pct, dec!(0.02));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.market.klines_url, "http://localhost:1234/klines");
    }

    #[test]
    fn test_invalid_override_is_config_error() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(lookup(&[("EMA_SLOW", "twenty")]))
            .unwrap_err();
        assert!(matches!(err, TradeBotError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_empty_symbols() {
        let mut config = AppConfig::default();
        config.market.symbols.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_strategy() {
        let mut config = AppConfig::default();
        config.strategy.volume_window = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.strategy.rsi_lower = dec!(80);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("RSI"));

        let mut config = AppConfig::default();
        config.strategy.stop_loss_pct = dec!(1);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.strategy.risk_per_trade = dec!(-0.1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_candle_limits() {
        let mut config = AppConfig::default();
        config.market.default_candle_limit = config.market.max_candle_limit + 1;
        assert!(config.validate().is_err());

        config.market.default_candle_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_market_source_from_str() {
        assert_eq!("Binance".parse::<MarketSource>().unwrap(), MarketSource::Binance);
        assert_eq!("mock".parse::<MarketSource>().unwrap(), MarketSource::Synthetic);
        assert!("kraken".parse::<MarketSource>().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load("does/not/exist.toml").unwrap();
        assert!(!config.market.symbols.is_empty());
    }
}
