//! 백테스팅 엔진
//!
//! 단일 롱 포지션만 다루는 규칙 기반 시뮬레이션입니다.
//!
//! # 규칙
//!
//! - **진입**: 포지션이 없고 EMA 골든 크로스, 거래량 > 평균 × 배수,
//!   직전 RSI가 (하한, 상한) 구간 안일 때 종가로 진입
//! - **수량**: `잔고 × 위험 비율 / (가격 × 손절 비율)`
//! - **손절**: 캔들 저가가 손절가 이하이면 손절가로 청산 (`SL`)
//! - **청산**: 손절이 아니고 EMA 데드 크로스이면 종가로 청산 (`X`)
//! - **복리**: 청산 대금 전체가 새 잔고
//!
//! 마지막까지 열려 있는 포지션은 청산하지 않고 통계에도 넣지 않습니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use tradebot_analytics::backtest::{BacktestConfig, BacktestEngine};
//! use rust_decimal_macros::dec;
//!
//! let config = BacktestConfig::default()
//!     .with_initial_balance(dec!(100))
//!     .with_stop_loss_pct(dec!(0.02));
//!
//! let report = BacktestEngine::new(config).run(&candles)?;
//! println!("승률: {}%", report.stats.win_rate);
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use tradebot_core::{BacktestStats, Candle, ExitReason, StrategyConfig, Trade};

use crate::indicators::{
    EmaParams, IndicatorEngine, IndicatorError, RsiParams, VolumeParams,
};

/// 최소 진입 수량.
const MIN_QUANTITY: Decimal = dec!(0.000000000001);

/// 백테스트 오류
#[derive(Debug, Error)]
pub enum BacktestError {
    /// 입력 캔들 없음
    #[error("no candles")]
    NoCandles,

    /// 설정 오류
    #[error("백테스트 설정 오류: {0}")]
    ConfigError(String),

    /// 지표 계산 오류
    #[error("지표 계산 오류: {0}")]
    Indicator(#[from] IndicatorError),
}

/// 백테스트 결과 타입
pub type BacktestResult<T> = Result<T, BacktestError>;

/// 백테스트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// 초기 잔고
    #[serde(default = "default_initial_balance")]
    pub initial_balance: Decimal,

    /// 거래당 위험 비율 (예: 0.02 = 2%)
    #[serde(default = "default_risk_per_trade")]
    pub risk_per_trade: Decimal,

    /// 손절 비율 (예: 0.01 = 1%)
    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: Decimal,

    /// 단기 EMA 기간
    #[serde(default = "default_ema_fast")]
    pub ema_fast: usize,

    /// 장기 EMA 기간
    #[serde(default = "default_ema_slow")]
    pub ema_slow: usize,

    /// RSI 기간
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// 거래량 필터 배수
    #[serde(default = "default_volume_multiplier")]
    pub volume_multiplier: Decimal,

    /// 평균 거래량 윈도우
    #[serde(default = "default_volume_window")]
    pub volume_window: usize,

    /// 진입 허용 RSI 하한 (배타적)
    #[serde(default = "default_rsi_lower")]
    pub rsi_lower: Decimal,

    /// 진입 허용 RSI 상한 (배타적)
    #[serde(default = "default_rsi_upper")]
    pub rsi_upper: Decimal,
}

// 설정 기본값 함수들 (serde default용)
fn default_initial_balance() -> Decimal {
    dec!(10)
}
fn default_risk_per_trade() -> Decimal {
    dec!(0.02)
}
fn default_stop_loss_pct() -> Decimal {
    dec!(0.01)
}
fn default_ema_fast() -> usize {
    8
}
fn default_ema_slow() -> usize {
    21
}
fn default_rsi_period() -> usize {
    14
}
fn default_volume_multiplier() -> Decimal {
    dec!(1.0)
}
fn default_volume_window() -> usize {
    20
}
fn default_rsi_lower() -> Decimal {
    dec!(25)
}
fn default_rsi_upper() -> Decimal {
    dec!(75)
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_balance: default_initial_balance(),
            risk_per_trade: default_risk_per_trade(),
            stop_loss_pct: default_stop_loss_pct(),
            ema_fast: default_ema_fast(),
            ema_slow: default_ema_slow(),
            rsi_period: default_rsi_period(),
            volume_multiplier: default_volume_multiplier(),
            volume_window: default_volume_window(),
            rsi_lower: default_rsi_lower(),
            rsi_upper: default_rsi_upper(),
        }
    }
}

impl From<&StrategyConfig> for BacktestConfig {
    fn from(strategy: &StrategyConfig) -> Self {
        Self {
            initial_balance: strategy.initial_balance,
            risk_per_trade: strategy.risk_per_trade,
            stop_loss_pct: strategy.stop_loss_pct,
            ema_fast: strategy.ema_fast,
            ema_slow: strategy.ema_slow,
            rsi_period: strategy.rsi_period,
            volume_multiplier: strategy.volume_multiplier,
            volume_window: strategy.volume_window,
            rsi_lower: strategy.rsi_lower,
            rsi_upper: strategy.rsi_upper,
        }
    }
}

impl BacktestConfig {
    /// 초기 잔고 설정
    pub fn with_initial_balance(mut self, balance: Decimal) -> Self {
        self.initial_balance = balance;
        self
    }

    /// 거래당 위험 비율 설정
    pub fn with_risk_per_trade(mut self, risk: Decimal) -> Self {
        self.risk_per_trade = risk;
        self
    }

    /// 손절 비율 설정
    pub fn with_stop_loss_pct(mut self, pct: Decimal) -> Self {
        self.stop_loss_pct = pct;
        self
    }

    /// EMA 기간 설정
    pub fn with_ema_periods(mut self, fast: usize, slow: usize) -> Self {
        self.ema_fast = fast;
        self.ema_slow = slow;
        self
    }

    /// RSI 기간 설정
    pub fn with_rsi_period(mut self, period: usize) -> Self {
        self.rsi_period = period;
        self
    }

    /// 거래량 필터 배수 설정
    pub fn with_volume_multiplier(mut self, multiplier: Decimal) -> Self {
        self.volume_multiplier = multiplier;
        self
    }

    /// 진입 전 건너뛸 캔들 수.
    pub fn warmup(&self) -> usize {
        self.ema_slow.max(self.rsi_period) + 2
    }

    /// 설정 검증
    pub fn validate(&self) -> BacktestResult<()> {
        if self.initial_balance <= Decimal::ZERO {
            return Err(BacktestError::ConfigError(
                "초기 잔고는 0보다 커야 합니다".to_string(),
            ));
        }
        if self.risk_per_trade < Decimal::ZERO {
            return Err(BacktestError::ConfigError(
                "위험 비율은 0 이상이어야 합니다".to_string(),
            ));
        }
        if self.stop_loss_pct < Decimal::ZERO || self.stop_loss_pct >= Decimal::ONE {
            return Err(BacktestError::ConfigError(
                "손절 비율은 0 이상 1 미만이어야 합니다".to_string(),
            ));
        }
        if self.ema_fast == 0 || self.ema_slow == 0 || self.rsi_period == 0 || self.volume_window == 0 {
            return Err(BacktestError::ConfigError(
                "지표 기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if self.rsi_lower >= self.rsi_upper {
            return Err(BacktestError::ConfigError(
                "RSI 하한은 상한보다 작아야 합니다".to_string(),
            ));
        }
        Ok(())
    }
}

/// 백테스트 실행 리포트
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    /// 요약 통계
    pub stats: BacktestStats,

    /// 청산된 거래 (시간순)
    pub trades: Vec<Trade>,
}

impl BacktestReport {
    /// 요약 문자열 반환
    pub fn summary(&self) -> String {
        format!(
            "initial={} final={} profit={} trades={} wins={} losses={} win_rate={}%",
            self.stats.initial_balance,
            self.stats.final_balance,
            self.stats.profit_usd,
            self.stats.trades,
            self.stats.wins,
            self.stats.losses,
            self.stats.win_rate,
        )
    }
}

/// 시뮬레이션 포지션
#[derive(Debug, Clone, Copy)]
struct OpenPosition {
    entry: Decimal,
    quantity: Decimal,
    stop: Decimal,
}

impl OpenPosition {
    fn close(self, time: i64, exit: Decimal, reason: ExitReason) -> Trade {
        let proceeds = self.quantity * exit;
        Trade {
            time,
            entry: self.entry,
            exit,
            profit: proceeds - self.quantity * self.entry,
            balance_after: proceeds,
            reason,
        }
    }
}

/// 백테스팅 엔진
pub struct BacktestEngine {
    config: BacktestConfig,
    indicators: IndicatorEngine,
}

impl BacktestEngine {
    /// 새로운 백테스트 엔진을 생성합니다.
    pub fn new(config: BacktestConfig) -> Self {
        Self {
            config,
            indicators: IndicatorEngine::new(),
        }
    }

    /// 설정 반환
    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// 캔들 시퀀스에 대해 백테스트를 실행합니다.
    ///
    /// # Errors
    /// - 캔들이 없으면 `BacktestError::NoCandles`
    /// - 설정이 잘못되면 `BacktestError::ConfigError`
    pub fn run(&self, candles: &[Candle]) -> BacktestResult<BacktestReport> {
        if candles.is_empty() {
            return Err(BacktestError::NoCandles);
        }
        self.config.validate()?;

        let cfg = &self.config;
        let closes: Vec<Decimal> = candles.iter().map(|c| c.close).collect();
        let volumes: Vec<Decimal> = candles.iter().map(|c| c.volume).collect();

        let fast = self.indicators.ema(&closes, EmaParams { period: cfg.ema_fast })?;
        let slow = self.indicators.ema(&closes, EmaParams { period: cfg.ema_slow })?;
        let rsi = self.indicators.rsi(&closes, RsiParams { period: cfg.rsi_period })?;
        let avg_volume = self
            .indicators
            .trailing_average(&volumes, VolumeParams { window: cfg.volume_window })?;

        let mut balance = cfg.initial_balance;
        let mut position: Option<OpenPosition> = None;
        let mut trades = Vec::new();
        let (mut wins, mut losses) = (0usize, 0usize);

        for i in cfg.warmup()..candles.len() {
            let candle = &candles[i];
            let price = candle.close;
            let prev = i - 1;

            let cross_up = fast[prev] <= slow[prev] && fast[i] > slow[i];
            let cross_down = fast[prev] >= slow[prev] && fast[i] < slow[i];

            let exit = match position {
                None => {
                    let vol_ok = volumes[i] > avg_volume[i] * cfg.volume_multiplier;
                    let rsi_ok = rsi[prev] > cfg.rsi_lower && rsi[prev] < cfg.rsi_upper;

                    if cross_up && vol_ok && rsi_ok {
                        let opened = self.open_position(balance, price);
                        debug!(time = candle.time, entry = %opened.entry, qty = %opened.quantity, "Position opened");
                        position = Some(opened);
                    }
                    None
                }
                Some(open) if candle.low <= open.stop => {
                    Some(open.close(candle.time, open.stop, ExitReason::StopLoss))
                }
                Some(open) if cross_down => Some(open.close(candle.time, price, ExitReason::CrossDown)),
                Some(_) => None,
            };

            if let Some(trade) = exit {
                balance = trade.balance_after;
                if trade.is_win() {
                    wins += 1;
                } else {
                    losses += 1;
                }
                debug!(time = trade.time, reason = %trade.reason, profit = %trade.profit, "Position closed");
                trades.push(trade);
                position = None;
            }
        }

        let stats = BacktestStats::from_outcome(cfg.initial_balance, balance, wins, losses);
        info!(
            candles = candles.len(),
            trades = stats.trades,
            win_rate = %stats.win_rate,
            final_balance = %stats.final_balance,
            "Backtest completed"
        );

        Ok(BacktestReport { stats, trades })
    }

    fn open_position(&self, balance: Decimal, price: Decimal) -> OpenPosition {
        let sl = self.config.stop_loss_pct;
        let quantity = if sl <= Decimal::ZERO {
            balance / price
        } else {
            balance * self.config.risk_per_trade / (price * sl)
        };

        OpenPosition {
            entry: price,
            quantity: quantity.max(MIN_QUANTITY),
            stop: price * (Decimal::ONE - sl),
        }
    }
}
