//! 지표 계산과 백테스트 엔진.
//!
//! 이 크레이트는 다음 기능을 제공합니다:
//! - 기술적 지표 (EMA, SMA, RSI, ATR, 후행 평균 거래량)
//! - 규칙 기반 백테스트 엔진과 통계
//! - 거래 기록 CSV

pub mod backtest;
pub mod indicators;

pub use backtest::{
    BacktestConfig, BacktestEngine, BacktestError, BacktestReport, BacktestResult, TradeLog,
};
pub use indicators::{IndicatorEngine, IndicatorError, IndicatorResult};
