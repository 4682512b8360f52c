//! 도메인 모델.
//!
//! - [`candle`]: OHLCV 캔들
//! - [`trade`]: 청산된 포지션 기록
//! - [`stats`]: 백테스트 요약 통계
//! - [`wire`]: HTTP 요청/응답 계약

pub mod candle;
pub mod stats;
pub mod trade;
pub mod wire;

pub use candle::Candle;
pub use stats::BacktestStats;
pub use trade::{ExitReason, Trade};
pub use wire::{BacktestRequest, BacktestResponse, CandlesResponse, StatusResponse};
