//! 백테스팅 모듈
//!
//! 캔들 시퀀스 위에서 EMA 크로스 + 거래량 + RSI 필터 전략을 시뮬레이션합니다.
//!
//! # 주요 구성요소
//!
//! - [`BacktestConfig`]: 백테스트 설정 (초기 잔고, 위험 비율, 손절 비율, 지표 기간)
//! - [`BacktestEngine`]: 백테스트 실행 엔진
//! - [`BacktestReport`]: 통계와 거래 목록
//! - [`TradeLog`]: 거래 기록 CSV 누적 저장

pub mod engine;
pub mod trade_log;

pub use engine::{BacktestConfig, BacktestEngine, BacktestError, BacktestReport, BacktestResult};
pub use trade_log::TradeLog;
