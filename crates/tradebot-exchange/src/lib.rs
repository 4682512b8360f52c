//! 캔들 데이터 소스.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - [`CandleSource`]: 캔들 조회 공통 인터페이스
//! - [`BinanceClient`]: Binance 공개 klines REST 클라이언트 (페이지네이션 포함)
//! - [`SyntheticCandles`]: 오프라인용 결정적 합성 캔들
//! - [`parse_candles_csv`]: 업로드된 CSV 텍스트를 캔들로 변환

pub mod binance;
pub mod csv_feed;
pub mod error;
pub mod source;
pub mod synthetic;

pub use binance::{BinanceClient, BinanceConfig};
pub use csv_feed::parse_candles_csv;
pub use error::*;
pub use source::{build_source, CandleSource};
pub use synthetic::SyntheticCandles;
