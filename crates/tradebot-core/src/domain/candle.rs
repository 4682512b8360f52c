//! OHLCV 캔들.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 하나의 시간 구간에 대한 OHLCV 가격 샘플.
///
/// `time`은 캔들 시작 시각(Unix epoch 밀리초)입니다.
/// 가격 필드는 JSON 숫자로 직렬화됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// 시작 시각 (epoch ms)
    pub time: i64,
    /// 시가
    #[serde(with = "rust_decimal::serde::float")]
    pub open: Decimal,
    /// 고가
    #[serde(with = "rust_decimal::serde::float")]
    pub high: Decimal,
    /// 저가
    #[serde(with = "rust_decimal::serde::float")]
    pub low: Decimal,
    /// 종가
    #[serde(with = "rust_decimal::serde::float")]
    pub close: Decimal,
    /// 거래량
    #[serde(with = "rust_decimal::serde::float", default)]
    pub volume: Decimal,
}

impl Candle {
    /// 새 캔들을 생성합니다.
    pub fn new(
        time: i64,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 시작 시각을 UTC 시간으로 반환합니다.
    pub fn open_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.time)
    }

    /// 양봉 여부.
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    /// 고가-저가 범위.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }
}
