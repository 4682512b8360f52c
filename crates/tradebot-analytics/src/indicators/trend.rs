//! 추세 지표 (Trend Indicators).
//!
//! - SMA (Simple Moving Average)
//! - EMA (Exponential Moving Average)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{ensure_period, IndicatorError, IndicatorResult};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// 이동평균 기간 (span).
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 8 }
    }
}

/// 추세 지표 계산기.
#[derive(Debug, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    /// 새로운 추세 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 단순 이동평균 (SMA) 계산.
    ///
    /// 인덱스 `period-1`부터 값을 내보내므로 결과 길이는 `n - period + 1`입니다.
    ///
    /// # Errors
    /// 데이터가 `period`보다 적으면 `InsufficientData`.
    pub fn sma(&self, values: &[Decimal], params: SmaParams) -> IndicatorResult<Vec<Decimal>> {
        let period = params.period;
        ensure_period("SMA", period)?;

        if values.len() < period {
            return Err(IndicatorError::InsufficientData {
                required: period,
                provided: values.len(),
            });
        }

        let divisor = Decimal::from(period);
        let mut result = Vec::with_capacity(values.len() - period + 1);
        let mut sum: Decimal = values[..period].iter().sum();
        result.push(sum / divisor);

        for i in period..values.len() {
            sum += values[i] - values[i - period];
            result.push(sum / divisor);
        }

        Ok(result)
    }

    /// 지수 이동평균 (EMA) 계산.
    ///
    /// ```text
    /// alpha = 2 / (period + 1)
    /// out[0] = v[0]
    /// out[i] = (v[i] - out[i-1]) * alpha + out[i-1]
    /// ```
    ///
    /// 빈 입력은 빈 결과를 반환합니다.
    pub fn ema(&self, values: &[Decimal], params: EmaParams) -> IndicatorResult<Vec<Decimal>> {
        ensure_period("EMA", params.period)?;

        let Some(&first) = values.first() else {
            return Ok(Vec::new());
        };

        let alpha = dec!(2) / Decimal::from(params.period + 1);
        let mut result = Vec::with_capacity(values.len());
        let mut prev = first;
        result.push(prev);

        for &value in &values[1..] {
            prev += (value - prev) * alpha;
            result.push(prev);
        }

        Ok(result)
    }
}
