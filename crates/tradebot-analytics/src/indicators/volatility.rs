//! 변동성 지표 (Volatility Indicators).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::trend::{SmaParams, TrendIndicators};
use super::{ensure_period, IndicatorError, IndicatorResult};

/// ATR 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AtrParams {
    /// ATR 기간 (기본: 14).
    pub period: usize,
}

impl Default for AtrParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 변동성 지표 계산기.
#[derive(Debug, Default)]
pub struct VolatilityIndicators {
    trend: TrendIndicators,
}

impl VolatilityIndicators {
    /// 새로운 변동성 지표 계산기 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// ATR (Average True Range) 계산.
    ///
    /// TR = max(H - L, |H - 이전 종가|, |L - 이전 종가|)
    ///
    /// - 캔들이 2개 미만이면 전부 0
    /// - TR 개수가 `period` 미만이면 모든 값이 TR 평균
    /// - 그 외에는 TR의 SMA 앞에 첫 SMA 값을 `period`개 붙임
    pub fn atr(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: AtrParams,
    ) -> IndicatorResult<Vec<Decimal>> {
        let period = params.period;
        ensure_period("ATR", period)?;

        let n = close.len();
        if high.len() != n || low.len() != n {
            return Err(IndicatorError::InvalidParameter(
                "고가, 저가, 종가 데이터 길이가 일치해야 합니다".to_string(),
            ));
        }

        if n < 2 {
            return Ok(vec![Decimal::ZERO; n]);
        }

        let true_ranges: Vec<Decimal> = (1..n)
            .map(|i| {
                let prev_close = close[i - 1];
                (high[i] - low[i])
                    .max((high[i] - prev_close).abs())
                    .max((low[i] - prev_close).abs())
            })
            .collect();

        if true_ranges.len() < period {
            let mean = true_ranges.iter().sum::<Decimal>() / Decimal::from(true_ranges.len());
            return Ok(vec![mean; n]);
        }

        let sma = self.trend.sma(&true_ranges, SmaParams { period })?;
        let mut result = vec![sma[0]; period];
        result.extend(sma);

        Ok(result)
    }
}
