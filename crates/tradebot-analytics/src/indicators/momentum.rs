//! 모멘텀 지표 (Momentum Indicators).
//!
//! - RSI (Relative Strength Index, Wilder 평활)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{ensure_period, IndicatorResult};

/// 데이터가 부족할 때 사용하는 중립 RSI 값.
const NEUTRAL_RSI: Decimal = dec!(50);

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    /// 새로운 모멘텀 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// RSI (Relative Strength Index) 계산.
    ///
    /// RSI = 100 - (100 / (1 + RS)), RS = 평균 상승폭 / 평균 하락폭
    ///
    /// - 값이 `period + 1`개 미만이면 전부 50
    /// - 초기 평균은 처음 `period`개 변화량의 단순 평균 (하락 합이 0이면 1e-9)
    /// - 이후 `avg = (avg * (period - 1) + x) / period`
    /// - 앞쪽 `period + 1`개는 50으로 채워 출력 길이를 입력과 맞춤
    pub fn rsi(&self, values: &[Decimal], params: RsiParams) -> IndicatorResult<Vec<Decimal>> {
        let period = params.period;
        ensure_period("RSI", period)?;

        let n = values.len();
        if n < period + 1 {
            return Ok(vec![NEUTRAL_RSI; n]);
        }

        let (ups, downs): (Vec<Decimal>, Vec<Decimal>) = values
            .windows(2)
            .map(|w| {
                let delta = w[1] - w[0];
                (delta.max(Decimal::ZERO), (-delta).max(Decimal::ZERO))
            })
            .unzip();

        let p = Decimal::from(period);
        let p_minus_one = Decimal::from(period - 1);

        let mut up_avg = ups[..period].iter().sum::<Decimal>() / p;
        let down_sum: Decimal = downs[..period].iter().sum();
        let mut down_avg = if down_sum.is_zero() {
            dec!(0.000000001)
        } else {
            down_sum / p
        };

        let mut result = vec![NEUTRAL_RSI; period + 1];
        result.reserve(n - result.len());

        for (&up, &down) in ups[period..].iter().zip(&downs[period..]) {
            up_avg = (up_avg * p_minus_one + up) / p;
            down_avg = (down_avg * p_minus_one + down) / p;
            let rs = up_avg / (down_avg + dec!(0.000000000001));
            result.push(dec!(100) - dec!(100) / (Decimal::ONE + rs));
        }

        if result.len() < n {
            let pad = vec![result[0]; n - result.len()];
            result.splice(0..0, pad);
        }

        Ok(result)
    }
}
