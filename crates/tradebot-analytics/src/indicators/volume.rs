//! 거래량 지표 (Volume Indicators).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ensure_period, IndicatorResult};

/// 후행 평균 거래량 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VolumeParams {
    /// 평균에 사용할 직전 캔들 수 (기본: 20).
    pub window: usize,
}

impl Default for VolumeParams {
    fn default() -> Self {
        Self { window: 20 }
    }
}

/// 거래량 지표 계산기.
#[derive(Debug, Default)]
pub struct VolumeIndicators;

impl VolumeIndicators {
    /// 새로운 거래량 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 후행 평균 거래량.
    ///
    /// `avg[i] = mean(volumes[max(0, i - window)..i])`. 현재 캔들은 포함하지
    /// 않으며, 윈도우가 비어 있는 첫 값은 자기 자신입니다.
    pub fn trailing_average(
        &self,
        volumes: &[Decimal],
        params: VolumeParams,
    ) -> IndicatorResult<Vec<Decimal>> {
        let window = params.window;
        ensure_period("거래량 윈도우", window)?;

        let mut result = Vec::with_capacity(volumes.len());
        let mut sum = Decimal::ZERO;

        for (i, &volume) in volumes.iter().enumerate() {
            let start = i.saturating_sub(window);
            let count = i - start;
            if count == 0 {
                result.push(volume);
            } else {
                result.push(sum / Decimal::from(count));
            }

            // 다음 인덱스의 윈도우 [i+1-window, i+1) 로 이동
            sum += volume;
            if i + 1 > window {
                sum -= volumes[i - window];
            }
        }

        Ok(result)
    }
}
