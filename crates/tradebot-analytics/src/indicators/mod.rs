//! 기술적 지표 모듈.
//!
//! 백테스트 엔진이 사용하는 지표를 `Decimal`로 계산합니다.
//! 모든 출력은 입력과 같은 길이를 유지하므로(SMA 제외) 인덱스로 바로
//! 캔들과 맞춰 쓸 수 있습니다.
//!
//! # 지원 지표
//!
//! ## 추세 지표
//! - **EMA**: 지수 이동평균 (첫 값으로 시작)
//! - **SMA**: 단순 이동평균
//!
//! ## 모멘텀 지표
//! - **RSI**: Wilder 방식 상대강도지수
//!
//! ## 변동성 지표
//! - **ATR**: 평균 실제 범위
//!
//! ## 거래량 지표
//! - **후행 평균 거래량**: 현재 캔들을 제외한 직전 N개 평균
//!
//! # 사용 예시
//!
//! ```ignore
//! use tradebot_analytics::indicators::{IndicatorEngine, EmaParams, RsiParams};
//!
//! let engine = IndicatorEngine::new();
//! let fast = engine.ema(&closes, EmaParams { period: 8 })?;
//! let rsi = engine.rsi(&closes, RsiParams { period: 14 })?;
//! ```

pub mod momentum;
pub mod trend;
pub mod volatility;
pub mod volume;

use rust_decimal::Decimal;
use thiserror::Error;

pub use momentum::{MomentumCalculator, RsiParams};
pub use trend::{EmaParams, SmaParams, TrendIndicators};
pub use volatility::{AtrParams, VolatilityIndicators};
pub use volume::{VolumeIndicators, VolumeParams};

/// 지표 계산 오류.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 계산 오류
    #[error("계산 오류: {0}")]
    CalculationError(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// 기간 파라미터 검증.
pub(crate) fn ensure_period(name: &str, period: usize) -> IndicatorResult<()> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "{} 기간은 0보다 커야 합니다",
            name
        )));
    }
    Ok(())
}

/// 통합 지표 엔진.
///
/// 개별 계산기를 묶어 하나의 인터페이스로 제공합니다.
#[derive(Debug, Default)]
pub struct IndicatorEngine {
    trend: TrendIndicators,
    momentum: MomentumCalculator,
    volatility: VolatilityIndicators,
    volume: VolumeIndicators,
}

impl IndicatorEngine {
    /// 새로운 지표 엔진 생성.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== 추세 지표 ====================

    /// 지수 이동평균 (EMA) 계산. 출력 길이 = 입력 길이.
    pub fn ema(&self, values: &[Decimal], params: EmaParams) -> IndicatorResult<Vec<Decimal>> {
        self.trend.ema(values, params)
    }

    /// 단순 이동평균 (SMA) 계산. 출력 길이 = `n - period + 1`.
    pub fn sma(&self, values: &[Decimal], params: SmaParams) -> IndicatorResult<Vec<Decimal>> {
        self.trend.sma(values, params)
    }

    // ==================== 모멘텀 지표 ====================

    /// RSI 계산. 0-100 사이 값, 출력 길이 = 입력 길이.
    pub fn rsi(&self, values: &[Decimal], params: RsiParams) -> IndicatorResult<Vec<Decimal>> {
        self.momentum.rsi(values, params)
    }

    // ==================== 변동성 지표 ====================

    /// ATR 계산.
    pub fn atr(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: AtrParams,
    ) -> IndicatorResult<Vec<Decimal>> {
        self.volatility.atr(high, low, close, params)
    }

    // ==================== 거래량 지표 ====================

    /// 직전 `window`개 캔들의 평균 거래량.
    pub fn trailing_average(
        &self,
        volumes: &[Decimal],
        params: VolumeParams,
    ) -> IndicatorResult<Vec<Decimal>> {
        self.volume.trailing_average(volumes, params)
    }
}
