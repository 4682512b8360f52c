//! 오프라인용 합성 캔들 생성기.
//!
//! 네트워크 없이 데모/테스트를 돌릴 수 있도록 심볼별 기준가에서 시작하는
//! 랜덤 워크에 완만한 사인 추세를 더한 캔들을 만듭니다. 같은 심볼과 시작
//! 시각이면 항상 같은 캔들이 나옵니다.

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tracing::debug;
use tradebot_core::{Candle, Timeframe};

use crate::error::ExchangeResult;
use crate::source::CandleSource;

/// 한 번에 생성할 최대 캔들 수.
const DEFAULT_MAX_BARS: usize = 300_000;

/// 결정적 합성 캔들 소스.
#[derive(Debug, Clone)]
pub struct SyntheticCandles {
    seed: u64,
    max_bars: usize,
}

impl Default for SyntheticCandles {
    fn default() -> Self {
        Self {
            seed: 42,
            max_bars: DEFAULT_MAX_BARS,
        }
    }
}

impl SyntheticCandles {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// 최대 생성 캔들 수를 설정합니다.
    pub fn with_max_bars(mut self, max_bars: usize) -> Self {
        self.max_bars = max_bars.max(1);
        self
    }

    /// 심볼별 기준가 (USD).
    pub fn base_price(symbol: &str) -> f64 {
        let upper = symbol.to_uppercase();
        let base = upper
            .strip_suffix("USDT")
            .or_else(|| upper.strip_suffix("USD"))
            .unwrap_or(&upper);

        match base {
            "BTC" => 45_000.0,
            "ETH" => 2_500.0,
            "BNB" => 300.0,
            "ADA" => 0.45,
            "XRP" => 0.60,
            "SOL" => 100.0,
            "DOT" => 7.0,
            "LINK" => 15.0,
            "LTC" => 70.0,
            "DOGE" => 0.08,
            _ => 100.0,
        }
    }

    /// `start_ms`부터 `count`개의 캔들을 생성합니다.
    pub fn generate(
        &self,
        symbol: &str,
        interval: Timeframe,
        start_ms: i64,
        count: usize,
    ) -> Vec<Candle> {
        let count = count.min(self.max_bars);
        let step = interval.as_millis();
        let base = Self::base_price(symbol);
        let mut rng = StdRng::seed_from_u64(self.seed_for(symbol, start_ms));

        let mut candles = Vec::with_capacity(count);
        let mut walk = base;

        for i in 0..count {
            walk *= 1.0 + gaussian(&mut rng, 0.002);
            let trend = (i as f64 * 0.01).sin() * base * 0.1;
            let price = (walk + trend).max(base * 0.01);

            let open = price;
            let close = price * (1.0 + gaussian(&mut rng, 0.002));
            let high = price * (1.0 + gaussian(&mut rng, 0.005).abs());
            let low = price * (1.0 - gaussian(&mut rng, 0.005).abs());
            let volume = (10.0 + gaussian(&mut rng, 1.0)).exp();

            let high = high.max(open).max(close).max(low);
            let low = low.min(open).min(close);

            candles.push(Candle {
                time: start_ms + i as i64 * step,
                open: to_decimal(open),
                high: to_decimal(high),
                low: to_decimal(low),
                close: to_decimal(close),
                volume: to_decimal(volume),
            });
        }

        candles
    }

    fn seed_for(&self, symbol: &str, start_ms: i64) -> u64 {
        symbol
            .to_uppercase()
            .bytes()
            .fold(self.seed ^ start_ms as u64, |acc, b| {
                acc.wrapping_mul(31).wrapping_add(u64::from(b))
            })
    }
}

#[async_trait]
impl CandleSource for SyntheticCandles {
    fn name(&self) -> &str {
        "synthetic"
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: Timeframe,
        limit: u32,
    ) -> ExchangeResult<Vec<Candle>> {
        let step = interval.as_millis();
        let last_open = align_down(Utc::now().timestamp_millis(), step);
        let count = (limit as usize).min(self.max_bars);
        let start = last_open.saturating_sub(bars_span(count, step));

        debug!(symbol, %interval, count, "Generating synthetic candles");
        Ok(self.generate(symbol, interval, start, count))
    }

    async fn fetch_since(
        &self,
        symbol: &str,
        interval: Timeframe,
        start_ms: i64,
    ) -> ExchangeResult<Vec<Candle>> {
        let step = interval.as_millis();
        let mut start = align_up(start_ms, step);
        let now = Utc::now().timestamp_millis();
        if start > now {
            return Ok(Vec::new());
        }

        // 상한을 넘으면 현재에 가장 가까운 구간만 생성
        let mut count = usize::try_from((now - start) / step + 1).unwrap_or(usize::MAX);
        if count > self.max_bars {
            count = self.max_bars;
            start = align_down(now, step).saturating_sub(bars_span(count, step));
        }

        debug!(symbol, %interval, start_ms = start, count, "Generating synthetic candles");
        Ok(self.generate(symbol, interval, start, count))
    }
}

/// Box-Muller 변환으로 평균 0, 표준편차 `sigma`의 정규분포 샘플을 만듭니다.
fn gaussian(rng: &mut StdRng, sigma: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos() * sigma
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::try_from(value)
        .map(|d| d.round_dp(8))
        .unwrap_or_default()
}

/// 첫 캔들부터 `count`번째 캔들까지의 시간 간격.
fn bars_span(count: usize, step: i64) -> i64 {
    i64::try_from(count.saturating_sub(1))
        .unwrap_or(i64::MAX)
        .saturating_mul(step)
}

fn align_down(ts: i64, step: i64) -> i64 {
    ts - ts.rem_euclid(step)
}

fn align_up(ts: i64, step: i64) -> i64 {
    let rem = ts.rem_euclid(step);
    if rem == 0 {
        ts
    } else {
        ts + step - rem
    }
}
