//! 캔들스틱 차트 렌더러.
//!
//! 차트 인스턴스는 [`ChartRenderer`]가 소유하며, 새 차트를 만들기 전에
//! 항상 이전 인스턴스를 해제합니다. 실제 그리기는 [`ChartSurface`] 구현이 담당합니다.

use std::io::Write;

use chrono::{TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::warn;
use tradebot_core::Candle;

use super::contract::CandleReply;

/// 시리즈 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Candlestick,
}

/// 시간 축 단위.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Minute,
}

/// 타임스탬프 기준 OHLC 포인트.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl From<&Candle> for ChartPoint {
    fn from(c: &Candle) -> Self {
        Self {
            time: c.time,
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
        }
    }
}

impl ChartPoint {
    /// 응답 캔들에서 포인트를 만듭니다. OHLC나 시간이 빠져 있으면 `None`.
    pub fn from_reply(c: &CandleReply) -> Option<Self> {
        Some(Self {
            time: c.time?,
            open: c.open?,
            high: c.high?,
            low: c.low?,
            close: c.close?,
        })
    }
}

/// 차트 구성.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub series: SeriesKind,
    pub time_unit: TimeUnit,
    pub legend: bool,
    pub points: Vec<ChartPoint>,
}

impl ChartSpec {
    /// 분 단위 축, 범례 없는 캔들스틱 차트.
    pub fn candlestick(points: Vec<ChartPoint>) -> Self {
        Self {
            series: SeriesKind::Candlestick,
            time_unit: TimeUnit::Minute,
            legend: false,
            points,
        }
    }

    /// 서버 응답 캔들로 차트 구성.
    pub fn from_replies(candles: &[CandleReply]) -> Self {
        Self::candlestick(candles.iter().filter_map(ChartPoint::from_reply).collect())
    }

    /// 도메인 캔들로 차트 구성.
    pub fn from_candles(candles: &[Candle]) -> Self {
        Self::candlestick(candles.iter().map(ChartPoint::from).collect())
    }
}

/// 차트를 실제로 그리는 표면.
pub trait ChartSurface {
    /// 생성된 차트 인스턴스 핸들.
    type Handle;

    /// 차트 인스턴스를 생성합니다.
    fn create(&mut self, spec: &ChartSpec) -> Self::Handle;

    /// 차트 인스턴스를 해제합니다.
    fn dispose(&mut self, handle: Self::Handle);
}

/// 차트 인스턴스 수명 관리자.
pub struct ChartRenderer<S: ChartSurface> {
    surface: S,
    current: Option<S::Handle>,
}

impl<S: ChartSurface> ChartRenderer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            current: None,
        }
    }

    /// 이전 차트를 해제하고 새 차트를 그립니다.
    pub fn render(&mut self, spec: &ChartSpec) {
        if let Some(previous) = self.current.take() {
            self.surface.dispose(previous);
        }
        self.current = Some(self.surface.create(spec));
    }

    /// 현재 차트를 해제합니다.
    pub fn clear(&mut self) {
        if let Some(previous) = self.current.take() {
            self.surface.dispose(previous);
        }
    }

    /// 활성 차트가 있는지 여부.
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

/// 터미널 ASCII 캔들 표면.
pub struct TerminalChart<W: Write> {
    out: W,
    width: usize,
    height: usize,
    next_id: u64,
}

impl<W: Write> TerminalChart<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            width: 80,
            height: 16,
            next_id: 1,
        }
    }

    /// 그리기 크기 (열 = 캔들 수, 행 = 가격 단계).
    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width.max(1);
        self.height = height.max(2);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// 포인트를 격자 문자열로 그립니다. 최근 `width`개만 표시합니다.
    fn draw(&self, spec: &ChartSpec) -> Vec<String> {
        let start = spec.points.len().saturating_sub(self.width);
        let points: Vec<[f64; 4]> = spec.points[start..]
            .iter()
            .map(|p| {
                [p.open, p.high, p.low, p.close].map(|d| d.to_f64().unwrap_or(0.0))
            })
            .collect();

        let Some(first) = spec.points.get(start) else {
            return vec!["(no candles)".to_string()];
        };
        let last = spec.points[spec.points.len() - 1];

        let max = points.iter().map(|p| p[1]).fold(f64::MIN, f64::max);
        let min = points.iter().map(|p| p[2]).fold(f64::MAX, f64::min);
        let step = ((max - min) / self.height as f64).max(f64::EPSILON);

        let mut lines = Vec::with_capacity(self.height + 2);
        for row in 0..self.height {
            let level = max - (row as f64 + 0.5) * step;
            let label = if row == 0 {
                format!("{:>12.4} ┤", max)
            } else if row == self.height - 1 {
                format!("{:>12.4} ┤", min)
            } else {
                format!("{:>12} │", "")
            };

            let cells: String = points
                .iter()
                .map(|&[open, high, low, close]| {
                    let (body_low, body_high) = (open.min(close), open.max(close));
                    if level >= body_low - step / 2.0 && level <= body_high + step / 2.0 {
                        if close >= open {
                            '█'
                        } else {
                            '▒'
                        }
                    } else if level >= low && level <= high {
                        '│'
                    } else {
                        ' '
                    }
                })
                .collect();
            lines.push(format!("{}{}", label, cells));
        }
        lines.push(format!(
            "{:>14}{} .. {}",
            "",
            minute_label(first.time),
            minute_label(last.time)
        ));
        lines
    }
}

fn minute_label(ms: i64) -> String {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|t| t.format("%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ms.to_string())
}

impl<W: Write> ChartSurface for TerminalChart<W> {
    type Handle = u64;

    fn create(&mut self, spec: &ChartSpec) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        for line in self.draw(spec) {
            if let Err(e) = writeln!(self.out, "{}", line) {
                warn!(error = %e, "Failed to draw chart");
                break;
            }
        }
        id
    }

    fn dispose(&mut self, _handle: u64) {}
}
