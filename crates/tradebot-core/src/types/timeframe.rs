//! 캔들 간격(interval) 정의.
//!
//! 와이어 상에서는 Binance 간격 문자열(`"1m"`, `"4h"`, `"1d"` ...)로 표현됩니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// 캔들스틱 타임프레임.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timeframe {
    /// 1분봉
    M1,
    /// 3분봉
    M3,
    /// 5분봉
    M5,
    /// 15분봉
    M15,
    /// 30분봉
    M30,
    /// 1시간봉
    H1,
    /// 2시간봉
    H2,
    /// 4시간봉
    H4,
    /// 6시간봉
    H6,
    /// 8시간봉
    H8,
    /// 12시간봉
    H12,
    /// 일봉
    D1,
    /// 3일봉
    D3,
    /// 주봉
    W1,
    /// 월봉
    MN1,
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::M1
    }
}

impl Timeframe {
    /// 캔들 하나의 길이.
    pub fn duration(&self) -> Duration {
        let minutes: u64 = match self {
            Timeframe::M1 => 1,
            Timeframe::M3 => 3,
            Timeframe::M5 => 5,
            Timeframe::M15 => 15,
            Timeframe::M30 => 30,
            Timeframe::H1 => 60,
            Timeframe::H2 => 2 * 60,
            Timeframe::H4 => 4 * 60,
            Timeframe::H6 => 6 * 60,
            Timeframe::H8 => 8 * 60,
            Timeframe::H12 => 12 * 60,
            Timeframe::D1 => 24 * 60,
            Timeframe::D3 => 3 * 24 * 60,
            Timeframe::W1 => 7 * 24 * 60,
            Timeframe::MN1 => 30 * 24 * 60, // 근사값
        };
        Duration::from_secs(minutes * 60)
    }

    /// 캔들 하나의 길이 (밀리초).
    pub fn as_millis(&self) -> i64 {
        self.duration().as_millis() as i64
    }

    /// 하루에 들어가는 캔들 수 (일봉 이상은 최소 1).
    pub fn bars_per_day(&self) -> u64 {
        (86_400 / self.duration().as_secs()).max(1)
    }

    /// 바이낸스 간격 문자열로 변환합니다.
    pub fn as_binance_interval(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M3 => "3m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H2 => "2h",
            Timeframe::H4 => "4h",
            Timeframe::H6 => "6h",
            Timeframe::H8 => "8h",
            Timeframe::H12 => "12h",
            Timeframe::D1 => "1d",
            Timeframe::D3 => "3d",
            Timeframe::W1 => "1w",
            Timeframe::MN1 => "1M",
        }
    }

    /// 바이낸스 간격 문자열에서 파싱합니다.
    ///
    /// `"1m"`(분)과 `"1M"`(월)은 대소문자로 구분됩니다.
    pub fn from_binance_interval(s: &str) -> Option<Self> {
        let tf = match s.trim() {
            "1m" => Timeframe::M1,
            "3m" => Timeframe::M3,
            "5m" => Timeframe::M5,
            "15m" => Timeframe::M15,
            "30m" => Timeframe::M30,
            "1h" => Timeframe::H1,
            "2h" => Timeframe::H2,
            "4h" => Timeframe::H4,
            "6h" => Timeframe::H6,
            "8h" => Timeframe::H8,
            "12h" => Timeframe::H12,
            "1d" => Timeframe::D1,
            "3d" => Timeframe::D3,
            "1w" => Timeframe::W1,
            "1M" => Timeframe::MN1,
            _ => return None,
        };
        Some(tf)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_binance_interval())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_binance_interval(s).ok_or_else(|| format!("Invalid interval: {}", s))
    }
}

impl TryFrom<String> for Timeframe {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.as_binance_interval().to_string()
    }
}
