//! 청산된 포지션 기록.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 포지션 청산 사유.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitReason {
    /// 캔들 저가가 손절가에 닿음
    #[serde(rename = "SL")]
    StopLoss,
    /// 단기 EMA가 장기 EMA를 하향 돌파
    #[serde(rename = "X")]
    CrossDown,
}

impl ExitReason {
    /// 와이어/CSV 표기.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::StopLoss => "SL",
            ExitReason::CrossDown => "X",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 백테스트에서 청산된 거래 하나.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// 청산 캔들 시각 (epoch ms)
    pub time: i64,
    /// 진입가
    #[serde(with = "rust_decimal::serde::float")]
    pub entry: Decimal,
    /// 청산가
    #[serde(with = "rust_decimal::serde::float")]
    pub exit: Decimal,
    /// 실현 손익
    #[serde(with = "rust_decimal::serde::float")]
    pub profit: Decimal,
    /// 청산 후 잔고
    #[serde(with = "rust_decimal::serde::float")]
    pub balance_after: Decimal,
    /// 청산 사유
    pub reason: ExitReason,
}

impl Trade {
    /// 손익이 0 이상이면 승리로 집계합니다.
    pub fn is_win(&self) -> bool {
        self.profit >= Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_trade_wire_shape() {
        let trade = Trade {
            time: 1_000,
            entry: dec!(100),
            exit: dec!(99),
            profit: dec!(-0.5),
            balance_after: dec!(9.5),
            reason: ExitReason::StopLoss,
        };
        let json = serde_json::to_value(&trade).unwrap();

        assert_eq!(json["reason"], "SL");
        assert_eq!(json["profit"], -0.5);
        assert_eq!(json["balance_after"], 9.5);
        assert!(!trade.is_win());
    }

    #[test]
    fn test_break_even_counts_as_win() {
        let trade = Trade {
            time: 0,
            entry: dec!(1),
            exit: dec!(1),
            profit: Decimal::ZERO,
            balance_after: dec!(10),
            reason: ExitReason::CrossDown,
        };
        assert!(trade.is_win());
        assert_eq!(trade.reason.to_string(), "X");
    }
}
