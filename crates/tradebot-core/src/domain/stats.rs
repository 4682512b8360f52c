//! 백테스트 요약 통계.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 단일 백테스트 실행의 집계 결과.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestStats {
    /// 시작 잔고
    #[serde(with = "rust_decimal::serde::float")]
    pub initial_balance: Decimal,
    /// 최종 잔고 (소수점 8자리 반올림)
    #[serde(with = "rust_decimal::serde::float")]
    pub final_balance: Decimal,
    /// 순손익 (소수점 8자리 반올림)
    #[serde(with = "rust_decimal::serde::float")]
    pub profit_usd: Decimal,
    /// 청산된 거래 수
    pub trades: usize,
    /// 승리 거래 수 (손익 >= 0)
    pub wins: usize,
    /// 패배 거래 수
    pub losses: usize,
    /// 승률 (%, 소수점 2자리 반올림)
    #[serde(with = "rust_decimal::serde::float")]
    pub win_rate: Decimal,
}

impl BacktestStats {
    /// 최종 잔고와 승/패 수로 통계를 계산합니다.
    pub fn from_outcome(
        initial_balance: Decimal,
        final_balance: Decimal,
        wins: usize,
        losses: usize,
    ) -> Self {
        let closed = wins + losses;
        let win_rate = if closed > 0 {
            (Decimal::from(wins) / Decimal::from(closed) * Decimal::ONE_HUNDRED).round_dp(2)
        } else {
            Decimal::ZERO
        };

        Self {
            initial_balance,
            final_balance: final_balance.round_dp(8),
            profit_usd: (final_balance - initial_balance).round_dp(8),
            trades: closed,
            wins,
            losses,
            win_rate,
        }
    }
}
