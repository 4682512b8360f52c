//! 서버 응답 계약.
//!
//! 대시보드는 서버 응답의 모든 필드를 선택적으로 취급합니다.
//! 누락된 필드는 에러가 아니라 기본값이나 빈 칸으로 렌더링됩니다.

use rust_decimal::Decimal;
use serde::Deserialize;
use tradebot_core::domain::wire::lenient;

/// 심볼 목록이 없을 때 사용하는 심볼.
pub const DEFAULT_SYMBOL: &str = "ETHUSDT";

/// 잔고가 없을 때 표시하는 잔고.
pub const DEFAULT_BALANCE: Decimal = Decimal::TEN;

/// `GET /api/status` 응답.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusReply {
    #[serde(default)]
    pub symbols: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::option_decimal")]
    pub balance: Option<Decimal>,
}

impl StatusReply {
    /// 선택 가능한 심볼 목록. 필드가 없으면 `["ETHUSDT"]`.
    pub fn symbols_or_default(&self) -> Vec<String> {
        self.symbols
            .clone()
            .unwrap_or_else(|| vec![DEFAULT_SYMBOL.to_string()])
    }

    /// 표시할 잔고. 필드가 없으면 10.
    pub fn balance_or_default(&self) -> Decimal {
        self.balance.unwrap_or(DEFAULT_BALANCE)
    }
}

/// 백테스트 통계.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatsReply {
    #[serde(default, deserialize_with = "lenient::option_decimal")]
    pub initial_balance: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::option_decimal")]
    pub final_balance: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::option_decimal")]
    pub profit_usd: Option<Decimal>,
    #[serde(default)]
    pub trades: Option<u64>,
    #[serde(default)]
    pub wins: Option<u64>,
    #[serde(default)]
    pub losses: Option<u64>,
    #[serde(default, deserialize_with = "lenient::option_decimal")]
    pub win_rate: Option<Decimal>,
}

/// 거래 한 건.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TradeReply {
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default, deserialize_with = "lenient::option_decimal")]
    pub entry: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::option_decimal")]
    pub exit: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::option_decimal")]
    pub profit: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::option_decimal")]
    pub balance_after: Option<Decimal>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// `POST /api/backtest` 응답.
///
/// 성공이면 `stats`/`trades`, 실패이면 `error`가 채워집니다.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BacktestReply {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub stats: Option<StatsReply>,
    #[serde(default)]
    pub trades: Option<Vec<TradeReply>>,
}

impl BacktestReply {
    /// 거래 목록 (없으면 빈 슬라이스).
    pub fn trades(&self) -> &[TradeReply] {
        self.trades.as_deref().unwrap_or_default()
    }
}

/// 캔들 한 개.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CandleReply {
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default, deserialize_with = "lenient::option_decimal")]
    pub open: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::option_decimal")]
    pub high: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::option_decimal")]
    pub low: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::option_decimal")]
    pub close: Option<Decimal>,
}

/// `GET /api/candles` 응답.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandlesReply {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub candles: Option<Vec<CandleReply>>,
}

/// `GET /download_trades` 결과.
#[derive(Debug, Clone, PartialEq)]
pub enum TradesFile {
    /// CSV 본문
    Csv(Vec<u8>),
    /// 서버가 돌려준 에러 메시지 (예: "no trades file")
    Missing(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_defaults_when_fields_missing() {
        let status: StatusReply = serde_json::from_str("{}").unwrap();

        assert_eq!(status.symbols_or_default(), vec!["ETHUSDT".to_string()]);
        assert_eq!(status.balance_or_default(), dec!(10));
    }

    #[test]
    fn test_status_uses_server_values() {
        let status: StatusReply =
            serde_json::from_str(r#"{"symbols":["BTCUSDT","SOLUSDT"],"balance":25.5}"#).unwrap();

        assert_eq!(status.symbols_or_default(), vec!["BTCUSDT", "SOLUSDT"]);
        assert_eq!(status.balance_or_default(), dec!(25.5));
    }

    #[test]
    fn test_backtest_error_reply() {
        let reply: BacktestReply = serde_json::from_str(r#"{"error":"no candles retrieved"}"#).unwrap();

        assert_eq!(reply.error.as_deref(), Some("no candles retrieved"));
        assert!(reply.stats.is_none());
        assert!(reply.trades().is_empty());
    }

    #[test]
    fn test_trade_with_missing_fields() {
        let reply: BacktestReply = serde_json::from_str(
            r#"{"stats":{"trades":1},"trades":[{"time":1700000000000,"profit":-0.5}]}"#,
        )
        .unwrap();

        let trade = &reply.trades()[0];
        assert_eq!(trade.time, Some(1_700_000_000_000));
        assert_eq!(trade.entry, None);
        assert_eq!(trade.profit, Some(dec!(-0.5)));
        assert_eq!(reply.stats.unwrap().wins, None);
    }
}
