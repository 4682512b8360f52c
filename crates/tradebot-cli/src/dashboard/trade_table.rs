//! 거래 테이블과 통계 요약 렌더링.
//!
//! 입력 → 출력만 있는 순수 함수입니다.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use super::contract::{StatsReply, TradeReply};

/// 행 색상.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// 손익 ≥ 0 (녹색)
    Positive,
    /// 손익 < 0 (빨간색)
    Negative,
    /// 손익 없음
    Neutral,
}

/// 렌더링된 테이블 행. 누락된 필드는 빈 문자열입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRow {
    pub time: String,
    pub entry: String,
    pub exit: String,
    pub profit: String,
    pub balance_after: String,
    pub reason: String,
    pub tone: Tone,
}

/// 테이블 헤더.
pub const TRADE_TABLE_HEADER: [&str; 6] = ["Time", "Entry", "Exit", "Profit", "Balance", "Reason"];

/// 거래를 최신순 행으로 변환합니다. 시간이 없는 거래는 마지막에 둡니다.
pub fn render_trades(trades: &[TradeReply]) -> Vec<TradeRow> {
    let mut sorted: Vec<&TradeReply> = trades.iter().collect();
    sorted.sort_by(|a, b| b.time.cmp(&a.time));

    sorted
        .into_iter()
        .map(|t| TradeRow {
            time: t.time.map(format_time).unwrap_or_default(),
            entry: format_number(t.entry),
            exit: format_number(t.exit),
            profit: format_number(t.profit),
            balance_after: format_number(t.balance_after),
            reason: t.reason.clone().unwrap_or_default(),
            tone: match t.profit {
                Some(p) if p >= Decimal::ZERO => Tone::Positive,
                Some(_) => Tone::Negative,
                None => Tone::Neutral,
            },
        })
        .collect()
}

/// 통계를 (라벨, 값) 목록으로 변환합니다.
pub fn render_stats(stats: &StatsReply) -> Vec<(&'static str, String)> {
    vec![
        ("Initial balance", money(stats.initial_balance)),
        ("Final balance", money(stats.final_balance)),
        ("Profit", money(stats.profit_usd)),
        ("Trades", count(stats.trades)),
        ("Wins", count(stats.wins)),
        ("Losses", count(stats.losses)),
        (
            "Win rate",
            stats
                .win_rate
                .map(|w| format!("{:.2}%", w.round_dp(2)))
                .unwrap_or_default(),
        ),
    ]
}

fn format_number(value: Option<Decimal>) -> String {
    value.map(|v| format!("{:.6}", v.round_dp(6))).unwrap_or_default()
}

fn money(value: Option<Decimal>) -> String {
    value.map(|v| format!("${:.2}", v.round_dp(2))).unwrap_or_default()
}

fn count(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn format_time(ms: i64) -> String {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}
