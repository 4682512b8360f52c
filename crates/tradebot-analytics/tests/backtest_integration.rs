//! 합성 캔들 위에서 백테스트 전체 파이프라인을 검증합니다.
//!
//! 1. 결정적 합성 캔들 생성
//! 2. 백테스트 실행
//! 3. 통계/거래 목록 불변식 확인
//! 4. 거래 기록 CSV 누적

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use tradebot_analytics::backtest::{BacktestConfig, BacktestEngine, TradeLog};
use tradebot_core::{BacktestResponse, ExitReason, Timeframe};
use tradebot_exchange::SyntheticCandles;

fn synthetic(symbol: &str, count: usize) -> Vec<tradebot_core::Candle> {
    SyntheticCandles::default().generate(symbol, Timeframe::M1, 1_700_000_000_000, count)
}

/// 거래량 필터를 끄면 거래가 충분히 발생합니다.
fn active_config() -> BacktestConfig {
    BacktestConfig::default().with_volume_multiplier(dec!(0))
}

#[test]
fn test_stats_are_consistent_with_trades() {
    let candles = synthetic("ETHUSDT", 5_000);
    let report = BacktestEngine::new(active_config()).run(&candles).unwrap();
    let stats = &report.stats;

    assert!(stats.trades > 0, "expected trades on 5000 synthetic candles");
    assert_eq!(stats.trades, report.trades.len());
    assert_eq!(stats.trades, stats.wins + stats.losses);
    assert_eq!(
        stats.wins,
        report.trades.iter().filter(|t| t.profit >= Decimal::ZERO).count()
    );

    let last = report.trades.last().unwrap();
    assert_eq!(stats.final_balance, last.balance_after.round_dp(8));
    assert_eq!(
        stats.profit_usd,
        (last.balance_after - stats.initial_balance).round_dp(8)
    );

    let expected_rate =
        (Decimal::from(stats.wins) / Decimal::from(stats.trades) * dec!(100)).round_dp(2);
    assert_eq!(stats.win_rate, expected_rate);
}

#[test]
fn test_trades_are_chronological_and_stops_exact() {
    let candles = synthetic("BTCUSDT", 5_000);
    let config = active_config().with_stop_loss_pct(dec!(0.002));
    let report = BacktestEngine::new(config).run(&candles).unwrap();

    for pair in report.trades.windows(2) {
        assert!(pair[0].time < pair[1].time);
    }
    for trade in report.trades.iter().filter(|t| t.reason == ExitReason::StopLoss) {
        assert_eq!(trade.exit, trade.entry * (Decimal::ONE - dec!(0.002)));
        assert!(trade.profit < Decimal::ZERO);
    }
}

#[test]
fn test_no_trades_before_warmup() {
    let config = active_config();
    let warmup = config.warmup();
    let candles = synthetic("SOLUSDT", warmup);

    let report = BacktestEngine::new(config).run(&candles).unwrap();
    assert!(report.trades.is_empty());
    assert_eq!(report.stats.win_rate, Decimal::ZERO);
    assert_eq!(report.stats.profit_usd, Decimal::ZERO);
}

#[test]
fn test_report_wire_shape() {
    let candles = synthetic("ETHUSDT", 2_000);
    let report = BacktestEngine::new(active_config()).run(&candles).unwrap();

    let response = BacktestResponse {
        stats: report.stats.clone(),
        trades: report.trades.clone(),
    };
    let json: Value = serde_json::to_value(&response).unwrap();

    assert!(json["stats"]["final_balance"].is_number());
    assert!(json["stats"]["win_rate"].is_number());
    assert_eq!(json["stats"]["initial_balance"], 10.0);
    if let Some(first) = json["trades"].as_array().and_then(|t| t.first()) {
        assert!(first["entry"].is_number());
        let reason = first["reason"].as_str().unwrap();
        assert!(reason == "SL" || reason == "X");
    }
}

#[test]
fn test_trade_log_accumulates_runs() {
    let path = std::env::temp_dir().join(format!("tradebot-it-{}.csv", uuid::Uuid::new_v4()));
    let log = TradeLog::new(&path);
    let engine = BacktestEngine::new(active_config());

    let first = engine.run(&synthetic("ETHUSDT", 3_000)).unwrap();
    let second = engine.run(&synthetic("BNBUSDT", 3_000)).unwrap();
    log.append(&first.trades).unwrap();
    log.append(&second.trades).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let rows = reader.records().count();
    assert_eq!(rows, first.trades.len() + second.trades.len());

    std::fs::remove_file(&path).ok();
}
