//! mockito 서버를 상대로 한 대시보드 HTTP 클라이언트 테스트.

use std::sync::Arc;

use mockito::{Matcher, Server};
use rust_decimal_macros::dec;
use tradebot_cli::dashboard::chart::{ChartSpec, ChartSurface};
use tradebot_cli::dashboard::contract::TradesFile;
use tradebot_cli::dashboard::view::TerminalView;
use tradebot_cli::{ClientError, Dashboard, DashboardApi, HttpDashboardApi, RunOutcome, Selection};
use tradebot_core::BacktestRequest;

#[derive(Default)]
struct NullSurface {
    created: usize,
}

impl ChartSurface for NullSurface {
    type Handle = usize;

    fn create(&mut self, _spec: &ChartSpec) -> usize {
        self.created += 1;
        self.created
    }

    fn dispose(&mut self, _handle: usize) {}
}

#[tokio::test]
async fn test_status_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/status")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"balance":10.0,"symbols":["ETHUSDT","BTCUSDT"]}"#)
        .create_async()
        .await;

    let api = HttpDashboardApi::new(server.url()).unwrap();
    let status = api.fetch_status().await.unwrap();

    mock.assert_async().await;
    assert_eq!(status.symbols_or_default(), vec!["ETHUSDT", "BTCUSDT"]);
    assert_eq!(status.balance_or_default(), dec!(10));
}

#[tokio::test]
async fn test_backtest_posts_json_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/backtest")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJsonString(
            r#"{"symbol":"ETHUSDT","months":1,"interval":"1m","initial_balance":10.0}"#.to_string(),
        ))
        .with_status(200)
        .with_body(
            r#"{"stats":{"initial_balance":10.0,"final_balance":10.2,"trades":1,"wins":1,"losses":0,"win_rate":100.0},
                "trades":[{"time":1700000000000,"entry":100.0,"exit":102.0,"profit":0.2,"balance_after":10.2,"reason":"X"}]}"#,
        )
        .create_async()
        .await;

    let api = HttpDashboardApi::new(server.url()).unwrap();
    let request = BacktestRequest::new("ETHUSDT", 1, "1m").with_initial_balance(dec!(10));
    let reply = api.run_backtest(&request).await.unwrap();

    mock.assert_async().await;
    assert!(reply.error.is_none());
    assert_eq!(reply.stats.as_ref().unwrap().wins, Some(1));
    assert_eq!(reply.trades()[0].reason.as_deref(), Some("X"));
}

#[tokio::test]
async fn test_error_body_parsed_regardless_of_status() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/backtest")
        .with_status(500)
        .with_body(r#"{"error":"no candles retrieved","code":"NO_CANDLES"}"#)
        .create_async()
        .await;

    let api = HttpDashboardApi::new(server.url()).unwrap();
    let reply = api.run_backtest(&BacktestRequest::default()).await.unwrap();

    assert_eq!(reply.error.as_deref(), Some("no candles retrieved"));
}

#[tokio::test]
async fn test_non_json_body_is_parse_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/status")
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;

    let api = HttpDashboardApi::new(server.url()).unwrap();
    let result = api.fetch_status().await;

    assert!(matches!(result, Err(ClientError::Parse(_))));
}

#[tokio::test]
async fn test_upload_sends_multipart_csv_field() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/backtest")
        .match_header("content-type", Matcher::Regex("^multipart/form-data".to_string()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="csv"; filename="candles.csv""#.to_string()),
            Matcher::Regex("1700000000000,1,2,0.5,1.5,10".to_string()),
        ]))
        .with_status(200)
        .with_body(r#"{"stats":{"trades":0},"trades":[]}"#)
        .create_async()
        .await;

    let api = HttpDashboardApi::new(server.url()).unwrap();
    let reply = api
        .upload_csv(
            "candles.csv",
            b"time,open,high,low,close,volume\n1700000000000,1,2,0.5,1.5,10\n".to_vec(),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(reply.trades().is_empty());
}

#[tokio::test]
async fn test_candles_query_parameters() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/candles")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("symbol".into(), "BTCUSDT".into()),
            Matcher::UrlEncoded("limit".into(), "500".into()),
            Matcher::UrlEncoded("interval".into(), "15m".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"symbol":"BTCUSDT","candles":[{"time":0,"open":1,"high":2,"low":0.5,"close":1.5,"volume":3}]}"#)
        .create_async()
        .await;

    let api = HttpDashboardApi::new(server.url()).unwrap();
    let reply = api.fetch_candles("BTCUSDT", "15m", 500).await.unwrap();

    mock.assert_async().await;
    assert_eq!(reply.candles.unwrap()[0].close, Some(dec!(1.5)));
}

#[tokio::test]
async fn test_download_trades_attachment_and_missing() {
    let mut server = Server::new_async().await;
    let found = server
        .mock("GET", "/download_trades")
        .with_status(200)
        .with_header("content-type", "text/csv")
        .with_body("time,entry,exit,profit,balance_after,reason\n")
        .expect(1)
        .create_async()
        .await;

    let api = HttpDashboardApi::new(server.url()).unwrap();
    let file = api.download_trades().await.unwrap();
    found.assert_async().await;
    assert_eq!(
        file,
        TradesFile::Csv(b"time,entry,exit,profit,balance_after,reason\n".to_vec())
    );
    found.remove_async().await;

    server
        .mock("GET", "/download_trades")
        .with_status(404)
        .with_body(r#"{"error":"no trades file","code":"NOT_FOUND"}"#)
        .create_async()
        .await;

    let file = api.download_trades().await.unwrap();
    assert_eq!(file, TradesFile::Missing("no trades file".to_string()));
}

#[tokio::test]
async fn test_dashboard_flow_against_server() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/backtest")
        .with_status(200)
        .with_body(r#"{"stats":{"trades":1},"trades":[{"time":60000,"profit":-1.0}]}"#)
        .create_async()
        .await;
    let candles = server
        .mock("GET", "/api/candles")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"symbol":"ETHUSDT","candles":[{"time":0,"open":1,"high":2,"low":0.5,"close":1.5}]}"#)
        .expect(1)
        .create_async()
        .await;

    let api = Arc::new(HttpDashboardApi::new(server.url()).unwrap());
    let view = TerminalView::new(Vec::new()).with_color(false);
    let mut dashboard = Dashboard::new(api, view, NullSurface::default());

    let outcome = dashboard.run_backtest(&Selection::new("ETHUSDT", 1, "1m")).await;

    candles.assert_async().await;
    assert_eq!(outcome, RunOutcome::Completed { trades: 1, charted: true });
    assert_eq!(dashboard.chart().surface().created, 1);
}
