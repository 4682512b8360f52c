//! CSV 업로드 경로.
//!
//! 업로드한 파일로 백테스트를 실행하고 결과를 그립니다. 기본적으로 차트는
//! 갱신하지 않으며, `chart`를 켜면 업로드한 파일의 캔들로 차트를 그립니다.

use tracing::{info, warn};
use tradebot_exchange::parse_candles_csv;

use super::backtest::RunOutcome;
use super::chart::{ChartSpec, ChartSurface};
use super::view::DashboardView;
use super::Dashboard;

impl<V: DashboardView, S: ChartSurface> Dashboard<V, S> {
    /// CSV 파일을 업로드해 백테스트를 실행합니다.
    pub async fn upload_csv(&mut self, file_name: &str, contents: Vec<u8>, chart: bool) -> RunOutcome {
        let local_text = chart.then(|| String::from_utf8_lossy(&contents).into_owned());

        let reply = match self.api.upload_csv(file_name, contents).await {
            Ok(reply) => reply,
            Err(e) => {
                let message = e.to_string();
                warn!(file = file_name, error = %message, "CSV upload failed");
                self.view.alert(&message);
                return RunOutcome::Failed(message);
            }
        };

        if let Some(error) = &reply.error {
            self.view.alert(error);
            return RunOutcome::Rejected(error.clone());
        }

        let trades = reply.trades().len();
        self.view.alert(&format!("Backtest completed: {} trades", trades));
        self.render_reply(&reply);
        info!(file = file_name, trades, "Uploaded backtest rendered");

        let charted = match local_text {
            Some(text) => self.chart_local(&text),
            None => false,
        };
        RunOutcome::Completed { trades, charted }
    }

    /// 업로드한 파일의 캔들로 차트를 그립니다.
    fn chart_local(&mut self, text: &str) -> bool {
        match parse_candles_csv(text) {
            Ok(candles) => {
                self.chart.render(&ChartSpec::from_candles(&candles));
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse uploaded candles for chart");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::dashboard::contract::{BacktestReply, StatsReply, TradeReply};
    use crate::dashboard::test_support::{CountingSurface, RecordingView, ScriptedApi};

    const CSV: &str = "time,open,high,low,close,volume\n\
                       1700000000000,1,2,0.5,1.5,10\n\
                       1700000060000,1.5,2.5,1,2,12\n";

    fn reply() -> BacktestReply {
        BacktestReply {
            error: None,
            stats: Some(StatsReply::default()),
            trades: Some(vec![TradeReply::default()]),
        }
    }

    fn dashboard(api: Arc<ScriptedApi>) -> Dashboard<RecordingView, CountingSurface> {
        Dashboard::new(api, RecordingView::default(), CountingSurface::default())
    }

    #[tokio::test]
    async fn test_upload_alerts_and_renders_without_chart() {
        let api = Arc::new(ScriptedApi {
            backtest: Some(reply()),
            ..Default::default()
        });
        let mut dashboard = dashboard(Arc::clone(&api));

        let outcome = dashboard
            .upload_csv("candles.csv", CSV.as_bytes().to_vec(), false)
            .await;

        assert_eq!(outcome, RunOutcome::Completed { trades: 1, charted: false });
        assert_eq!(api.calls(), vec![format!("upload candles.csv {}", CSV.len())]);
        assert_eq!(
            dashboard.view().events,
            vec!["alert Backtest completed: 1 trades", "stats 7", "trades 1"]
        );
        assert!(!dashboard.chart().is_active());
    }

    #[tokio::test]
    async fn test_upload_chart_opt_in_uses_file_candles() {
        let api = Arc::new(ScriptedApi {
            backtest: Some(reply()),
            ..Default::default()
        });
        let mut dashboard = dashboard(Arc::clone(&api));

        let outcome = dashboard
            .upload_csv("candles.csv", CSV.as_bytes().to_vec(), true)
            .await;

        assert_eq!(outcome, RunOutcome::Completed { trades: 1, charted: true });
        assert_eq!(dashboard.chart().surface().created, vec![2]);
        assert!(api.calls().iter().all(|c| !c.starts_with("candles")));
    }

    #[tokio::test]
    async fn test_upload_error_field_alerts_raw_text() {
        let api = Arc::new(ScriptedApi {
            backtest: Some(BacktestReply {
                error: Some("no candles".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        });
        let mut dashboard = dashboard(api);

        let outcome = dashboard.upload_csv("empty.csv", Vec::new(), true).await;

        assert_eq!(outcome, RunOutcome::Rejected("no candles".to_string()));
        assert_eq!(dashboard.view().events, vec!["alert no candles"]);
        assert!(!dashboard.chart().is_active());
    }

    #[tokio::test]
    async fn test_upload_transport_failure_alerts() {
        let mut dashboard = dashboard(Arc::new(ScriptedApi::default()));

        let outcome = dashboard.upload_csv("candles.csv", Vec::new(), false).await;

        assert!(matches!(outcome, RunOutcome::Failed(_)));
        assert_eq!(
            dashboard.view().events,
            vec!["alert Transport error: connection refused"]
        );
    }
}
