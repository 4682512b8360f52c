//! JSON 백테스트 실행기.
//!
//! 선택한 심볼/기간/간격으로 백테스트를 요청하고, 성공하면 같은 심볼의
//! 최근 캔들을 조회해 차트를 갱신합니다.

use rust_decimal::Decimal;
use tracing::{info, warn};
use tradebot_core::BacktestRequest;

use super::chart::{ChartSpec, ChartSurface};
use super::status::DashboardState;
use super::view::DashboardView;
use super::Dashboard;

/// 대시보드가 항상 보내는 시작 잔고.
pub const FIXED_INITIAL_BALANCE: Decimal = Decimal::TEN;

/// 차트에 쓰는 캔들 수.
pub const CHART_CANDLE_LIMIT: u32 = 500;

/// 실행 중 안내 문구.
pub const RUNNING_MESSAGE: &str = "Running backtest...";

/// 전송/파싱 실패 시 안내 문구.
pub const SERVER_ERROR_MESSAGE: &str = "Server error, please try again.";

/// 사용자 선택 값.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub symbol: String,
    pub months: u32,
    pub interval: String,
}

impl Selection {
    pub fn new(symbol: impl Into<String>, months: u32, interval: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            months,
            interval: interval.into(),
        }
    }

    /// 상태의 첫 번째 심볼, 1개월, 1분봉.
    pub fn from_state(state: &DashboardState) -> Self {
        Self::new(state.default_symbol(), 1, "1m")
    }

    fn to_request(&self) -> BacktestRequest {
        BacktestRequest::new(self.symbol.as_str(), self.months, self.interval.as_str())
            .with_initial_balance(FIXED_INITIAL_BALANCE)
    }
}

/// 실행 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// 통계와 거래를 그렸음
    Completed { trades: usize, charted: bool },
    /// 서버가 `error` 필드로 거부함
    Rejected(String),
    /// 전송 또는 파싱 실패
    Failed(String),
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }
}

impl<V: DashboardView, S: ChartSurface> Dashboard<V, S> {
    /// 백테스트를 실행합니다.
    pub async fn run_backtest(&mut self, selection: &Selection) -> RunOutcome {
        self.view.show_notice(RUNNING_MESSAGE);

        let reply = match self.api.run_backtest(&selection.to_request()).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Backtest request failed");
                self.view.show_error(SERVER_ERROR_MESSAGE);
                return RunOutcome::Failed(e.to_string());
            }
        };

        if let Some(error) = &reply.error {
            self.view.show_error(error);
            return RunOutcome::Rejected(error.clone());
        }

        let trades = self.render_reply(&reply);
        info!(symbol = %selection.symbol, trades, "Backtest rendered");

        let charted = self.refresh_chart(selection).await;
        RunOutcome::Completed { trades, charted }
    }

    /// 최근 캔들로 차트를 다시 그립니다.
    async fn refresh_chart(&mut self, selection: &Selection) -> bool {
        let reply = match self
            .api
            .fetch_candles(&selection.symbol, &selection.interval, CHART_CANDLE_LIMIT)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Candle request failed");
                self.view.show_error(SERVER_ERROR_MESSAGE);
                return false;
            }
        };

        if let Some(error) = &reply.error {
            self.view.show_error(error);
            return false;
        }

        let spec = ChartSpec::from_replies(reply.candles.as_deref().unwrap_or_default());
        self.chart.render(&spec);
        true
    }
}
