//! 백테스트 대시보드 구성 요소.
//!
//! - [`status`]: 심볼/잔고 로더
//! - [`backtest`]: JSON 백테스트 실행기
//! - [`upload`]: CSV 업로드 경로
//! - [`trade_table`]: 거래 테이블 렌더러
//! - [`chart`]: 캔들스틱 차트 렌더러
//! - [`view`]: 화면 출력 추상화와 터미널 구현
//! - [`contract`]: 서버 응답 계약

pub mod backtest;
pub mod chart;
pub mod contract;
pub mod status;
pub mod trade_table;
pub mod upload;
pub mod view;

use std::sync::Arc;

use crate::client::DashboardApi;
use chart::{ChartRenderer, ChartSurface};
use contract::BacktestReply;
use view::DashboardView;

pub use backtest::{RunOutcome, Selection};
pub use status::DashboardState;

/// 대시보드.
///
/// 서버 API, 화면, 차트 인스턴스와 현재 상태를 소유합니다.
/// 명령은 한 번에 하나씩 순차적으로 실행됩니다.
pub struct Dashboard<V: DashboardView, S: ChartSurface> {
    api: Arc<dyn DashboardApi>,
    view: V,
    chart: ChartRenderer<S>,
    state: DashboardState,
}

impl<V: DashboardView, S: ChartSurface> Dashboard<V, S> {
    pub fn new(api: Arc<dyn DashboardApi>, view: V, surface: S) -> Self {
        Self {
            api,
            view,
            chart: ChartRenderer::new(surface),
            state: DashboardState::default(),
        }
    }

    /// 현재 상태 (심볼 목록, 잔고).
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn chart(&self) -> &ChartRenderer<S> {
        &self.chart
    }

    /// 통계와 거래 목록을 그리고 거래 수를 반환합니다.
    fn render_reply(&mut self, reply: &BacktestReply) -> usize {
        if let Some(stats) = &reply.stats {
            self.view.render_stats(&trade_table::render_stats(stats));
        }
        let rows = trade_table::render_trades(reply.trades());
        self.view.render_trades(&rows);
        rows.len()
    }
}
