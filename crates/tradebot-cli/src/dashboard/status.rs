//! 심볼/잔고 로더.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::chart::ChartSurface;
use super::contract::{DEFAULT_BALANCE, DEFAULT_SYMBOL};
use super::view::DashboardView;
use super::Dashboard;

/// 대시보드 상태.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    /// 선택 가능한 심볼
    pub symbols: Vec<String>,
    /// 표시 잔고
    pub balance: Decimal,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            symbols: vec![DEFAULT_SYMBOL.to_string()],
            balance: DEFAULT_BALANCE,
        }
    }
}

impl DashboardState {
    /// `$10.00` 형식의 잔고 라벨.
    pub fn balance_label(&self) -> String {
        format!("${:.2}", self.balance.round_dp(2))
    }

    /// 기본 선택 심볼 (목록의 첫 번째).
    pub fn default_symbol(&self) -> &str {
        self.symbols.first().map(String::as_str).unwrap_or(DEFAULT_SYMBOL)
    }
}

impl<V: DashboardView, S: ChartSurface> Dashboard<V, S> {
    /// `/api/status`를 조회해 상태를 갱신합니다.
    ///
    /// 실패하면 경고 로그만 남기고 기본 상태를 유지합니다.
    pub async fn load_status(&mut self) -> &DashboardState {
        match self.api.fetch_status().await {
            Ok(reply) => {
                self.state = DashboardState {
                    symbols: reply.symbols_or_default(),
                    balance: reply.balance_or_default(),
                };
                debug!(symbols = self.state.symbols.len(), "Status loaded");
            }
            Err(e) => {
                warn!(error = %e, "Failed to load status, keeping defaults");
            }
        }

        self.view.show_status(&self.state);
        &self.state
    }
}
