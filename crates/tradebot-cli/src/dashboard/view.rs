//! 화면 출력.

use std::io::Write;

use tracing::warn;

use super::status::DashboardState;
use super::trade_table::{Tone, TradeRow, TRADE_TABLE_HEADER};

/// 대시보드 화면.
pub trait DashboardView {
    /// 심볼 목록과 잔고 표시
    fn show_status(&mut self, state: &DashboardState);

    /// 일시적인 안내 문구 (예: 실행 중)
    fn show_notice(&mut self, message: &str);

    /// 결과 영역에 에러 문구 표시
    fn show_error(&mut self, message: &str);

    /// 사용자 알림
    fn alert(&mut self, message: &str);

    /// 통계 요약 표시
    fn render_stats(&mut self, lines: &[(&'static str, String)]);

    /// 거래 테이블 표시
    fn render_trades(&mut self, rows: &[TradeRow]);
}

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// 터미널 화면.
pub struct TerminalView<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out, color: true }
    }

    /// ANSI 색상 사용 여부.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            warn!(error = %e, "Failed to write to terminal");
        }
    }

    fn paint(&self, text: String, tone: Tone) -> String {
        let code = match tone {
            Tone::Positive => GREEN,
            Tone::Negative => RED,
            Tone::Neutral => return text,
        };
        if self.color {
            format!("{}{}{}", code, text, RESET)
        } else {
            text
        }
    }
}

impl<W: Write> DashboardView for TerminalView<W> {
    fn show_status(&mut self, state: &DashboardState) {
        self.emit(&format!("Symbols: {}", state.symbols.join(", ")));
        self.emit(&format!("Balance: {}", state.balance_label()));
    }

    fn show_notice(&mut self, message: &str) {
        self.emit(message);
    }

    fn show_error(&mut self, message: &str) {
        self.emit(&format!("Error: {}", message));
    }

    fn alert(&mut self, message: &str) {
        self.emit(&format!("[!] {}", message));
    }

    fn render_stats(&mut self, lines: &[(&'static str, String)]) {
        let width = lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        for (label, value) in lines {
            self.emit(&format!("{:<width$}  {}", label, value, width = width));
        }
    }

    fn render_trades(&mut self, rows: &[TradeRow]) {
        let cells: Vec<[&str; 6]> = rows
            .iter()
            .map(|r| {
                [
                    r.time.as_str(),
                    r.entry.as_str(),
                    r.exit.as_str(),
                    r.profit.as_str(),
                    r.balance_after.as_str(),
                    r.reason.as_str(),
                ]
            })
            .collect();

        let mut widths = TRADE_TABLE_HEADER.map(str::len);
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let format_row = |row: &[&str; 6]| -> String {
            row.iter()
                .zip(widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let header = format_row(&TRADE_TABLE_HEADER);
        self.emit(&header);
        for (row, cells) in rows.iter().zip(&cells) {
            let line = self.paint(format_row(cells), row.tone);
            self.emit(&line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(time: &str, profit: &str, tone: Tone) -> TradeRow {
        TradeRow {
            time: time.to_string(),
            entry: String::new(),
            exit: "1.000000".to_string(),
            profit: profit.to_string(),
            balance_after: "10.000000".to_string(),
            reason: "SL".to_string(),
            tone,
        }
    }

    #[test]
    fn test_trades_are_colored_by_tone() {
        let mut view = TerminalView::new(Vec::new());
        view.render_trades(&[
            row("2024-01-01 00:02:00", "-3.000000", Tone::Negative),
            row("2024-01-01 00:01:00", "5.000000", Tone::Positive),
        ]);

        let text = String::from_utf8(view.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Time"));
        assert!(lines[1].starts_with(RED));
        assert!(lines[1].contains("-3.000000"));
        assert!(lines[2].starts_with(GREEN));
    }

    #[test]
    fn test_plain_output_without_color() {
        let mut view = TerminalView::new(Vec::new()).with_color(false);
        view.show_status(&DashboardState::default());
        view.render_trades(&[row("t", "", Tone::Neutral)]);

        let text = String::from_utf8(view.into_inner()).unwrap();
        assert!(text.contains("Balance: $10.00"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_stats_are_aligned() {
        let mut view = TerminalView::new(Vec::new());
        view.render_stats(&[("Trades", "3".to_string()), ("Win rate", "66.67%".to_string())]);

        let text = String::from_utf8(view.into_inner()).unwrap();
        assert_eq!(text, "Trades    3\nWin rate  66.67%\n");
    }
}
