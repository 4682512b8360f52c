//! 거래 기록 CSV.
//!
//! 백테스트를 실행할 때마다 청산된 거래를 같은 파일 뒤에 이어 씁니다.
//! 헤더는 파일을 새로 만들 때만 씁니다.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;
use tradebot_core::Trade;

/// CSV 헤더.
pub const TRADE_LOG_HEADER: [&str; 6] = ["time", "entry", "exit", "profit", "balance_after", "reason"];

/// 거래 기록 파일.
///
/// 동시에 여러 요청이 기록해도 행이 섞이지 않도록 쓰기를 직렬화합니다.
#[derive(Debug)]
pub struct TradeLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TradeLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// 파일 경로.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 파일이 존재하는지 확인.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// 거래 목록을 파일 끝에 추가합니다.
    ///
    /// 기록한 행 수를 반환합니다. 거래가 없어도 파일이 없으면 헤더만 씁니다.
    pub fn append(&self, trades: &[Trade]) -> Result<usize, csv::Error> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let is_new = std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_new {
            writer.write_record(TRADE_LOG_HEADER)?;
        }

        for trade in trades {
            writer.write_record([
                trade.time.to_string(),
                trade.entry.to_string(),
                trade.exit.to_string(),
                trade.profit.to_string(),
                trade.balance_after.to_string(),
                trade.reason.as_str().to_string(),
            ])?;
        }
        writer.flush()?;

        debug!(path = %self.path.display(), rows = trades.len(), "Trades appended");
        Ok(trades.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tradebot_core::ExitReason;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("tradebot-trades-{}.csv", uuid::Uuid::new_v4()))
    }

    fn sample_trade(time: i64, reason: ExitReason) -> Trade {
        Trade {
            time,
            entry: dec!(100),
            exit: dec!(99),
            profit: dec!(-0.2),
            balance_after: dec!(19.8),
            reason,
        }
    }

    #[test]
    fn test_header_written_once() {
        let path = temp_path();
        let log = TradeLog::new(&path);
        assert!(!log.exists());

        log.append(&[sample_trade(1, ExitReason::StopLoss)]).unwrap();
        log.append(&[sample_trade(2, ExitReason::CrossDown)]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "time,entry,exit,profit,balance_after,reason");
        assert_eq!(lines[1], "1,100,99,-0.2,19.8,SL");
        assert!(lines[2].ends_with(",X"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_empty_append_creates_file_with_header() {
        let path = temp_path();
        let log = TradeLog::new(&path);

        assert_eq!(log.append(&[]).unwrap(), 0);
        assert!(log.exists());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap().trim(),
            "time,entry,exit,profit,balance_after,reason"
        );

        std::fs::remove_file(&path).ok();
    }
}
