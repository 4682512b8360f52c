//! 업로드된 CSV 텍스트를 캔들로 변환합니다.
//!
//! 형식: `time,open,high,low,close,volume[,...]`. 첫 줄이 헤더면 건너뜁니다.
//! 시간은 epoch 밀리초/초, RFC 3339, 또는 타임존 없는 날짜/시각(UTC로 간주)을
//! 받습니다.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};
use tradebot_core::Candle;

use crate::error::{ExchangeError, ExchangeResult};

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// CSV 텍스트에서 캔들 목록을 파싱합니다.
///
/// 빈 줄, 헤더, 필드가 6개 미만인 줄은 건너뜁니다.
///
/// # Errors
/// 가격/거래량 필드를 숫자로 읽을 수 없으면 해당 줄 번호와 함께
/// `ExchangeError::ParseError`를 반환합니다.
pub fn parse_candles_csv(text: &str) -> ExchangeResult<Vec<Candle>> {
    parse_with_clock(text, Utc::now().timestamp_millis())
}

fn parse_with_clock(text: &str, now_ms: i64) -> ExchangeResult<Vec<Candle>> {
    let mut candles = Vec::new();
    let mut skipped = 0usize;

    let rows = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim_start_matches('\u{feff}').trim()))
        .filter(|(_, line)| !line.is_empty());

    for (pos, (line_no, line)) in rows.enumerate() {
        if pos == 0 && is_header(line) {
            continue;
        }

        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        if parts.len() < 6 {
            skipped += 1;
            continue;
        }

        let time = parse_time(parts[0], now_ms);
        candles.push(Candle {
            time,
            open: parse_field(parts[1], "open", line_no)?,
            high: parse_field(parts[2], "high", line_no)?,
            low: parse_field(parts[3], "low", line_no)?,
            close: parse_field(parts[4], "close", line_no)?,
            volume: parse_field(parts[5], "volume", line_no)?,
        });
    }

    if skipped > 0 {
        warn!(skipped, "Skipped short CSV rows");
    }
    debug!(count = candles.len(), "Parsed candles from CSV");
    Ok(candles)
}

fn is_header(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("time") && lower.contains("open")
}

fn parse_field(raw: &str, field: &str, line_no: usize) -> ExchangeResult<Decimal> {
    let raw = raw.trim_matches('"');
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| {
            ExchangeError::ParseError(format!(
                "line {}: invalid {} value '{}'",
                line_no, field, raw
            ))
        })
}

/// 시간 문자열을 epoch 밀리초로 변환합니다. 읽을 수 없으면 `now_ms`.
fn parse_time(raw: &str, now_ms: i64) -> i64 {
    let raw = raw.trim_matches('"');

    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        return match raw.parse::<i64>() {
            Ok(ms) if raw.len() > 10 => ms,
            Ok(secs) => secs.saturating_mul(1000),
            Err(_) => now_ms,
        };
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp_millis();
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return dt.and_utc().timestamp_millis();
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_else(|| {
            debug!(value = raw, "Unrecognized CSV time, using current time");
            now_ms
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const NOW: i64 = 1_750_000_000_000;

    #[test]
    fn test_skips_header_blank_and_short_rows() {
        let text = "Time,Open,High,Low,Close,Volume\n\
                    \n\
                    1700000000000,100,101,99,100.5,12\n\
                    1700000060000,100.5,102\n\
                    1700000120000,100.5,102,100,101,8\n";

        let candles = parse_with_clock(text, NOW).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].time, 1_700_000_000_000);
        assert_eq!(candles[0].close, dec!(100.5));
        assert_eq!(candles[1].volume, dec!(8));
    }

    #[test]
    fn test_header_only_checked_on_first_line() {
        let text = "1700000000000,1,1,1,1,1\ntime,open,high,low,close,volume\n";
        let err = parse_with_clock(text, NOW).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_time_formats() {
        assert_eq!(parse_time("1700000000000", NOW), 1_700_000_000_000);
        assert_eq!(parse_time("1700000000", NOW), 1_700_000_000_000);
        assert_eq!(parse_time("2024-01-01T00:00:00Z", NOW), 1_704_067_200_000);
        assert_eq!(parse_time("2024-01-01T09:00:00+09:00", NOW), 1_704_067_200_000);
        assert_eq!(parse_time("2024-01-01 00:01:00", NOW), 1_704_067_260_000);
        assert_eq!(parse_time("2024-01-01", NOW), 1_704_067_200_000);
        assert_eq!(parse_time("yesterday", NOW), NOW);
    }

    #[test]
    fn test_bad_price_names_line() {
        let text = "time,open,high,low,close,volume\n1700000000000,abc,1,1,1,1\n";
        let err = parse_with_clock(text, NOW).unwrap_err();
        assert!(matches!(err, ExchangeError::ParseError(_)));
        assert!(err.to_string().contains("line 2"));
        assert!(err.to_string().contains("open"));
    }

    #[test]
    fn test_extra_columns_and_scientific_volume() {
        let text = "1700000000000,1.5,2,1,1.8,1e-5,999,42\n";
        let candles = parse_candles_csv(text).unwrap();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].volume, dec!(0.00001));
    }

    #[test]
    fn test_empty_text_yields_no_candles() {
        assert!(parse_candles_csv("").unwrap().is_empty());
        assert!(parse_candles_csv("time,open,high,low,close,volume\n").unwrap().is_empty());
    }
}
