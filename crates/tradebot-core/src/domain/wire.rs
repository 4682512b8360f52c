//! HTTP 와이어 계약.
//!
//! 서버가 생성하는 응답 타입과 서버가 받아들이는 요청 타입입니다.
//! 브라우저/폼 클라이언트는 숫자를 문자열로 보내는 경우가 많으므로
//! 요청 필드는 숫자와 문자열을 모두 허용합니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BacktestStats, Candle, Trade};

/// `GET /api/status` 응답.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// 초기 잔고
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    /// 선택 가능한 심볼 목록
    pub symbols: Vec<String>,
}

/// `GET /api/candles` 응답.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandlesResponse {
    /// 조회한 심볼
    pub symbol: String,
    /// 시간순 캔들
    pub candles: Vec<Candle>,
}

/// `POST /api/backtest` 성공 응답.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResponse {
    /// 요약 통계
    pub stats: BacktestStats,
    /// 청산된 거래 (시간순)
    pub trades: Vec<Trade>,
}

/// `POST /api/backtest` 요청 (JSON 또는 폼).
///
/// 모든 필드는 선택적이며, 누락 시 서버 설정의 기본값이 적용됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    /// 심볼 (기본: 설정된 첫 번째 심볼)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// 조회 기간 (개월, 1개월 = 30일, 기본 1)
    #[serde(
        default,
        deserialize_with = "lenient::option_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub months: Option<u32>,
    /// 캔들 간격 (기본 "1m")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    /// 시작 잔고
    #[serde(
        default,
        deserialize_with = "lenient::option_decimal",
        serialize_with = "rust_decimal::serde::float_option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub initial_balance: Option<Decimal>,
    /// 거래당 위험 비율
    #[serde(
        default,
        deserialize_with = "lenient::option_decimal",
        serialize_with = "rust_decimal::serde::float_option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub risk_per_trade: Option<Decimal>,
    /// 손절 비율
    #[serde(
        default,
        deserialize_with = "lenient::option_decimal",
        serialize_with = "rust_decimal::serde::float_option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub stop_loss_pct: Option<Decimal>,
}

impl BacktestRequest {
    /// 심볼/기간/간격으로 요청을 생성합니다.
    pub fn new(symbol: impl Into<String>, months: u32, interval: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            months: Some(months),
            interval: Some(interval.into()),
            ..Default::default()
        }
    }

    /// 시작 잔고를 설정합니다.
    pub fn with_initial_balance(mut self, balance: Decimal) -> Self {
        self.initial_balance = Some(balance);
        self
    }

    /// 거래당 위험 비율을 설정합니다.
    pub fn with_risk_per_trade(mut self, risk: Decimal) -> Self {
        self.risk_per_trade = Some(risk);
        self
    }

    /// 손절 비율을 설정합니다.
    pub fn with_stop_loss_pct(mut self, pct: Decimal) -> Self {
        self.stop_loss_pct = Some(pct);
        self
    }
}

/// 숫자/문자열 겸용 역직렬화.
pub mod lenient {
    use rust_decimal::Decimal;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        Text(String),
    }

    /// `1`, `"1"`, `null`을 모두 허용합니다. 빈 문자열은 `None`입니다.
    pub fn option_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<NumberOrText>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumberOrText::Unsigned(n)) => u32::try_from(n).map(Some).map_err(D::Error::custom),
            Some(NumberOrText::Signed(n)) => u32::try_from(n).map(Some).map_err(D::Error::custom),
            Some(NumberOrText::Float(f)) if f.fract() == 0.0 && f >= 0.0 && f <= u32::MAX as f64 => {
                Ok(Some(f as u32))
            }
            Some(NumberOrText::Float(f)) => {
                Err(D::Error::custom(format!("expected an integer, got {}", f)))
            }
            Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(NumberOrText::Text(s)) => s.trim().parse().map(Some).map_err(D::Error::custom),
        }
    }

    /// `0.02`, `"0.02"`, `null`을 모두 허용합니다. 빈 문자열은 `None`입니다.
    pub fn option_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<NumberOrText>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumberOrText::Unsigned(n)) => Ok(Some(Decimal::from(n))),
            Some(NumberOrText::Signed(n)) => Ok(Some(Decimal::from(n))),
            Some(NumberOrText::Float(f)) => Decimal::try_from(f).map(Some).map_err(D::Error::custom),
            Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(NumberOrText::Text(s)) => Decimal::from_str(s.trim())
                .or_else(|_| Decimal::from_scientific(s.trim()))
                .map(Some)
                .map_err(D::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_backtest_request_accepts_numbers_and_strings() {
        let json = r#"{"symbol":"BTCUSDT","months":"2","interval":"5m","initial_balance":10.0,"risk_per_trade":"0.05"}"#;
        let request: BacktestRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.symbol.as_deref(), Some("BTCUSDT"));
        assert_eq!(request.months, Some(2));
        assert_eq!(request.initial_balance, Some(dec!(10)));
        assert_eq!(request.risk_per_trade, Some(dec!(0.05)));
        assert_eq!(request.stop_loss_pct, None);
    }

    #[test]
    fn test_backtest_request_empty_object() {
        let request: BacktestRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, BacktestRequest::default());
    }

    #[test]
    fn test_backtest_request_rejects_garbage_months() {
        let result = serde_json::from_str::<BacktestRequest>(r#"{"months":"abc"}"#);
        assert!(result.is_err());

        let result = serde_json::from_str::<BacktestRequest>(r#"{"months":1.5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_backtest_request_serializes_numbers() {
        let request = BacktestRequest::new("ETHUSDT", 1, "1m").with_initial_balance(dec!(10));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["initial_balance"], 10.0);
        assert_eq!(json["months"], 1);
        assert!(json.get("risk_per_trade").is_none());
    }

    #[test]
    fn test_status_response_shape() {
        let status = StatusResponse {
            balance: dec!(10),
            symbols: vec!["ETHUSDT".to_string(), "BTCUSDT".to_string()],
        };
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, r#"{"balance":10.0,"symbols":["ETHUSDT","BTCUSDT"]}"#);
    }
}
