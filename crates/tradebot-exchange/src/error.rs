//! 시세 소스 에러 타입.

use thiserror::Error;

/// 캔들 조회/파싱 에러.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 거래소가 성공이 아닌 상태 코드를 반환함
    #[error("Binance API error {code}: {message}")]
    ApiError { code: i32, message: String },

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 지원하지 않는 캔들 간격
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    /// 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 알 수 없는 에러
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// 시세 소스 Result 타입.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

impl ExchangeError {
    /// 재시도 가능한 에러인지 확인.
    pub fn is_retryable(&self) -> bool {
        match self {
            ExchangeError::NetworkError(_) | ExchangeError::Timeout(_) => true,
            ExchangeError::ApiError { code, .. } => self.is_rate_limited() || *code >= 500,
            _ => false,
        }
    }

    /// 요청 한도 초과(HTTP 429, IP 차단 418)인지 확인.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ExchangeError::ApiError { code: 429 | 418, .. })
    }

    /// 권장 재시도 대기 시간(밀리초) 반환.
    pub fn retry_delay_ms(&self) -> Option<u64> {
        match self {
            _ if self.is_rate_limited() => Some(60_000),
            ExchangeError::ApiError { code, .. } if *code >= 500 => Some(2_000),
            ExchangeError::NetworkError(_) => Some(1_000),
            ExchangeError::Timeout(_) => Some(500),
            _ => None,
        }
    }

    /// 요청 자체가 잘못된 에러인지 확인 (재시도 무의미).
    pub fn is_invalid_request(&self) -> bool {
        match self {
            ExchangeError::InvalidInterval(_) => true,
            ExchangeError::ApiError { code, .. } => {
                (400..500).contains(code) && !self.is_rate_limited()
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExchangeError::Timeout(err.to_string())
        } else if err.is_connect() || err.is_request() {
            ExchangeError::NetworkError(err.to_string())
        } else if err.is_decode() {
            ExchangeError::ParseError(err.to_string())
        } else {
            ExchangeError::Unknown(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message_format() {
        let err = ExchangeError::ApiError {
            code: 451,
            message: "restricted location".to_string(),
        };
        assert_eq!(err.to_string(), "Binance API error 451: restricted location");
        assert!(err.is_invalid_request());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retry_delay() {
        let limited = ExchangeError::ApiError {
            code: 429,
            message: "Too many requests".to_string(),
        };
        assert!(limited.is_rate_limited());
        assert!(limited.is_retryable());
        assert!(!limited.is_invalid_request());
        assert_eq!(limited.retry_delay_ms(), Some(60_000));
        assert_eq!(ExchangeError::ParseError("x".to_string()).retry_delay_ms(), None);
        assert!(ExchangeError::Timeout("20s".to_string()).is_retryable());
    }
}
