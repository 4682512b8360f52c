//! 공통 에러 타입.

use thiserror::Error;

/// 대시보드 전반의 핵심 에러.
#[derive(Debug, Error)]
pub enum TradeBotError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 거래소(시세 소스) 에러
    #[error("거래소 에러: {0}")]
    Exchange(String),

    /// 데이터 에러
    #[error("데이터 에러: {0}")]
    Data(String),

    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 파일 입출력 에러
    #[error("입출력 에러: {0}")]
    Io(#[from] std::io::Error),
}

/// 공통 Result 타입.
pub type TradeBotResult<T> = Result<T, TradeBotError>;

impl TradeBotError {
    /// 재시도 가능한 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TradeBotError::Network(_))
    }

    /// 사용자 입력 문제인지 확인합니다.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TradeBotError::InvalidInput(_) | TradeBotError::NotFound(_)
        )
    }
}

impl From<serde_json::Error> for TradeBotError {
    fn from(err: serde_json::Error) -> Self {
        TradeBotError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for TradeBotError {
    fn from(err: config::ConfigError) -> Self {
        TradeBotError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        assert!(TradeBotError::Network("timeout".to_string()).is_retryable());
        assert!(!TradeBotError::Config("bad".to_string()).is_retryable());
    }

    #[test]
    fn test_client_error() {
        assert!(TradeBotError::InvalidInput("months".to_string()).is_client_error());
        assert!(!TradeBotError::Data("empty".to_string()).is_client_error());
    }

    #[test]
    fn test_from_json_error() {
        let err = serde_json::from_str::<u32>("x").unwrap_err();
        let err: TradeBotError = err.into();
        assert!(matches!(err, TradeBotError::Serialization(_)));
    }
}
