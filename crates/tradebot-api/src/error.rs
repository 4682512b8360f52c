//! 통합 API 에러 응답 타입.
//!
//! 모든 엔드포인트는 실패 시 `error` 문자열을 가진 JSON을 반환합니다.
//! 대시보드는 `error` 필드만 보고 판단하고, 나머지는 진단용 메타데이터입니다.

use axum::http::{Method, StatusCode, Uri};
use axum::Json;
use serde::{Deserialize, Serialize};

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "error": "no candles retrieved",
///   "code": "NO_CANDLES",
///   "timestamp": 1738300800,
///   "method": "POST",
///   "path": "/api/backtest"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 사람이 읽을 수 있는 에러 메시지
    pub error: String,
    /// 에러 코드 (예: "INVALID_INPUT", "NOT_FOUND")
    pub code: String,
    /// 에러 발생 타임스탬프 (Unix timestamp, 선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// HTTP 메서드 (GET, POST 등)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// 요청 경로
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.into(),
            timestamp: Some(chrono::Utc::now().timestamp()),
            method: None,
            path: None,
        }
    }

    /// 타임스탬프 없는 간단한 에러.
    pub fn simple(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.into(),
            timestamp: None,
            method: None,
            path: None,
        }
    }

    /// 요청 정보(메서드, 경로)를 추가합니다.
    #[must_use]
    pub fn with_request_info(mut self, method: &Method, uri: &Uri) -> Self {
        self.method = Some(method.to_string());
        self.path = Some(uri.path().to_string());
        self
    }

    /// 상태 코드와 묶어 핸들러 에러로 변환합니다.
    pub fn with_status(self, status: StatusCode) -> (StatusCode, Json<Self>) {
        (status, Json(self))
    }

    /// 에러 코드 반환.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// 에러 메시지 반환.
    pub fn message(&self) -> &str {
        &self.error
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.error)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_wire_shape() {
        let err = ApiErrorResponse::new("NO_CANDLES", "no candles")
            .with_request_info(&Method::POST, &"/api/backtest?x=1".parse::<Uri>().unwrap());
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["error"], "no candles");
        assert_eq!(json["code"], "NO_CANDLES");
        assert_eq!(json["method"], "POST");
        assert_eq!(json["path"], "/api/backtest");
        assert!(json["timestamp"].is_i64());
    }

    #[test]
    fn test_simple_omits_metadata() {
        let json = serde_json::to_value(ApiErrorResponse::simple("NOT_FOUND", "no trades file")).unwrap();
        assert_eq!(json, serde_json::json!({"error": "no trades file", "code": "NOT_FOUND"}));
    }
}
