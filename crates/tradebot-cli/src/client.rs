//! 백테스트 서버 HTTP 클라이언트.
//!
//! 서버는 실패해도 `{"error": ...}` JSON을 돌려주므로, HTTP 상태와 관계없이
//! 본문을 응답 계약으로 파싱합니다. 전송/파싱 실패만 [`ClientError`]가 됩니다.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use tradebot_core::BacktestRequest;

use crate::dashboard::contract::{BacktestReply, CandlesReply, StatusReply, TradesFile};

/// 클라이언트 에러.
#[derive(Debug, Error)]
pub enum ClientError {
    /// 연결 실패 등 전송 오류
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON이 아닌 응답 등 파싱 오류
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// 클라이언트 Result 타입.
pub type ClientResult<T> = Result<T, ClientError>;

/// 대시보드가 사용하는 서버 API.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// `GET /api/status`
    async fn fetch_status(&self) -> ClientResult<StatusReply>;

    /// `POST /api/backtest` (JSON)
    async fn run_backtest(&self, request: &BacktestRequest) -> ClientResult<BacktestReply>;

    /// `POST /api/backtest` (multipart `csv`)
    async fn upload_csv(&self, file_name: &str, contents: Vec<u8>) -> ClientResult<BacktestReply>;

    /// `GET /api/candles`
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> ClientResult<CandlesReply>;

    /// `GET /download_trades`
    async fn download_trades(&self) -> ClientResult<TradesFile>;
}

/// reqwest 기반 구현.
#[derive(Debug, Clone)]
pub struct HttpDashboardApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpDashboardApi {
    /// 서버 주소로 클라이언트를 생성합니다. (예: `http://127.0.0.1:8000`)
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tradebot-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// 서버 주소.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let text = response.text().await?;
        debug!(%status, bytes = text.len(), "Received response");

        serde_json::from_str(&text).map_err(|e| {
            ClientError::Parse(format!("{} (status {})", e, status.as_u16()))
        })
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn fetch_status(&self) -> ClientResult<StatusReply> {
        let response = self.client.get(self.url("/api/status")).send().await?;
        Self::parse(response).await
    }

    async fn run_backtest(&self, request: &BacktestRequest) -> ClientResult<BacktestReply> {
        let response = self
            .client
            .post(self.url("/api/backtest"))
            .json(request)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn upload_csv(&self, file_name: &str, contents: Vec<u8>) -> ClientResult<BacktestReply> {
        let part = Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = Form::new().part("csv", part);

        let response = self
            .client
            .post(self.url("/api/backtest"))
            .multipart(form)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> ClientResult<CandlesReply> {
        let limit = limit.to_string();
        let response = self
            .client
            .get(self.url("/api/candles"))
            .query(&[("symbol", symbol), ("limit", limit.as_str()), ("interval", interval)])
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn download_trades(&self) -> ClientResult<TradesFile> {
        let response = self.client.get(self.url("/download_trades")).send().await?;

        if response.status().is_success() {
            let bytes = response.bytes().await?;
            return Ok(TradesFile::Csv(bytes.to_vec()));
        }

        let reply: BacktestReply = Self::parse(response).await?;
        Ok(TradesFile::Missing(
            reply.error.unwrap_or_else(|| "no trades file".to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = HttpDashboardApi::new("http://localhost:8000/").unwrap();
        assert_eq!(api.base_url(), "http://localhost:8000");
        assert_eq!(api.url("/api/status"), "http://localhost:8000/api/status");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ClientError::Parse("expected value".to_string()).to_string(),
            "Parse error: expected value"
        );
    }
}
