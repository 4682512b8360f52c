//! 캔들 소스 공통 인터페이스.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use tradebot_core::{Candle, MarketConfig, MarketSource, Timeframe};

use crate::binance::{BinanceClient, BinanceConfig};
use crate::error::ExchangeResult;
use crate::synthetic::SyntheticCandles;

/// 캔들 데이터를 제공하는 소스.
///
/// 반환되는 캔들은 항상 시간순으로 정렬되어 있습니다.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// 로그/헬스 체크용 소스 이름.
    fn name(&self) -> &str;

    /// 가장 최근 `limit`개의 캔들을 조회합니다.
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: Timeframe,
        limit: u32,
    ) -> ExchangeResult<Vec<Candle>>;

    /// `start_ms`부터 현재까지의 캔들을 모두 조회합니다.
    async fn fetch_since(
        &self,
        symbol: &str,
        interval: Timeframe,
        start_ms: i64,
    ) -> ExchangeResult<Vec<Candle>>;
}

/// 설정에 맞는 캔들 소스를 생성합니다.
pub fn build_source(config: &MarketConfig) -> ExchangeResult<Arc<dyn CandleSource>> {
    let source: Arc<dyn CandleSource> = match config.source {
        MarketSource::Binance => Arc::new(BinanceClient::new(BinanceConfig::from(config))?),
        MarketSource::Synthetic => Arc::new(SyntheticCandles::default()),
    };
    info!(source = source.name(), "Candle source ready");
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_source_by_config() {
        let mut config = MarketConfig::default();
        assert_eq!(build_source(&config).unwrap().name(), "binance");

        config.source = MarketSource::Synthetic;
        assert_eq!(build_source(&config).unwrap().name(), "synthetic");
    }
}
