use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Instant;
use thiserror::Error;
use tracing::debug;

use crate::market_data::types::MarketSnapshot;
use crate::metrics::prometheus as telemetry;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("ticker request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("ticker endpoint returned {0}")]
    Status(StatusCode),

    #[error("malformed ticker payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Anything that can produce a full market snapshot.
#[async_trait]
pub trait TickerSource: Send + Sync {
    /// `symbols` is a hint; implementations may return more (or fewer) symbols.
    async fn fetch(&self, symbols: &[String]) -> Result<MarketSnapshot, FetchError>;
}

/// Pulls every ticker from an HTTP endpoint returning `{"SYMBOL": {ask, bid, ...}}`.
pub struct HttpTickerSource {
    client: reqwest::Client,
    url: String,
}

impl HttpTickerSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl TickerSource for HttpTickerSource {
    async fn fetch(&self, symbols: &[String]) -> Result<MarketSnapshot, FetchError> {
        debug!(url = %self.url, requested = symbols.len(), "fetching tickers");

        let started = Instant::now();
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        let snapshot = parse_tickers(&body)?;

        telemetry::record_fetch_latency(started.elapsed().as_secs_f64() * 1_000.0);
        debug!(symbols = snapshot.len(), bytes = body.len(), "tickers decoded");

        Ok(snapshot)
    }
}

pub fn parse_tickers(body: &[u8]) -> Result<MarketSnapshot, FetchError> {
    Ok(serde_json::from_slice(body)?)
}
