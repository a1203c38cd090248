//! Bitcoin price feed agent
//!
//! Fetches the current spot price from CoinGecko and records it in the price
//! store. A store failure is logged but does not fail the fetch.

use crate::agents::store::PriceStore;
use crate::error::{AgentError, AgentResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of spot price observations
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Current Bitcoin price in USD
    async fn fetch_btc_price(&self) -> AgentResult<f64>;
}

/// CoinGecko simple-price API client
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SimplePriceResponse {
    bitcoin: CurrencyQuote,
}

#[derive(Debug, Deserialize)]
struct CurrencyQuote {
    usd: f64,
}

impl CoinGeckoClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Override the API endpoint, used by tests against a local mock server
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceFeed for CoinGeckoClient {
    async fn fetch_btc_price(&self) -> AgentResult<f64> {
        let url = format!(
            "{}/simple/price?ids=bitcoin&vs_currencies=usd",
            self.base_url
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AgentError::price_feed(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AgentError::price_feed(format!(
                "HTTP error, status: {}",
                response.status()
            )));
        }

        let data: SimplePriceResponse = response
            .json()
            .await
            .map_err(|e| AgentError::price_feed(format!("Invalid response body: {e}")))?;

        Ok(data.bitcoin.usd)
    }
}

/// Fetches the current price and records it
pub struct PriceAgent {
    feed: Arc<dyn PriceFeed>,
    store: Arc<dyn PriceStore>,
}

impl PriceAgent {
    pub fn new(feed: Arc<dyn PriceFeed>, store: Arc<dyn PriceStore>) -> Self {
        Self { feed, store }
    }

    /// Fetch the current price, record it, and return it
    ///
    /// A fetch failure propagates. A store failure is logged and swallowed so
    /// the caller still gets the price.
    pub async fn fetch_and_store(&self) -> AgentResult<f64> {
        let price = self.feed.fetch_btc_price().await?;
        info!(price, "Fetched BTC price");

        if let Err(e) = self.store.record_price(price).await {
            error!(error = %e, "Failed to store price in database");
        }

        Ok(price)
    }
}
