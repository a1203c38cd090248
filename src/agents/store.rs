//! Storage traits for recorded prices and news articles
//!
//! Agents write through these traits so tests and the CLI can run against an
//! in-memory store while deployments can swap in a real database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// A single recorded price observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub price: f64,
    pub recorded_at: DateTime<Utc>,
}

/// A news article captured from a search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: String,
    pub url: String,
    pub published: Option<String>,
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to write to store: {0}")]
    WriteFailed(String),
    #[error("Failed to read from store: {0}")]
    ReadFailed(String),
}

/// Persistence for price observations
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Record a price observation at the current time
    async fn record_price(&self, price: f64) -> Result<(), StoreError>;

    /// The most recent observations, newest first
    async fn recent_prices(&self, limit: usize) -> Result<Vec<PricePoint>, StoreError>;
}

/// Persistence for news articles
#[async_trait]
pub trait NewsStore: Send + Sync {
    /// Store a batch of articles
    async fn store_articles(&self, articles: &[NewsArticle]) -> Result<(), StoreError>;

    /// The most recently stored articles, newest first
    async fn recent_articles(&self, limit: usize) -> Result<Vec<NewsArticle>, StoreError>;
}

/// In-memory store backing both traits
///
/// Entries are appended in arrival order; recency queries walk the tail.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    prices: Arc<Mutex<Vec<PricePoint>>>,
    articles: Arc<Mutex<Vec<NewsArticle>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PriceStore for MemoryStore {
    async fn record_price(&self, price: f64) -> Result<(), StoreError> {
        let mut prices = self.prices.lock().await;
        prices.push(PricePoint {
            price,
            recorded_at: Utc::now(),
        });
        Ok(())
    }

    async fn recent_prices(&self, limit: usize) -> Result<Vec<PricePoint>, StoreError> {
        let prices = self.prices.lock().await;
        Ok(prices.iter().rev().take(limit).cloned().collect())
    }
}

#[async_trait]
impl NewsStore for MemoryStore {
    async fn store_articles(&self, articles: &[NewsArticle]) -> Result<(), StoreError> {
        let mut stored = self.articles.lock().await;
        stored.extend_from_slice(articles);
        Ok(())
    }

    async fn recent_articles(&self, limit: usize) -> Result<Vec<NewsArticle>, StoreError> {
        let articles = self.articles.lock().await;
        Ok(articles.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_and_query_prices() {
        let store = MemoryStore::new();

        store.record_price(42000.0).await.unwrap();
        store.record_price(43500.0).await.unwrap();
        store.record_price(41000.0).await.unwrap();

        let recent = store.recent_prices(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        // Newest first
        assert_eq!(recent[0].price, 41000.0);
        assert_eq!(recent[1].price, 43500.0);
    }

    #[tokio::test]
    async fn test_recent_prices_limit_exceeds_len() {
        let store = MemoryStore::new();
        store.record_price(100.0).await.unwrap();

        let recent = store.recent_prices(10).await.unwrap();
        assert_eq!(recent.len(), 1);
    }

    #[tokio::test]
    async fn test_store_and_query_articles() {
        let store = MemoryStore::new();

        let articles = vec![
            NewsArticle {
                title: "First".to_string(),
                description: "d1".to_string(),
                url: "https://example.com/1".to_string(),
                published: None,
            },
            NewsArticle {
                title: "Second".to_string(),
                description: "d2".to_string(),
                url: "https://example.com/2".to_string(),
                published: Some("2026-08-28T12:00:00Z".to_string()),
            },
        ];
        store.store_articles(&articles).await.unwrap();

        let recent = store.recent_articles(1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].title, "Second");
    }

    #[tokio::test]
    async fn test_empty_store_queries() {
        let store = MemoryStore::new();
        assert!(store.recent_prices(5).await.unwrap().is_empty());
        assert!(store.recent_articles(5).await.unwrap().is_empty());
    }
}
