//! Standalone data agents: price feed, news search, and email dispatch
//!
//! Unlike the workflow patterns, agents talk to external services and
//! propagate failures as [`AgentError`](crate::error::AgentError) so callers
//! can decide how to react.

pub mod email;
pub mod price;
pub mod search;
pub mod store;

pub use email::{EmailAgent, MailIdentity, Mailer, MailjetClient, OutgoingEmail};
pub use price::{CoinGeckoClient, PriceAgent, PriceFeed};
pub use search::{BraveSearchClient, NewsSearch, SearchAgent};
pub use store::{MemoryStore, NewsArticle, NewsStore, PricePoint, PriceStore, StoreError};
