//! Market update email agent
//!
//! Pulls recent news and price history from the stores, asks the model for a
//! short analyst write-up, and delivers it through Mailjet.

use crate::agents::store::{NewsStore, PriceStore};
use crate::error::{AgentError, AgentResult};
use crate::llm::provider::{CompletionRequest, LlmProvider, Message};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Instrument};

const DEFAULT_BASE_URL: &str = "https://api.mailjet.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const EMAIL_SUBJECT: &str = "Daily Financial Market Update";

const ANALYST_SYSTEM_PROMPT: &str = "You are a professional financial analyst. Write a very concise email analyzing the latest market events and Bitcoin price movements. Focus on key correlations and important insights. Keep it short and professional.";

/// How many recent articles feed the analysis
const NEWS_WINDOW: usize = 10;
/// How many recent price points feed the analysis
const PRICE_WINDOW: usize = 7;

/// A rendered email ready for delivery
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Email delivery backend
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> AgentResult<()>;
}

/// Sender and recipient identity for outgoing mail
#[derive(Debug, Clone)]
pub struct MailIdentity {
    pub sender_email: String,
    pub sender_name: String,
    pub recipient_email: String,
    pub recipient_name: String,
}

/// Mailjet v3.1 send API client
#[derive(Debug, Clone)]
pub struct MailjetClient {
    client: reqwest::Client,
    api_key: String,
    api_secret: String,
    base_url: String,
    identity: MailIdentity,
}

impl MailjetClient {
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        identity: MailIdentity,
    ) -> Self {
        Self::with_base_url(api_key, api_secret, identity, DEFAULT_BASE_URL)
    }

    /// Override the API endpoint, used by tests against a local mock server
    pub fn with_base_url(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        identity: MailIdentity,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            base_url: base_url.into(),
            identity,
        }
    }
}

#[async_trait]
impl Mailer for MailjetClient {
    async fn send(&self, email: &OutgoingEmail) -> AgentResult<()> {
        let payload = json!({
            "Messages": [{
                "From": {
                    "Email": self.identity.sender_email,
                    "Name": self.identity.sender_name,
                },
                "To": [{
                    "Email": self.identity.recipient_email,
                    "Name": self.identity.recipient_name,
                }],
                "Subject": email.subject,
                "TextPart": email.text_body,
                "HTMLPart": email.html_body,
            }]
        });

        let response = self
            .client
            .post(format!("{}/v3.1/send", self.base_url))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AgentError::mail(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AgentError::mail(format!(
                "Mailjet API error: {}",
                response.status()
            )));
        }

        info!("Email sent successfully");
        Ok(())
    }
}

/// Assembles and delivers the daily market update
pub struct EmailAgent {
    provider: Arc<dyn LlmProvider>,
    news: Arc<dyn NewsStore>,
    prices: Arc<dyn PriceStore>,
    mailer: Arc<dyn Mailer>,
    model: String,
    recipient_name: String,
}

impl EmailAgent {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        news: Arc<dyn NewsStore>,
        prices: Arc<dyn PriceStore>,
        mailer: Arc<dyn Mailer>,
        model: impl Into<String>,
        recipient_name: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            news,
            prices,
            mailer,
            model: model.into(),
            recipient_name: recipient_name.into(),
        }
    }

    /// Build the analysis context from recent store contents
    async fn gather_context(&self) -> AgentResult<serde_json::Value> {
        let news = self.news.recent_articles(NEWS_WINDOW).await?;
        let recent = self.prices.recent_prices(PRICE_WINDOW).await?;

        let latest = recent.first().cloned();
        // Chronological order for the trend description
        let mut history = recent;
        history.reverse();

        Ok(json!({
            "news": news,
            "btcPrice": latest,
            "btcPrices": history,
        }))
    }

    async fn generate_content(&self, context: &serde_json::Value) -> AgentResult<String> {
        let request = CompletionRequest::text(
            self.model.clone(),
            vec![
                Message::system(ANALYST_SYSTEM_PROMPT),
                Message::user(format!(
                    "Latest data: {context}. Write a short, professional analysis email for {}.",
                    self.recipient_name
                )),
            ],
        );

        let response = self.provider.complete(request).await?;
        response
            .content
            .ok_or_else(|| AgentError::invalid_response("Empty completion content"))
    }

    /// Gather data, generate the analysis, and send the email
    pub async fn send_market_update(&self) -> AgentResult<()> {
        let span = crate::agent_span!(agent = "email");
        async {
            let context = self.gather_context().await?;
            info!("Retrieved latest market data");

            let content = self.generate_content(&context).await?;
            info!("Generated analysis content");

            let email = OutgoingEmail {
                subject: EMAIL_SUBJECT.to_string(),
                html_body: content.replace('\n', "<br>"),
                text_body: content,
            };

            self.mailer.send(&email).await
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::store::{MemoryStore, NewsArticle};
    use crate::llm::provider::MessageRole;
    use crate::testing::mocks::{MockLlmProvider, MockMailer};

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.record_price(61000.0).await.unwrap();
        store.record_price(62500.0).await.unwrap();
        store
            .store_articles(&[NewsArticle {
                title: "Markets rally".to_string(),
                description: "Broad gains".to_string(),
                url: "https://example.com/rally".to_string(),
                published: None,
            }])
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_send_market_update() {
        let store = seeded_store().await;
        let provider = Arc::new(MockLlmProvider::single_response(
            "Bitcoin climbed on strong volume.\nWatch resistance at 63k.",
        ));
        let mailer = Arc::new(MockMailer::new());

        let agent = EmailAgent::new(
            provider.clone(),
            store.clone(),
            store,
            mailer.clone(),
            "gpt-4o",
            "Alex",
        );
        agent.send_market_update().await.unwrap();

        let sent = mailer.sent_emails().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Daily Financial Market Update");
        assert!(sent[0].text_body.contains("Bitcoin climbed"));
        // Newlines become line breaks in the HTML part
        assert!(sent[0].html_body.contains("<br>"));

        // The analyst prompt carries the gathered data and the recipient name
        let requests = provider.recorded_requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages[0].role, MessageRole::System);
        let user_content = &requests[0].messages[1].content;
        assert!(user_content.contains("Markets rally"));
        assert!(user_content.contains("Alex"));
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let store = seeded_store().await;
        let mailer = Arc::new(MockMailer::new());
        let agent = EmailAgent::new(
            Arc::new(MockLlmProvider::with_failure()),
            store.clone(),
            store,
            mailer.clone(),
            "gpt-4o",
            "Alex",
        );

        let result = agent.send_market_update().await;
        assert!(matches!(result, Err(AgentError::Llm(_))));
        assert!(mailer.sent_emails().await.is_empty());
    }

    #[tokio::test]
    async fn test_mailer_failure_propagates() {
        let store = seeded_store().await;
        let agent = EmailAgent::new(
            Arc::new(MockLlmProvider::single_response("Analysis")),
            store.clone(),
            store,
            Arc::new(MockMailer::with_failure()),
            "gpt-4o",
            "Alex",
        );

        let result = agent.send_market_update().await;
        assert!(matches!(result, Err(AgentError::MailError { .. })));
    }
}
