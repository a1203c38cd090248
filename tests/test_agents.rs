//! Integration tests for the data agents against mocked HTTP services

use agentflow::agents::email::{EmailAgent, MailIdentity, Mailer, MailjetClient, OutgoingEmail};
use agentflow::agents::price::{CoinGeckoClient, PriceAgent, PriceFeed};
use agentflow::agents::search::{BraveSearchClient, NewsSearch};
use agentflow::agents::store::{MemoryStore, NewsArticle, NewsStore, PriceStore};
use agentflow::error::AgentError;
use agentflow::testing::mocks::{MockLlmProvider, MockMailer};
use std::sync::Arc;
use wiremock::matchers::{basic_auth, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_coingecko_client_parses_price() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("ids", "bitcoin"))
        .and(query_param("vs_currencies", "usd"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"bitcoin": {"usd": 64123.45}})),
        )
        .mount(&mock_server)
        .await;

    let client = CoinGeckoClient::with_base_url(mock_server.uri());
    let price = client.fetch_btc_price().await.unwrap();
    assert_eq!(price, 64123.45);
}

#[tokio::test]
async fn test_coingecko_http_error_maps_to_price_feed_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = CoinGeckoClient::with_base_url(mock_server.uri());
    let result = client.fetch_btc_price().await;
    assert!(matches!(result, Err(AgentError::PriceFeedError { .. })));
}

#[tokio::test]
async fn test_price_agent_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"bitcoin": {"usd": 58000.0}})),
        )
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let agent = PriceAgent::new(
        Arc::new(CoinGeckoClient::with_base_url(mock_server.uri())),
        store.clone(),
    );

    let price = agent.fetch_and_store().await.unwrap();
    assert_eq!(price, 58000.0);

    let recorded = store.recent_prices(1).await.unwrap();
    assert_eq!(recorded[0].price, 58000.0);
}

#[tokio::test]
async fn test_brave_client_parses_results() {
    let mock_server = MockServer::start().await;

    let body = serde_json::json!({
        "web": {
            "results": [
                {
                    "title": "Bitcoin hits new high",
                    "description": "Markets react",
                    "url": "https://example.com/btc",
                    "published_time": "2026-08-28T10:00:00Z"
                },
                {
                    "title": "Fed holds rates",
                    "description": "No change",
                    "url": "https://example.com/fed"
                }
            ]
        }
    });

    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .and(query_param("q", "bitcoin news"))
        .and(query_param("count", "5"))
        .and(header("X-Subscription-Token", "brave-test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let client = BraveSearchClient::with_base_url("brave-test-key", 5, mock_server.uri());
    let articles = client.search_news("bitcoin news").await.unwrap();

    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].title, "Bitcoin hits new high");
    assert_eq!(
        articles[0].published.as_deref(),
        Some("2026-08-28T10:00:00Z")
    );
    assert!(articles[1].published.is_none());
}

#[tokio::test]
async fn test_brave_client_missing_web_section_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let client = BraveSearchClient::with_base_url("key", 5, mock_server.uri());
    let articles = client.search_news("anything").await.unwrap();
    assert!(articles.is_empty());
}

#[tokio::test]
async fn test_brave_client_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let client = BraveSearchClient::with_base_url("key", 5, mock_server.uri());
    let result = client.search_news("anything").await;
    assert!(matches!(result, Err(AgentError::SearchError { .. })));
}

fn test_identity() -> MailIdentity {
    MailIdentity {
        sender_email: "bot@example.com".to_string(),
        sender_name: "Finance Bot".to_string(),
        recipient_email: "user@example.com".to_string(),
        recipient_name: "User".to_string(),
    }
}

#[tokio::test]
async fn test_mailjet_client_sends_email() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3.1/send"))
        .and(basic_auth("mj-key", "mj-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Messages": [{"Status": "success"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client =
        MailjetClient::with_base_url("mj-key", "mj-secret", test_identity(), mock_server.uri());

    let email = OutgoingEmail {
        subject: "Daily Financial Market Update".to_string(),
        text_body: "Analysis line one\nline two".to_string(),
        html_body: "Analysis line one<br>line two".to_string(),
    };

    client.send(&email).await.unwrap();
}

#[tokio::test]
async fn test_mailjet_client_maps_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3.1/send"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let client = MailjetClient::with_base_url("bad", "creds", test_identity(), mock_server.uri());

    let email = OutgoingEmail {
        subject: "s".to_string(),
        text_body: "t".to_string(),
        html_body: "t".to_string(),
    };

    let result = client.send(&email).await;
    assert!(matches!(result, Err(AgentError::MailError { .. })));
}

#[tokio::test]
async fn test_email_agent_against_mailjet_mock() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3.1/send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Messages": [{"Status": "success"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store.record_price(60000.0).await.unwrap();

    let mailer = Arc::new(MailjetClient::with_base_url(
        "mj-key",
        "mj-secret",
        test_identity(),
        mock_server.uri(),
    ));
    let provider = Arc::new(MockLlmProvider::single_response("Concise market analysis"));

    let agent = EmailAgent::new(provider, store.clone(), store, mailer, "gpt-4o", "User");
    agent.send_market_update().await.unwrap();
}

#[tokio::test]
async fn test_digest_pipeline_shares_one_store() {
    // The digest runs price, news, and email in one process over a single
    // store; the email's analysis prompt must carry the data the earlier
    // stages gathered
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"bitcoin": {"usd": 57250.0}})),
        )
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());

    let price_agent = PriceAgent::new(
        Arc::new(CoinGeckoClient::with_base_url(mock_server.uri())),
        store.clone(),
    );
    price_agent.fetch_and_store().await.unwrap();

    store
        .store_articles(&[NewsArticle {
            title: "Rate cut chatter lifts risk assets".to_string(),
            description: "Futures reprice the next meeting".to_string(),
            url: "https://example.com/rates".to_string(),
            published: None,
        }])
        .await
        .unwrap();

    let provider = Arc::new(MockLlmProvider::single_response("Digest analysis"));
    let mailer = Arc::new(MockMailer::new());
    let agent = EmailAgent::new(
        provider.clone(),
        store.clone(),
        store,
        mailer.clone(),
        "gpt-4o",
        "User",
    );
    agent.send_market_update().await.unwrap();

    assert_eq!(mailer.sent_emails().await.len(), 1);

    let requests = provider.recorded_requests().await;
    let user_content = &requests[0].messages[1].content;
    assert!(user_content.contains("57250"));
    assert!(user_content.contains("Rate cut chatter lifts risk assets"));
}
