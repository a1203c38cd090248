//! News search agent
//!
//! The model is handed a `search_news` tool and asked to produce search
//! queries for crypto and macro news. Both queries run against Brave Search
//! and the combined results land in the news store.

use crate::agents::store::{NewsArticle, NewsStore};
use crate::error::{AgentError, AgentResult};
use crate::llm::provider::{CompletionRequest, LlmProvider, Message, ToolDescription};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Instrument};

const DEFAULT_BASE_URL: &str = "https://api.search.brave.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Delay between consecutive searches to respect the API rate limit
const SEARCH_SPACING: Duration = Duration::from_millis(1100);

/// Source of news search results
#[async_trait]
pub trait NewsSearch: Send + Sync {
    async fn search_news(&self, query: &str) -> AgentResult<Vec<NewsArticle>>;
}

/// Brave Search web API client
#[derive(Debug, Clone)]
pub struct BraveSearchClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    result_count: u32,
}

#[derive(Debug, Deserialize)]
struct BraveSearchResponse {
    web: Option<BraveWebResults>,
}

#[derive(Debug, Deserialize)]
struct BraveWebResults {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    url: String,
    published_time: Option<String>,
}

impl BraveSearchClient {
    pub fn new(api_key: impl Into<String>, result_count: u32) -> Self {
        Self::with_base_url(api_key, result_count, DEFAULT_BASE_URL)
    }

    /// Override the API endpoint, used by tests against a local mock server
    pub fn with_base_url(
        api_key: impl Into<String>,
        result_count: u32,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            result_count,
        }
    }
}

#[async_trait]
impl NewsSearch for BraveSearchClient {
    async fn search_news(&self, query: &str) -> AgentResult<Vec<NewsArticle>> {
        info!(query, "Searching Brave News");

        let url = format!("{}/res/v1/web/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("count", &self.result_count.to_string())])
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .send()
            .await
            .map_err(|e| AgentError::search(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AgentError::search(format!(
                "Brave Search API error: {}",
                response.status()
            )));
        }

        let data: BraveSearchResponse = response
            .json()
            .await
            .map_err(|e| AgentError::search(format!("Invalid response body: {e}")))?;

        let articles: Vec<NewsArticle> = data
            .web
            .map(|web| web.results)
            .unwrap_or_default()
            .into_iter()
            .map(|result| NewsArticle {
                title: result.title,
                description: result.description,
                url: result.url,
                published: result.published_time,
            })
            .collect();

        info!(count = articles.len(), "Found news articles");
        Ok(articles)
    }
}

/// Arguments the model passes to the `search_news` tool
#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
}

/// Asks the model for search queries, runs them, and stores the results
pub struct SearchAgent {
    provider: Arc<dyn LlmProvider>,
    search: Arc<dyn NewsSearch>,
    store: Arc<dyn NewsStore>,
    model: String,
}

impl SearchAgent {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        search: Arc<dyn NewsSearch>,
        store: Arc<dyn NewsStore>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            search,
            store,
            model: model.into(),
        }
    }

    fn search_tool() -> ToolDescription {
        ToolDescription {
            name: "search_news".to_string(),
            description: "Search for latest news, including finance and crypto news".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query for news"
                    }
                },
                "required": ["query"],
                "additionalProperties": false
            }),
        }
    }

    /// Ask the model to generate one search query via the tool
    async fn generate_query(&self, prompt: String) -> AgentResult<String> {
        let request = CompletionRequest {
            messages: vec![Message::user(prompt)],
            model: self.model.clone(),
            max_tokens: None,
            temperature: None,
            tools: Some(vec![Self::search_tool()]),
            tool_choice: None,
        };

        let response = self.provider.complete(request).await?;
        let call = response
            .tool_calls
            .and_then(|calls| calls.into_iter().next())
            .ok_or_else(|| AgentError::invalid_response("No tool call received from provider"))?;

        let args: SearchArgs = serde_json::from_value(call.arguments)
            .map_err(|e| AgentError::invalid_response(format!("Bad tool arguments: {e}")))?;

        info!(query = %args.query, "Generated search query");
        Ok(args.query)
    }

    /// Generate crypto and finance queries, search both, and store the results
    pub async fn find_and_store_news(&self) -> AgentResult<Vec<NewsArticle>> {
        let span = crate::agent_span!(agent = "search");
        async {
            let now = chrono::Utc::now().to_rfc3339();

            let crypto_query = self
                .generate_query(format!(
                    "Find the latest important cryptocurrency and Bitcoin news. Generate a \
                     search query that will help find relevant recent news. Time now is {now}."
                ))
                .await?;
            let finance_query = self
                .generate_query(format!(
                    "Find the latest important finance and macroeconomic news. Generate a \
                     search query that will help find relevant recent news. Time now is {now}."
                ))
                .await?;

            let mut all_results = self.search.search_news(&crypto_query).await?;
            // Space requests out to stay under the search API rate limit
            tokio::time::sleep(SEARCH_SPACING).await;
            let finance_results = self.search.search_news(&finance_query).await?;
            all_results.extend(finance_results);

            self.store.store_articles(&all_results).await?;
            info!(count = all_results.len(), "Stored news articles");

            Ok(all_results)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::store::MemoryStore;
    use crate::llm::provider::ToolCall;
    use crate::testing::mocks::MockLlmProvider;
    use tokio::sync::Mutex;

    struct RecordingSearch {
        queries: Mutex<Vec<String>>,
        results: Vec<NewsArticle>,
    }

    impl RecordingSearch {
        fn with_results(results: Vec<NewsArticle>) -> Self {
            Self {
                queries: Mutex::new(Vec::new()),
                results,
            }
        }
    }

    #[async_trait]
    impl NewsSearch for RecordingSearch {
        async fn search_news(&self, query: &str) -> AgentResult<Vec<NewsArticle>> {
            self.queries.lock().await.push(query.to_string());
            Ok(self.results.clone())
        }
    }

    fn article(title: &str) -> NewsArticle {
        NewsArticle {
            title: title.to_string(),
            description: "desc".to_string(),
            url: "https://example.com".to_string(),
            published: None,
        }
    }

    fn query_tool_call(query: &str) -> ToolCall {
        ToolCall {
            id: format!("call_{query}"),
            name: "search_news".to_string(),
            arguments: json!({ "query": query }),
        }
    }

    #[tokio::test]
    async fn test_find_and_store_news_runs_both_searches() {
        tokio::time::pause();

        let provider = Arc::new(MockLlmProvider::with_tool_calls(vec![
            vec![query_tool_call("bitcoin news")],
            vec![query_tool_call("macro news")],
        ]));
        let search = Arc::new(RecordingSearch::with_results(vec![article("A")]));
        let store = Arc::new(MemoryStore::new());

        let agent = SearchAgent::new(provider.clone(), search.clone(), store.clone(), "gpt-4o");
        let results = agent.find_and_store_news().await.unwrap();

        // One result per search
        assert_eq!(results.len(), 2);

        let queries = search.queries.lock().await.clone();
        assert_eq!(queries, vec!["bitcoin news", "macro news"]);

        let stored = store.recent_articles(10).await.unwrap();
        assert_eq!(stored.len(), 2);

        // Both query-generation requests carried the tool schema
        let requests = provider.recorded_requests().await;
        assert_eq!(requests.len(), 2);
        for request in &requests {
            let tools = request.tools.as_ref().expect("Tools should be attached");
            assert_eq!(tools[0].name, "search_news");
        }
    }

    #[tokio::test]
    async fn test_missing_tool_call_is_error() {
        let provider = Arc::new(MockLlmProvider::single_response("no tools here"));
        let search = Arc::new(RecordingSearch::with_results(vec![]));
        let store = Arc::new(MemoryStore::new());

        let agent = SearchAgent::new(provider, search.clone(), store, "gpt-4o");
        let result = agent.find_and_store_news().await;

        assert!(matches!(result, Err(AgentError::InvalidResponse { .. })));
        // No search should run when query generation fails
        assert!(search.queries.lock().await.is_empty());
    }
}
