use super::{Tool, ToolFuture};
use crate::error::PlannerError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub const SERPAPI_ENDPOINT: &str = "https://serpapi.com/search";
pub const SEARCH_ENGINE: &str = "google";
pub const MAX_RESULTS: usize = 5;

pub const MISSING_KEY_MESSAGE: &str = "Error: SerpAPI key is not set.";
pub const NO_RESULTS_MESSAGE: &str = "No relevant information found.";

const DEFAULT_TITLE: &str = "No title";
const DEFAULT_LINK: &str = "#";
const DEFAULT_SNIPPET: &str = "No snippet available.";

/// Parameters accepted by the web search tool
#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct WebSearchParams {
    /// Free-text search query, e.g. "best ramen in Shinjuku"
    pub query: String,
}

/// One organic search result as shown to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSnippet {
    pub title: String,
    pub link: String,
    pub summary: String,
}

impl SearchSnippet {
    fn from_result(result: &Value) -> Self {
        let field = |name: &str, default: &str| {
            result
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or(default)
                .to_string()
        };
        Self {
            title: field("title", DEFAULT_TITLE),
            link: field("link", DEFAULT_LINK),
            summary: field("snippet", DEFAULT_SNIPPET),
        }
    }

    fn render(&self) -> String {
        format!(
            "Title: {}\nLink: {}\nSummary: {}\n---",
            self.title, self.link, self.summary
        )
    }
}

/// SerpAPI-backed search.
///
/// Every failure is reported as text so the agent keeps reasoning on it.
#[derive(Debug, Clone)]
pub struct WebSearchTool {
    api_key: Option<String>,
    endpoint: String,
    timeout: Duration,
    client: Client,
}

impl WebSearchTool {
    /// An empty key counts as missing
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            endpoint: SERPAPI_ENDPOINT.to_string(),
            timeout: Duration::from_secs(20),
            client: Client::new(),
        }
    }

    /// Build the tool from `SERP_API_KEY`, which may be unset
    pub fn from_env() -> Self {
        Self::new(std::env::var("SERP_API_KEY").ok())
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Run one query and return the text block handed to the model
    pub async fn search(&self, query: &str) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!(target: "trip_planner::search", "search skipped, no API key");
            return MISSING_KEY_MESSAGE.to_string();
        };

        debug!(target: "trip_planner::search", query, "searching");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("api_key", api_key), ("engine", SEARCH_ENGINE)])
            .timeout(self.timeout)
            .send()
            .await;

        let response = match response.and_then(|response| response.error_for_status()) {
            Ok(response) => response,
            Err(err) => {
                let reason = if err.is_timeout() {
                    format!("timed out after {:?}", self.timeout)
                } else {
                    // the request URL carries the API key
                    err.without_url().to_string()
                };
                warn!(target: "trip_planner::search", %reason, "search request failed");
                return format!("Search request failed: {reason}");
            }
        };

        match response.json::<Value>().await {
            Ok(body) => format_results(&body),
            Err(err) => format!(
                "Failed to process search results: {}",
                err.without_url()
            ),
        }
    }
}

/// Extract up to [`MAX_RESULTS`] organic results
pub fn extract_snippets(body: &Value) -> Vec<SearchSnippet> {
    body.get("organic_results")
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .take(MAX_RESULTS)
                .map(SearchSnippet::from_result)
                .collect()
        })
        .unwrap_or_default()
}

/// Render a SerpAPI response body as newline-delimited text
pub fn format_results(body: &Value) -> String {
    let snippets = extract_snippets(body);
    if snippets.is_empty() {
        return NO_RESULTS_MESSAGE.to_string();
    }

    snippets
        .iter()
        .map(SearchSnippet::render)
        .collect::<Vec<_>>()
        .join("\n")
}

impl Tool for WebSearchTool {
    fn name(&self) -> &'static str {
        "web_search"
    }

    fn description(&self) -> &'static str {
        "Search the web for up-to-date information about places, attractions, food, activities, events and transport. Returns the top results as text."
    }

    fn parameters_schema(&self) -> Value {
        let schema = schemars::schema_for!(WebSearchParams);
        serde_json::to_value(&schema.schema).unwrap_or_else(|_| {
            serde_json::json!({
                "type": "object",
                "properties": { "query": { "type": "string" } },
                "required": ["query"]
            })
        })
    }

    fn execute(&self, parameters: Value) -> ToolFuture<'_> {
        Box::pin(async move {
            let params: WebSearchParams = serde_json::from_value(parameters).map_err(|err| {
                PlannerError::ToolExecution(format!("Invalid parameters for web_search: {}", err))
            })?;

            Ok(Value::String(self.search(&params.query).await))
        })
    }
}
