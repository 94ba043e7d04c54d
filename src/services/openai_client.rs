use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::{
    error::{PlannerError, Result},
    services::{
        backend::{AssistantTurn, ChatBackend, ChatCompletionRequest},
        stream::StreamAccumulator,
    },
};

pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
const MAX_RETRIES: usize = 3;

/// Client for any OpenAI-compatible `/chat/completions` endpoint
#[derive(Clone, Debug)]
pub struct OpenAIClient {
    api_key: String,
    base_url: String,
    stream: bool,
    timeout: Duration,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            stream: true,
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// HTTP-level timeout for a whole request, body included
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_streaming(&self) -> bool {
        self.stream
    }

    fn request_body(&self, request: &ChatCompletionRequest) -> Value {
        let mut body = request.to_value();
        if self.stream {
            body["stream"] = json!(true);
            body["stream_options"] = json!({ "include_usage": true });
        }
        body
    }

    /// POST the body, retrying rate limits and server errors with backoff
    async fn send_with_retries(&self, body: &Value) -> Result<Response> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| PlannerError::Http(format!("Failed to build HTTP client: {err}")))?;

        let request_url = build_chat_url(&self.base_url);
        let mut attempt = 0;
        let mut backoff = Duration::from_millis(250);

        loop {
            let response = client
                .post(&request_url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(body)
                .send()
                .await
                .map_err(|err| {
                    if err.is_timeout() {
                        PlannerError::Timeout(format!("chat completion request: {err}"))
                    } else {
                        PlannerError::Http(err.to_string())
                    }
                })?;

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<u64>().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(backoff);

                if attempt < MAX_RETRIES {
                    warn!(target: "trip_planner::http", attempt, ?retry_after, "rate limited, retrying");
                    tokio::time::sleep(retry_after).await;
                    attempt += 1;
                    backoff *= 2;
                    continue;
                }

                return Err(PlannerError::RateLimit {
                    retry_after: retry_after.as_secs().max(1),
                });
            }

            if status.is_server_error() && attempt < MAX_RETRIES {
                warn!(target: "trip_planner::http", attempt, %status, "server error, retrying");
                tokio::time::sleep(backoff).await;
                attempt += 1;
                backoff *= 2;
                continue;
            }

            if !status.is_success() {
                let response_text = response.text().await.unwrap_or_default();
                let api_message = serde_json::from_str::<Value>(&response_text)
                    .ok()
                    .and_then(|json| {
                        json.get("error")
                            .and_then(|error| error.get("message"))
                            .and_then(Value::as_str)
                            .map(str::to_string)
                    })
                    .unwrap_or(response_text);

                return Err(PlannerError::Api(format!(
                    "HTTP {} error: {}",
                    status, api_message
                )));
            }

            return Ok(response);
        }
    }

    async fn read_blocking(response: Response) -> Result<AssistantTurn> {
        let response_text = response
            .text()
            .await
            .map_err(|err| PlannerError::Http(format!("Failed to read response: {err}")))?;

        let response_json: Value = serde_json::from_str(&response_text)
            .map_err(|err| PlannerError::Api(format!("Failed to parse JSON: {err}")))?;

        if let Some(error) = response_json.get("error") {
            let error_message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(PlannerError::Api(error_message));
        }

        AssistantTurn::from_completion(&response_json)
    }

    async fn read_stream(response: Response) -> Result<AssistantTurn> {
        let mut accumulator = StreamAccumulator::new();
        let mut bytes = response.bytes_stream();

        while let Some(chunk) = bytes.next().await {
            let chunk = chunk.map_err(|err| {
                if err.is_timeout() {
                    PlannerError::Timeout(format!("chat completion stream: {err}"))
                } else {
                    PlannerError::Http(format!("Stream interrupted: {err}"))
                }
            })?;
            accumulator.push_bytes(&chunk)?;
            if accumulator.is_done() {
                break;
            }
        }

        accumulator.finish()
    }
}

#[async_trait]
impl ChatBackend for OpenAIClient {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<AssistantTurn> {
        let body = self.request_body(request);
        debug!(
            target: "trip_planner::http",
            model = request.model(),
            messages = request.messages().len(),
            stream = self.stream,
            "sending chat completion"
        );

        let response = self.send_with_retries(&body).await?;
        if self.stream {
            Self::read_stream(response).await
        } else {
            Self::read_blocking(response).await
        }
    }
}

fn build_chat_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{}/chat/completions", trimmed)
    }
}
