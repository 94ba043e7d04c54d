use crate::{
    services::backend::{ChatBackend, ChatCompletionRequest},
    tools::ToolRegistry,
};
use serde_json::json;
use std::{sync::Arc, time::Duration};

pub const DEFAULT_MODEL: &str = "qwen-max";

/// Tool-calling agent over a chat-completion backend
#[derive(Debug, Clone)]
pub struct Agent {
    backend: Arc<dyn ChatBackend>,
    tools: Arc<ToolRegistry>,
    system_prompt: Option<String>,
    model: String,
    temperature: Option<f32>,
    max_iterations: usize,
    max_tokens: Option<u32>,
    timeout: Duration,
}

impl Agent {
    pub fn new(backend: Arc<dyn ChatBackend>, tools: ToolRegistry) -> Self {
        Self {
            backend,
            tools: Arc::new(tools),
            system_prompt: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_iterations: 10,
            max_tokens: None,
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Upper bound for a single model call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    pub(crate) fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn backend(&self) -> &dyn ChatBackend {
        self.backend.as_ref()
    }

    /// Build the request for the next model turn
    pub(crate) fn build_request(
        &self,
        messages: Vec<serde_json::Value>,
    ) -> ChatCompletionRequest {
        let mut request = ChatCompletionRequest::new(self.model.clone(), messages)
            .with_max_tokens(self.max_tokens);

        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }

        let tools = self.tools.to_openai_tools();
        if !tools.is_empty() {
            request = request.with_tools(tools).with_tool_choice(json!("auto"));
        }

        request
    }
}
