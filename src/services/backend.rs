use crate::{
    error::{PlannerError, Result},
    types::result::TokenUsage,
};
use async_trait::async_trait;
use serde_json::{json, Value};

/// One chat-completion round trip.
///
/// The agent loop only depends on this seam, so the transport (streaming or not) and
/// the provider stay swappable.
#[async_trait]
pub trait ChatBackend: Send + Sync + std::fmt::Debug {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<AssistantTurn>;
}

/// The assistant message produced by one model turn
#[derive(Debug, Clone)]
pub struct AssistantTurn {
    pub message: Value,
    pub usage: Option<TokenUsage>,
}

impl AssistantTurn {
    pub fn new(message: Value, usage: Option<TokenUsage>) -> Self {
        Self { message, usage }
    }

    /// Extract `choices[0].message` from a non-streaming completion body
    pub fn from_completion(response: &Value) -> Result<Self> {
        let choices = response
            .get("choices")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                PlannerError::Api("Missing 'choices' array in completion response".to_string())
            })?;

        let first_choice = choices.first().ok_or_else(|| {
            PlannerError::Api("Completion response contained no choices".to_string())
        })?;

        let message = first_choice.get("message").cloned().ok_or_else(|| {
            PlannerError::Api("Completion response missing assistant message".to_string())
        })?;

        let usage = response.get("usage").and_then(TokenUsage::from_value);

        Ok(Self { message, usage })
    }

    pub fn tool_calls(&self) -> &[Value] {
        self.message
            .get("tool_calls")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn content(&self) -> &str {
        self.message
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or("")
    }
}

#[derive(Clone, Debug)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Value>,
    tools: Vec<Value>,
    tool_choice: Option<Value>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Value>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
            tool_choice: None,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool_choice(mut self, tool_choice: Value) -> Self {
        self.tool_choice = Some(tool_choice);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn messages(&self) -> &[Value] {
        &self.messages
    }

    pub fn tools(&self) -> &[Value] {
        &self.tools
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    pub fn to_value(&self) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.messages,
        });

        if !self.tools.is_empty() {
            body["tools"] = Value::Array(self.tools.clone());
        }

        if let Some(tool_choice) = &self.tool_choice {
            body["tool_choice"] = tool_choice.clone();
        }

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }

        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_includes_optional_fields_only_when_set() {
        let bare = ChatCompletionRequest::new("qwen-max", vec![]).to_value();
        assert!(bare.get("tools").is_none());
        assert!(bare.get("temperature").is_none());

        let full = ChatCompletionRequest::new("qwen-max", vec![json!({"role": "user"})])
            .with_tools(vec![json!({"type": "function"})])
            .with_tool_choice(json!("auto"))
            .with_temperature(0.0)
            .with_max_tokens(Some(512))
            .to_value();
        assert_eq!(full["tool_choice"], "auto");
        assert_eq!(full["temperature"], 0.0);
        assert_eq!(full["max_tokens"], 512);
        assert_eq!(full["tools"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn turn_is_extracted_from_completion_body() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "Day 1: Arrive"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        });
        let turn = AssistantTurn::from_completion(&body).unwrap();
        assert_eq!(turn.content(), "Day 1: Arrive");
        assert!(turn.tool_calls().is_empty());
        assert_eq!(turn.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn empty_choices_is_an_api_error() {
        let err = AssistantTurn::from_completion(&json!({"choices": []})).unwrap_err();
        assert_eq!(err.error_code(), "API_ERROR");
    }
}
