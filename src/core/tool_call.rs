use crate::error::{PlannerError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};

/// A tool call requested by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Parse a `tool_calls[]` entry from an assistant message.
    ///
    /// Arguments arrive as a JSON-encoded string; an empty string means no arguments.
    pub fn from_openai_format(tool_call: &Value) -> Result<Self> {
        let id = raw_id(tool_call).to_string();
        let function = tool_call
            .get("function")
            .ok_or_else(|| PlannerError::InvalidFunctionCall("Tool call missing function".into()))?;

        let name = function
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                PlannerError::InvalidFunctionCall("Tool call missing function name".into())
            })?
            .to_string();

        let raw_arguments = raw_arguments(tool_call);
        let arguments = if raw_arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(raw_arguments).map_err(|err| {
                PlannerError::InvalidFunctionCall(format!(
                    "Failed to parse arguments for tool '{}': {}",
                    name, err
                ))
            })?
        };

        Ok(Self {
            id,
            name,
            arguments,
        })
    }

    pub fn describe(&self) -> String {
        format!("{}({})", self.name, self.arguments)
    }
}

/// `id` of a raw tool call, empty when absent
pub fn raw_id(tool_call: &Value) -> &str {
    tool_call
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
}

/// Unparsed `function.name` of a raw tool call
pub fn raw_name(tool_call: &Value) -> &str {
    tool_call
        .get("function")
        .and_then(|f| f.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("unknown")
}

/// Unparsed `function.arguments` of a raw tool call
pub fn raw_arguments(tool_call: &Value) -> &str {
    tool_call
        .get("function")
        .and_then(|f| f.get("arguments"))
        .and_then(Value::as_str)
        .unwrap_or("")
}

/// Output of one tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub tool_name: String,
    pub output: Value,
    pub is_error: bool,
    pub duration_ms: Option<u128>,
}

impl ToolOutput {
    pub fn success(tool_call_id: String, tool_name: String, output: Value) -> Self {
        Self {
            tool_call_id,
            tool_name,
            output,
            is_error: false,
            duration_ms: None,
        }
    }

    pub fn error(tool_call_id: String, tool_name: String, error: &PlannerError) -> Self {
        Self {
            tool_call_id,
            tool_name,
            output: error.to_error_payload(),
            is_error: true,
            duration_ms: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = Some(duration.as_millis());
        self
    }

    /// Text handed back to the model. Plain strings pass through unquoted.
    pub fn as_string(&self) -> String {
        match &self.output {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Tracks the execution of a tool call with timing information
#[derive(Debug)]
pub struct ToolExecution {
    pub tool_call: ToolCall,
    start_time: Instant,
}

impl ToolExecution {
    pub fn start(tool_call: ToolCall) -> Self {
        Self {
            tool_call,
            start_time: Instant::now(),
        }
    }

    pub fn finish(self, result: Result<Value>) -> ToolOutput {
        let duration = self.start_time.elapsed();
        let ToolCall { id, name, .. } = self.tool_call;
        match result {
            Ok(output) => ToolOutput::success(id, name, output),
            Err(err) => ToolOutput::error(id, name, &err),
        }
        .with_duration(duration)
    }
}
