use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single step in the agent's reasoning trace
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStep {
    /// Instruction handed to the agent
    Task { content: String },
    /// The model asked for a tool call
    Action {
        tool_name: String,
        tool_call_id: String,
        arguments: Value,
    },
    /// Tool output fed back to the model
    Observation {
        tool_call_id: String,
        result: String,
        is_error: bool,
    },
    /// Plain assistant reply that ends the run
    FinalAnswer { answer: String },
}

impl AgentStep {
    /// Convert step to chat-completion message format
    pub fn to_message(&self) -> Value {
        match self {
            AgentStep::Task { content } => serde_json::json!({
                "role": "user",
                "content": content
            }),
            AgentStep::Action {
                tool_name,
                tool_call_id,
                arguments,
            } => {
                let arguments = match arguments {
                    Value::String(raw) => raw.clone(),
                    other => other.to_string(),
                };
                serde_json::json!({
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": tool_call_id,
                        "type": "function",
                        "function": {
                            "name": tool_name,
                            "arguments": arguments
                        }
                    }]
                })
            }
            AgentStep::Observation {
                tool_call_id,
                result,
                ..
            } => serde_json::json!({
                "role": "tool",
                "tool_call_id": tool_call_id,
                "content": result
            }),
            AgentStep::FinalAnswer { answer } => serde_json::json!({
                "role": "assistant",
                "content": answer
            }),
        }
    }

    /// Human-readable one-liner used in logs and replays
    pub fn describe(&self) -> String {
        match self {
            AgentStep::Task { content } => format!("🧭 Task: {}", content),
            AgentStep::Action {
                tool_name,
                arguments,
                ..
            } => format!("🔧 Action: {}({})", tool_name, arguments),
            AgentStep::Observation {
                result, is_error, ..
            } => {
                if *is_error {
                    format!("❌ Error: {}", result)
                } else {
                    format!("👁 Observation: {}", result)
                }
            }
            AgentStep::FinalAnswer { answer } => format!("✅ Final Answer: {}", answer),
        }
    }
}
