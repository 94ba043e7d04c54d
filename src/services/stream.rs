//! Folding of Server-Sent Event chat-completion chunks back into one assistant message.

use crate::{
    error::{PlannerError, Result},
    services::backend::AssistantTurn,
    types::result::TokenUsage,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::trace;

#[derive(Debug, Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

/// Accumulates `data:` lines of a streamed completion
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    buffer: Vec<u8>,
    content: String,
    tool_calls: BTreeMap<u64, PartialToolCall>,
    usage: Option<TokenUsage>,
    done: bool,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes as they arrive; complete lines are processed immediately.
    ///
    /// Only whole lines are decoded, so a character split across reads stays intact.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(bytes);
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = decode_line(&line)?;
            self.push_line(line.trim_end_matches(['\r', '\n']))?;
        }
        Ok(())
    }

    /// Process a single SSE line. Comments, blank lines and non-data fields are ignored.
    pub fn push_line(&mut self, line: &str) -> Result<()> {
        let Some(data) = line.strip_prefix("data:") else {
            return Ok(());
        };
        let data = data.trim();
        if data.is_empty() {
            return Ok(());
        }
        if data == "[DONE]" {
            self.done = true;
            return Ok(());
        }

        let chunk: Value = serde_json::from_str(data).map_err(|err| {
            PlannerError::Api(format!("Malformed stream chunk: {err}"))
        })?;
        self.push_chunk(&chunk)
    }

    pub fn push_chunk(&mut self, chunk: &Value) -> Result<()> {
        if let Some(error) = chunk.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(PlannerError::Api(message));
        }

        if let Some(usage) = chunk.get("usage").and_then(TokenUsage::from_value) {
            self.usage = Some(usage);
        }

        let Some(choices) = chunk.get("choices").and_then(Value::as_array) else {
            return Ok(());
        };

        for choice in choices {
            let Some(delta) = choice.get("delta") else {
                continue;
            };

            if let Some(text) = delta.get("content").and_then(Value::as_str) {
                trace!(target: "trip_planner::http", delta = text);
                self.content.push_str(text);
            }

            if let Some(calls) = delta.get("tool_calls").and_then(Value::as_array) {
                for (position, call) in calls.iter().enumerate() {
                    let index = call
                        .get("index")
                        .and_then(Value::as_u64)
                        .unwrap_or(position as u64);
                    let slot = self.tool_calls.entry(index).or_default();

                    if let Some(id) = call.get("id").and_then(Value::as_str) {
                        slot.id.push_str(id);
                    }
                    if let Some(function) = call.get("function") {
                        if let Some(name) = function.get("name").and_then(Value::as_str) {
                            slot.name.push_str(name);
                        }
                        if let Some(arguments) = function.get("arguments").and_then(Value::as_str)
                        {
                            slot.arguments.push_str(arguments);
                        }
                    }
                }
            }
        }

        Ok(())
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Build the assistant message in the non-streaming response shape
    pub fn finish(mut self) -> Result<AssistantTurn> {
        let rest = std::mem::take(&mut self.buffer);
        let rest = decode_line(&rest)?;
        if !rest.trim().is_empty() {
            self.push_line(rest.trim())?;
        }

        let content = if self.content.is_empty() && !self.tool_calls.is_empty() {
            Value::Null
        } else {
            Value::String(std::mem::take(&mut self.content))
        };
        let mut message = json!({
            "role": "assistant",
            "content": content,
        });

        if !self.tool_calls.is_empty() {
            let calls: Vec<Value> = self
                .tool_calls
                .into_values()
                .map(|call| {
                    json!({
                        "id": call.id,
                        "type": "function",
                        "function": {
                            "name": call.name,
                            "arguments": call.arguments
                        }
                    })
                })
                .collect();
            message["tool_calls"] = Value::Array(calls);
        }

        Ok(AssistantTurn::new(message, self.usage))
    }
}

fn decode_line(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes)
        .map_err(|err| PlannerError::Api(format!("Stream line is not valid UTF-8: {err}")))
}
