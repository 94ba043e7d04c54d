#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::{collections::VecDeque, sync::Mutex};
use trip_planner_rs::{
    error::{PlannerError, Result},
    services::{AssistantTurn, ChatBackend, ChatCompletionRequest},
    TokenUsage,
};

/// Replays canned model turns in order and records every request it receives
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    turns: Mutex<VecDeque<Result<AssistantTurn>>>,
    requests: Mutex<Vec<ChatCompletionRequest>>,
}

impl ScriptedBackend {
    pub fn new(turns: Vec<Result<AssistantTurn>>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.turns.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<AssistantTurn> {
        self.requests.lock().unwrap().push(request.clone());
        self.turns
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PlannerError::Api("script exhausted".to_string())))
    }
}

fn usage() -> Option<TokenUsage> {
    Some(TokenUsage {
        prompt_tokens: 10,
        completion_tokens: 5,
        total_tokens: 15,
    })
}

/// A turn asking for one tool call with raw JSON `arguments`
pub fn tool_call_turn(id: &str, name: &str, arguments: &str) -> Result<AssistantTurn> {
    Ok(AssistantTurn::new(
        json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": id,
                "type": "function",
                "function": { "name": name, "arguments": arguments }
            }]
        }),
        usage(),
    ))
}

pub fn answer_turn(content: &str) -> Result<AssistantTurn> {
    Ok(AssistantTurn::new(
        json!({ "role": "assistant", "content": content }),
        usage(),
    ))
}

/// Messages with `role == "tool"` in a recorded request
pub fn tool_messages(request: &ChatCompletionRequest) -> Vec<Value> {
    request
        .messages()
        .iter()
        .filter(|message| message["role"] == "tool")
        .cloned()
        .collect()
}

pub const TOKYO_ITINERARY: &str = "Here is the itinerary planned for you: Tokyo, 3 days.\n\
Day 1: Asakusa and Senso-ji in the morning, Ueno park in the afternoon.\n\
Day 2: Tsukiji outer market breakfast, teamLab, evening in Ginza.\n\
Day 3: Meiji shrine, Harajuku and a last dinner in Shibuya.";

pub fn serp_body() -> Value {
    json!({
        "search_metadata": { "status": "Success" },
        "organic_results": [
            {
                "title": "Senso-ji Temple",
                "link": "https://example.com/sensoji",
                "snippet": "Tokyo's oldest temple in Asakusa."
            },
            {
                "title": "Tsukiji Outer Market",
                "link": "https://example.com/tsukiji",
                "snippet": "Street food and fresh seafood."
            }
        ]
    })
}
