use super::request::ItineraryRequest;
use crate::{
    config::PlannerConfig,
    core::{Agent, RunResult},
    error::Result,
    services::{ChatBackend, OpenAIClient},
    tools::{ToolRegistry, WebSearchTool},
};
use std::{sync::Arc, time::Duration};
use tracing::info;

/// Phrase every itinerary must open with
pub const ITINERARY_INTRO: &str = "Here is the itinerary planned for you";

pub const SYSTEM_PROMPT: &str = "You are a world-class travel planning expert. \
Your task is to create a detailed, personalised and exciting travel plan for the user.
Follow these steps:
1. First, use the `web_search` tool to research the user's destination: must-see attractions, local food, signature activities and transport options.
2. Once you believe you have gathered enough information, stop using tools.
3. Finally, based on everything you gathered, write a clearly structured itinerary organised day by day.
4. The itinerary must begin with \"Here is the itinerary planned for you\" followed by the destination and trip length, and must be organised strictly with the headers \"Day 1:\", \"Day 2:\" and so on, one header per day.";

/// Travel-planning agent with a single web search tool
#[derive(Debug, Clone)]
pub struct ItineraryPlanner {
    agent: Agent,
}

impl ItineraryPlanner {
    /// An agent over `backend` whose search tool uses `search_api_key`
    pub fn new(backend: Arc<dyn ChatBackend>, search_api_key: Option<String>) -> Self {
        Self::with_search_tool(backend, WebSearchTool::new(search_api_key))
    }

    pub fn with_search_tool(backend: Arc<dyn ChatBackend>, search: WebSearchTool) -> Self {
        let mut tools = ToolRegistry::new();
        tools.register(search);

        let agent = Agent::new(backend, tools)
            .with_system_prompt(SYSTEM_PROMPT)
            .with_temperature(0.0);

        Self { agent }
    }

    /// Build the chat client and search tool from resolved configuration.
    ///
    /// Fails with every missing credential listed before anything is contacted.
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        let credentials = config.require_credentials()?;

        let client = OpenAIClient::new(credentials.llm_api_key)
            .with_base_url(config.llm_base_url.clone())
            .with_stream(config.stream)
            .with_timeout(config.request_timeout);
        let search =
            WebSearchTool::new(Some(credentials.search_api_key)).with_timeout(config.search_timeout);

        Ok(Self::with_search_tool(Arc::new(client), search)
            .with_model(config.model.clone())
            .with_max_iterations(config.max_iterations)
            .with_timeout(config.request_timeout))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.agent = self.agent.with_model(model);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.agent = self.agent.with_max_iterations(max_iterations);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = self.agent.with_timeout(timeout);
        self
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Generate itinerary text for the request
    pub async fn plan_trip(&self, request: &ItineraryRequest) -> Result<String> {
        self.plan_trip_traced(request)
            .await
            .map(|result| result.output)
    }

    /// Like [`plan_trip`](Self::plan_trip) but keeps the reasoning trace
    pub async fn plan_trip_traced(&self, request: &ItineraryRequest) -> Result<RunResult> {
        info!(
            target: "trip_planner::agent",
            destination = request.destination(),
            days = request.day_count(),
            model = self.agent.model(),
            "planning trip"
        );
        self.agent.run_with_steps(&request.instruction()).await
    }
}
