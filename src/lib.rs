//! trip-planner-rs: an LLM travel-planning agent with web search and iCalendar export
//!
//! An [`ItineraryPlanner`] drives a tool-calling agent over an OpenAI-compatible chat
//! completion API. The agent researches the destination through SerpAPI and answers with a
//! day-by-day itinerary, which [`calendar::convert`] turns into an all-day-event `.ics` file.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use trip_planner_rs::{calendar, ItineraryPlanner, ItineraryRequest, PlannerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PlannerConfig::from_env()?;
//!     let planner = ItineraryPlanner::from_config(&config)?;
//!
//!     let request = ItineraryRequest::new("Tokyo", 3, Some("food, temples".to_string()))?;
//!     let itinerary = planner.plan_trip(&request).await?;
//!     println!("{}", itinerary);
//!
//!     let ics = calendar::convert(&itinerary, None)?;
//!     std::fs::write(calendar::download_file_name(request.destination()), ics)?;
//!     Ok(())
//! }
//! ```

pub mod calendar;
pub mod config;
pub mod core;
pub mod error;
pub mod itinerary;
pub mod server;
pub mod services;
pub mod session;
pub mod tools;
pub mod types;

pub use config::PlannerConfig;
pub use core::{Agent, AgentMemory, AgentStep, RunResult, TokenUsage, ToolCall, ToolOutput};
pub use error::{PlannerError, Result};
pub use itinerary::{ItineraryPlanner, ItineraryRequest};
pub use services::{ChatBackend, OpenAIClient};
pub use session::{SessionStore, TripSession};
pub use tools::{Tool, ToolRegistry, WebSearchTool};

#[cfg(feature = "cli")]
pub mod cli;
