use crate::error::{PlannerError, Result};
use serde::Serialize;

pub const MIN_DAYS: u32 = 1;
pub const MAX_DAYS: u32 = 30;

/// A validated trip request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItineraryRequest {
    destination: String,
    day_count: u32,
    interests: Option<String>,
}

impl ItineraryRequest {
    /// Destination is trimmed and must be non-empty; blank interests are dropped.
    pub fn new(
        destination: impl Into<String>,
        day_count: u32,
        interests: Option<String>,
    ) -> Result<Self> {
        let destination = destination.into().trim().to_string();
        if destination.is_empty() {
            return Err(PlannerError::Validation(
                "Please enter a destination.".to_string(),
            ));
        }

        if !(MIN_DAYS..=MAX_DAYS).contains(&day_count) {
            return Err(PlannerError::Validation(format!(
                "Trip length must be between {} and {} days, got {}.",
                MIN_DAYS, MAX_DAYS, day_count
            )));
        }

        let interests = interests
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        Ok(Self {
            destination,
            day_count,
            interests,
        })
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn day_count(&self) -> u32 {
        self.day_count
    }

    pub fn interests(&self) -> Option<&str> {
        self.interests.as_deref()
    }

    /// The user message sent to the agent
    pub fn instruction(&self) -> String {
        let mut instruction = format!(
            "Please plan a {}-day trip to {} for me. Make sure the itinerary is rich and reasonable.",
            self.day_count, self.destination
        );
        if let Some(interests) = &self.interests {
            instruction.push_str(&format!(" My interests and preferences: {}", interests));
        }
        instruction
    }
}
