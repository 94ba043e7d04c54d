pub mod planner;
pub mod request;

pub use planner::{ItineraryPlanner, ITINERARY_INTRO, SYSTEM_PROMPT};
pub use request::{ItineraryRequest, MAX_DAYS, MIN_DAYS};
