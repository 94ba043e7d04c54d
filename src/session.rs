//! Per-user session state for the application shells.

use crate::{
    calendar::{self, download_file_name},
    error::Result,
    itinerary::{ItineraryPlanner, ItineraryRequest},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

pub const DEFAULT_DAY_COUNT: u32 = 7;

/// A downloadable calendar file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarExport {
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Last inputs and last itinerary of one user.
///
/// A new generation always clears the previous itinerary before it starts, so a failed
/// generation leaves no stale result behind.
#[derive(Debug, Clone, Serialize)]
pub struct TripSession {
    destination: String,
    day_count: u32,
    itinerary: Option<String>,
}

impl Default for TripSession {
    fn default() -> Self {
        Self {
            destination: String::new(),
            day_count: DEFAULT_DAY_COUNT,
            itinerary: None,
        }
    }
}

impl TripSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn day_count(&self) -> u32 {
        self.day_count
    }

    pub fn itinerary(&self) -> Option<&str> {
        self.itinerary.as_deref()
    }

    pub fn begin_generation(&mut self, request: &ItineraryRequest) {
        self.destination = request.destination().to_string();
        self.day_count = request.day_count();
        self.itinerary = None;
    }

    pub fn complete_generation(&mut self, itinerary: String) {
        self.itinerary = Some(itinerary);
    }

    pub fn clear_itinerary(&mut self) {
        self.itinerary = None;
    }

    /// Run one generation through `planner`, updating the session either way
    pub async fn generate(
        &mut self,
        planner: &ItineraryPlanner,
        request: &ItineraryRequest,
    ) -> Result<&str> {
        self.begin_generation(request);

        match planner.plan_trip(request).await {
            Ok(itinerary) => {
                info!(
                    target: "trip_planner::session",
                    destination = self.destination.as_str(),
                    chars = itinerary.len(),
                    "itinerary generated"
                );
                Ok(self.itinerary.insert(itinerary).as_str())
            }
            Err(err) => {
                warn!(target: "trip_planner::session", error = %err, "generation failed");
                Err(err)
            }
        }
    }

    /// Calendar file for the current itinerary, `None` when there is none.
    ///
    /// Export failures leave the itinerary untouched.
    pub fn calendar_export(
        &self,
        start_date: NaiveDate,
        generated_at: DateTime<Utc>,
    ) -> Option<Result<CalendarExport>> {
        let itinerary = self.itinerary.as_deref()?;
        Some(
            calendar::convert_at(itinerary, start_date, generated_at).map(|content| {
                CalendarExport {
                    file_name: download_file_name(&self.destination),
                    content,
                }
            }),
        )
    }
}

/// In-memory sessions keyed by id
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Mutex<TripSession>>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(TripSession::new())));
        id
    }

    /// Locking the returned session serialises generations within it
    pub async fn get(&self, id: &Uuid) -> Option<Arc<Mutex<TripSession>>> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn remove(&self, id: &Uuid) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
