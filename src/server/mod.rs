//! JSON HTTP service over the planner and per-user sessions.

pub mod error;
pub mod routes;

use crate::{config::PlannerConfig, itinerary::ItineraryPlanner, session::SessionStore};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::ApiError;

#[derive(Debug, Clone)]
pub struct AppState {
    pub planner: Arc<ItineraryPlanner>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(planner: ItineraryPlanner) -> Self {
        Self {
            planner: Arc::new(planner),
            sessions: SessionStore::new(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/sessions", post(routes::create_session))
        .route(
            "/api/sessions/:id",
            get(routes::get_session).delete(routes::delete_session),
        )
        .route(
            "/api/sessions/:id/itinerary",
            post(routes::generate_itinerary).delete(routes::clear_itinerary),
        )
        .route("/api/sessions/:id/calendar", get(routes::download_calendar))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Check credentials, bind and serve until the process is stopped
pub async fn serve(config: PlannerConfig) -> anyhow::Result<()> {
    let planner = ItineraryPlanner::from_config(&config)?;
    let app = router(AppState::new(planner));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Trip planner listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
