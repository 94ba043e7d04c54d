use super::{error::ApiError, AppState};
use crate::{itinerary::ItineraryRequest, session::TripSession};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    pub destination: String,
    pub days: u32,
    #[serde(default)]
    pub interests: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ItineraryResponse {
    pub destination: String,
    pub days: u32,
    pub itinerary: String,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub start: Option<NaiveDate>,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let session_id = state.sessions.create().await;
    (StatusCode::CREATED, Json(SessionCreated { session_id }))
}

async fn find_session(state: &AppState, id: Uuid) -> Result<Arc<Mutex<TripSession>>, ApiError> {
    state
        .sessions
        .get(&id)
        .await
        .ok_or(ApiError::SessionNotFound(id))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TripSession>, ApiError> {
    let session = find_session(&state, id).await?;
    let snapshot = session.lock().await.clone();
    Ok(Json(snapshot))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.remove(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::SessionNotFound(id))
    }
}

pub async fn generate_itinerary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<GenerateBody>,
) -> Result<Json<ItineraryResponse>, ApiError> {
    let session = find_session(&state, id).await?;
    let request =
        ItineraryRequest::new(body.destination, body.days, body.interests).map_err(ApiError::Request)?;

    let mut session = session.lock().await;
    let itinerary = session
        .generate(&state.planner, &request)
        .await
        .map_err(ApiError::Generation)?
        .to_string();

    Ok(Json(ItineraryResponse {
        destination: request.destination().to_string(),
        days: request.day_count(),
        itinerary,
    }))
}

pub async fn clear_itinerary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let session = find_session(&state, id).await?;
    session.lock().await.clear_itinerary();
    Ok(StatusCode::NO_CONTENT)
}

pub async fn download_calendar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<CalendarQuery>,
) -> Result<Response, ApiError> {
    let session = find_session(&state, id).await?;
    let start = query.start.unwrap_or_else(|| Local::now().date_naive());

    let export = session
        .lock()
        .await
        .calendar_export(start, Utc::now())
        .ok_or(ApiError::NoItinerary)?
        .map_err(ApiError::Export)?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/calendar; charset=utf-8"),
            ),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&export.file_name),
            ),
        ],
        export.content,
    )
        .into_response())
}

/// `attachment` header with an ASCII fallback name and the UTF-8 name encoded
fn content_disposition(file_name: &str) -> HeaderValue {
    let fallback = if file_name.is_ascii() && !file_name.contains(['"', '\\']) {
        file_name
    } else {
        "travel_itinerary.ics"
    };
    let value = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(file_name)
    );
    HeaderValue::from_str(&value)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"travel_itinerary.ics\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_ascii_names_get_a_fallback() {
        let header = content_disposition("東京_travel_itinerary.ics");
        let value = header.to_str().unwrap();
        assert!(value.starts_with("attachment; filename=\"travel_itinerary.ics\""));
        assert!(value.contains("filename*=UTF-8''%E6%9D%B1%E4%BA%AC_travel_itinerary.ics"));
    }

    #[test]
    fn ascii_names_are_used_directly() {
        let header = content_disposition("New_York_travel_itinerary.ics");
        assert!(header
            .to_str()
            .unwrap()
            .starts_with("attachment; filename=\"New_York_travel_itinerary.ics\""));
    }
}
