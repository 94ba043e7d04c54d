use crate::error::PlannerError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

/// Errors surfaced to HTTP clients
#[derive(Debug)]
pub enum ApiError {
    SessionNotFound(Uuid),
    NoItinerary,
    /// Bad input or configuration, reported before any generation
    Request(PlannerError),
    /// The agent run failed; the session holds no itinerary
    Generation(PlannerError),
    /// Calendar export failed; the itinerary is kept
    Export(PlannerError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::SessionNotFound(_) | ApiError::NoItinerary => StatusCode::NOT_FOUND,
            ApiError::Request(PlannerError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Request(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Generation(PlannerError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Generation(_) => StatusCode::BAD_GATEWAY,
            ApiError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            ApiError::NoItinerary => "NO_ITINERARY",
            ApiError::Request(err) | ApiError::Generation(err) | ApiError::Export(err) => {
                err.error_code()
            }
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::SessionNotFound(id) => format!("Session {} not found", id),
            ApiError::NoItinerary => "No itinerary has been generated yet".to_string(),
            ApiError::Request(err) => err.to_string(),
            ApiError::Generation(err) => format!("Agent execution failed: {}", err),
            ApiError::Export(err) => format!("Failed to generate calendar file: {}", err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let retryable = match &self {
            ApiError::Generation(err) => err.is_retryable(),
            _ => false,
        };
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.message(),
                "retryable": retryable
            }
        });
        (self.status(), Json(body)).into_response()
    }
}
