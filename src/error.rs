use thiserror::Error;

/// Main error type for the planner
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required API keys: {}", .0.join(", "))]
    MissingCredentials(Vec<String>),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Chat completion API error: {0}")]
    Api(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid function call: {0}")]
    InvalidFunctionCall(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Maximum iterations exceeded: {0}")]
    MaxIterations(usize),

    #[error("Rate limit exceeded: retry after {retry_after}s")]
    RateLimit { retry_after: u64 },

    #[error("Model returned an empty final answer")]
    EmptyResponse,

    #[error("Calendar export error: {0}")]
    Calendar(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PlannerError>;

impl PlannerError {
    /// Check if retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PlannerError::Http(_) | PlannerError::RateLimit { .. } | PlannerError::Timeout(_)
        )
    }

    /// Errors raised before any generation attempt
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PlannerError::Config(_) | PlannerError::MissingCredentials(_)
        )
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            PlannerError::Config(_) => "CONFIG_ERROR",
            PlannerError::MissingCredentials(_) => "MISSING_CREDENTIALS",
            PlannerError::Http(_) => "HTTP_ERROR",
            PlannerError::Api(_) => "API_ERROR",
            PlannerError::Serialization(_) => "SERIALIZATION_ERROR",
            PlannerError::Validation(_) => "VALIDATION_ERROR",
            PlannerError::ToolExecution(_) => "TOOL_EXECUTION_ERROR",
            PlannerError::ToolNotFound(_) => "TOOL_NOT_FOUND",
            PlannerError::InvalidFunctionCall(_) => "INVALID_FUNCTION_CALL",
            PlannerError::Timeout(_) => "TIMEOUT_ERROR",
            PlannerError::MaxIterations(_) => "MAX_ITERATIONS_EXCEEDED",
            PlannerError::RateLimit { .. } => "RATE_LIMIT_ERROR",
            PlannerError::EmptyResponse => "EMPTY_RESPONSE",
            PlannerError::Calendar(_) => "CALENDAR_ERROR",
            PlannerError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    /// Convert to a structured error payload
    pub fn to_error_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "retryable": self.is_retryable()
            }
        })
    }
}
