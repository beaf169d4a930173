use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Step of the report pipeline that produced a failure.
///
/// Surfaced to the dashboard so a failed export names the step that broke
/// (fetch, aggregate, export or email).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Fetch,
    Aggregate,
    Export,
    Email,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Fetch => write!(f, "fetch"),
            PipelineStage::Aggregate => write!(f, "aggregate"),
            PipelineStage::Export => write!(f, "export"),
            PipelineStage::Email => write!(f, "email"),
        }
    }
}

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Validation errors for business rules
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid report or schedule configuration, rejected before any work starts
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Record store collaborator unreachable or returned garbage
    #[error("Record store error: {0}")]
    RecordStore(String),

    /// Email delivery collaborator errors
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// A pipeline step failed; carries the step for user-facing notifications
    #[error("{stage} step failed: {message}")]
    Stage {
        stage: PipelineStage,
        message: String,
    },

    /// User cancelled an export before hand-off
    #[error("Export cancelled")]
    Cancelled,

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflicting state transition
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Service configuration errors (environment, startup)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        let mut body = serde_json::json!({
            "error": {
                "message": error_message,
                "code": status_code.as_u16(),
            }
        });
        if let Some(stage) = self.stage() {
            body["error"]["stage"] = serde_json::json!(stage);
        }

        HttpResponse::build(status_code).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidConfiguration(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RecordStore(_) => StatusCode::BAD_GATEWAY,
            AppError::Delivery(_) => StatusCode::BAD_GATEWAY,
            AppError::Stage { stage, .. } => match stage {
                PipelineStage::Fetch | PipelineStage::Email => StatusCode::BAD_GATEWAY,
                PipelineStage::Aggregate | PipelineStage::Export => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::Cancelled => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        AppError::InvalidConfiguration(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn record_store(msg: impl Into<String>) -> Self {
        AppError::RecordStore(msg.into())
    }

    pub fn delivery(msg: impl Into<String>) -> Self {
        AppError::Delivery(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Wrap an error as a failure of the given pipeline step.
    ///
    /// Configuration errors and cancellations pass through untouched so callers can
    /// still tell them apart.
    pub fn at_stage(self, stage: PipelineStage) -> Self {
        match self {
            AppError::InvalidConfiguration(_) | AppError::Cancelled | AppError::Stage { .. } => {
                self
            }
            other => AppError::Stage {
                stage,
                message: other.to_string(),
            },
        }
    }

    /// Pipeline step this error is attributed to, if any
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            AppError::Stage { stage, .. } => Some(*stage),
            AppError::RecordStore(_) | AppError::Database(_) => Some(PipelineStage::Fetch),
            AppError::Delivery(_) => Some(PipelineStage::Email),
            _ => None,
        }
    }

    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, AppError::InvalidConfiguration(_))
    }
}
