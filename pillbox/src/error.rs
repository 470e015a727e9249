use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::response::ApiResponse;

#[derive(Error, Debug)]
pub enum PillboxError {
    #[error("Database error: {}{source}", context_prefix(.context))]
    Database {
        /// Which catalog operation failed, when known.
        context: Option<String>,
        #[source]
        source: libsql::Error,
    },

    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Vision service error: {0}")]
    VisionService(String),

    #[error("Vision service unavailable: {0}")]
    VisionUnavailable(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl PillboxError {
    /// Stable tag for the error kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PillboxError::Database { .. } => "DatabaseError",
            PillboxError::Unknown(_) => "UnknownError",
            PillboxError::NotFound(_) => "NotFound",
            PillboxError::Validation(_) => "ValidationError",
            PillboxError::VisionService(_) => "VisionServiceError",
            PillboxError::VisionUnavailable(_) => "VisionUnavailable",
            PillboxError::Search(_) => "SearchError",
            PillboxError::Json(_) => "JsonError",
            PillboxError::Internal(_) => "InternalError",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            PillboxError::NotFound(_) => StatusCode::NOT_FOUND,
            PillboxError::Validation(_) | PillboxError::Json(_) => StatusCode::BAD_REQUEST,
            PillboxError::VisionUnavailable(_) => StatusCode::NOT_IMPLEMENTED,
            PillboxError::Database { .. }
            | PillboxError::Unknown(_)
            | PillboxError::VisionService(_)
            | PillboxError::Search(_)
            | PillboxError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wraps a catalog failure, keeping libsql faults as `Database` and
    /// folding everything else into `Unknown`. Both keep `context`.
    pub fn catalog(context: &str, err: PillboxError) -> Self {
        match err {
            PillboxError::Database { source, .. } => PillboxError::Database {
                context: Some(context.to_string()),
                source,
            },
            PillboxError::Unknown(msg) => PillboxError::Unknown(format!("{context}: {msg}")),
            other => PillboxError::Unknown(format!("{context}: {other}")),
        }
    }
}

fn context_prefix(context: &Option<String>) -> String {
    context
        .as_deref()
        .map(|c| format!("{c}: "))
        .unwrap_or_default()
}

impl From<libsql::Error> for PillboxError {
    fn from(source: libsql::Error) -> Self {
        PillboxError::Database {
            context: None,
            source,
        }
    }
}

/// Renders through the API envelope so extractor rejections and handler
/// errors share one wire format.
impl IntoResponse for PillboxError {
    fn into_response(self) -> Response {
        ApiResponse::<()>::from(self).into_response()
    }
}

pub type Result<T> = std::result::Result<T, PillboxError>;
