use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::commands::replies;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("wheel has no options")]
    EmptyWheel,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("index {index} out of range for {len} options")]
    OutOfRange { index: i64, len: usize },

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("write conflict: {0}")]
    Conflict(String),

    #[error("renderer failure: {0}")]
    Renderer(String),

    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Text shown to the user who issued the command.
    pub fn user_message(&self) -> String {
        match self {
            AppError::EmptyWheel => replies::EMPTY_WHEEL.to_string(),
            AppError::InvalidArgument(msg) => msg.clone(),
            AppError::OutOfRange { .. } => replies::INDEX_OUT_OF_RANGE.to_string(),
            AppError::Conflict(_) => replies::CONFLICT.to_string(),
            _ => replies::GENERIC_FAILURE.to_string(),
        }
    }

    /// True for failures caused by the request itself rather than the bot.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AppError::EmptyWheel | AppError::InvalidArgument(_) | AppError::OutOfRange { .. }
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::EmptyWheel | AppError::InvalidArgument(_) | AppError::OutOfRange { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
