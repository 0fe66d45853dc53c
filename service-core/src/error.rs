use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Too many requests: {0}")]
    TooManyRequests(String, Option<u64>),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    Database(anyhow::Error),

    #[error("Service unavailable")]
    ServiceUnavailable,

    #[error("Configuration error: {0}")]
    Config(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(anyhow::Error::new(err))
    }
}

/// Error body of the public API. Every message is generic: which resource
/// was missing, or what the store reported, stays in the server log.
#[derive(Serialize)]
struct ErrorBody {
    data: String,
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            data: message.to_string(),
        }),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(err) => {
                tracing::debug!(error = %err, "resource not found");
                error_body(StatusCode::NOT_FOUND, "Page not found")
            }
            AppError::TooManyRequests(message, retry_after) => {
                // The configured message is the body, verbatim.
                let mut response =
                    (StatusCode::TOO_MANY_REQUESTS, message).into_response();
                if let Some(retry) = retry_after {
                    response
                        .headers_mut()
                        .insert(axum::http::header::RETRY_AFTER, retry.into());
                }
                response
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "request failed");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "store operation failed");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
            AppError::ServiceUnavailable => {
                error_body(StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable")
            }
            AppError::Config(err) => {
                tracing::error!(error = %err, "configuration error");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }
}
