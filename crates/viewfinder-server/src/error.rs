use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use viewfinder_store::StoreError;

use crate::templates::{NotFoundPage, ServerErrorPage};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Media storage error: {0}")]
    MediaStorage(String),

    #[error("Upload too large: {size} bytes (max {max})")]
    UploadTooLarge { size: usize, max: usize },

    #[error("Database error: {0}")]
    Store(StoreError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => AppError::NotFound,
            other => AppError::Store(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::NotFound => error_page(StatusCode::NOT_FOUND, &NotFoundPage),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone()).into_response()
            }
            AppError::UploadTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()).into_response()
            }
            AppError::MediaStorage(_)
            | AppError::Store(_)
            | AppError::Template(_)
            | AppError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                error_page(StatusCode::INTERNAL_SERVER_ERROR, &ServerErrorPage)
            }
        }
    }
}

/// Render a standalone error template, degrading to plain text if even the
/// template fails.
fn error_page<T: Template>(status: StatusCode, template: &T) -> Response {
    match template.render() {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to render error page");
            (status, status.canonical_reason().unwrap_or("error").to_string()).into_response()
        }
    }
}
