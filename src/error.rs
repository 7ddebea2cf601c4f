use std::fmt::Debug;
use std::fmt::Display;

use axum::response::Html;
use axum::{http::StatusCode, response::IntoResponse};

/// Marks a response whose body the error page middleware should replace
/// with the rendered template for its status.
#[derive(Debug, Clone, Copy)]
pub struct ErrorPage(pub StatusCode);

pub struct AppError {
    pub status: StatusCode,
    pub inner: anyhow::Error,
}

impl AppError {
    pub fn not_found(what: impl Display) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            inner: anyhow::anyhow!("{what} not found"),
        }
    }

    pub fn bad_request(err: impl Into<anyhow::Error>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            inner: err.into(),
        }
    }
}

// Tell axum how to convert `AppError` into a response.
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.status.is_server_error() {
            tracing::error!(error = ?self.inner, "request failed");
        } else {
            tracing::debug!(status = %self.status, error = %self.inner, "request rejected");
        }
        let mut response = (
            self.status,
            Html(format!(
                "{} {}",
                self.status.as_u16(),
                self.status.canonical_reason().unwrap_or_default()
            )),
        )
            .into_response();
        response.extensions_mut().insert(ErrorPage(self.status));
        response
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.inner, f)
    }
}

impl Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.inner, f)
    }
}

// This enables using `?` on functions that return `Result<_, anyhow::Error>` to turn them into
// `Result<_, AppError>`. That way you don't need to do that manually.
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            inner: err.into(),
        }
    }
}
