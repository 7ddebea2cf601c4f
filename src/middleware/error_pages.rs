use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tera::Context;

use crate::error::ErrorPage;
use crate::templates::{self, SharedTera};

fn template_for(status: StatusCode) -> &'static str {
    match status {
        StatusCode::NOT_FOUND => "core/404.html",
        StatusCode::FORBIDDEN => "core/403.html",
        s if s.is_server_error() => "core/500.html",
        _ => "core/error.html",
    }
}

/// Swap the body of any `AppError` response for the matching error template.
pub async fn error_page_layer(State(tera): State<SharedTera>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    let Some(ErrorPage(status)) = response.extensions().get::<ErrorPage>().copied() else {
        return response;
    };

    let mut ctx = Context::new();
    ctx.insert("status", &status.as_u16());
    ctx.insert("reason", status.canonical_reason().unwrap_or_default());
    ctx.insert("path", &path);
    match templates::render(&tera, template_for(status), &ctx).await {
        Ok(html) => (status, html).into_response(),
        // the plain-text body from AppError is still a valid answer
        Err(_) => response,
    }
}
