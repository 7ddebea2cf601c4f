pub mod about;
pub mod forms;
pub mod posts;
pub mod users;

use axum::extract::DefaultBodyLimit;
use axum::http::header;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::error::AppError;
use crate::middleware::error_pages::error_page_layer;
use crate::middleware::logging::HttpLoggingExt;
use crate::middleware::page_cache::page_cache_layer;
use crate::AppState;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

async fn not_found() -> AppError {
    AppError::not_found("page")
}

/// The whole site.
pub fn router(state: AppState) -> Router {
    let cached_index = get(posts::index).layer(from_fn_with_state(
        state.page_cache.clone(),
        page_cache_layer,
    ));

    Router::new()
        .route("/", cached_index)
        .merge(posts::router())
        .nest("/auth", users::router())
        .nest("/about", about::router())
        .nest_service(
            "/static",
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::CACHE_CONTROL,
                    header::HeaderValue::from_static("max-age=13420"),
                ))
                .layer(CompressionLayer::new())
                .service(ServeDir::new(&state.static_dir)),
        )
        .nest_service("/media", ServeDir::new(state.media.root()))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(from_fn_with_state(state.tera.clone(), error_page_layer))
        .with_state(state)
        .with_http_logging()
}
