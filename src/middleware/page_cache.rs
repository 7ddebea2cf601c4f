//! Whole-response cache for listing pages.
//!
//! Entries expire after a fixed time to live. Writes to posts do not
//! invalidate anything, so a cached page can outlive the data it shows
//! until it expires or the cache is cleared.

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use moka::future::Cache;
use tracing::debug;

use crate::auth::SESSION_COOKIE;

const MAX_ENTRIES: u64 = 10_000;
const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

#[derive(Clone)]
struct CachedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

#[derive(Clone)]
pub struct PageCache {
    entries: Cache<String, CachedResponse>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Drop every entry. Later lookups miss immediately.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    async fn get(&self, key: &str) -> Option<CachedResponse> {
        self.entries.get(key).await
    }

    async fn insert(&self, key: String, value: CachedResponse) {
        self.entries.insert(key, value).await;
    }
}

/// Responses differ per visitor because the header shows who is logged in,
/// so the session is part of the key alongside path and query.
fn cache_key(request: &Request, jar: &CookieJar) -> String {
    let uri = request.uri();
    format!(
        "{}?{}#{}",
        uri.path(),
        uri.query().unwrap_or_default(),
        jar.get(SESSION_COOKIE).map(|c| c.value()).unwrap_or_default()
    )
}

pub async fn page_cache_layer(
    State(cache): State<PageCache>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = cache_key(&request, &jar);
    if let Some(hit) = cache.get(&key).await {
        debug!(cache = "page", outcome = "hit", %key);
        let mut response = (hit.status, hit.body).into_response();
        *response.headers_mut() = hit.headers;
        return response;
    }
    debug!(cache = "page", outcome = "miss", %key);

    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(b) => b,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };
    cache
        .insert(
            key,
            CachedResponse {
                status: parts.status,
                headers: parts.headers.clone(),
                body: bytes.clone(),
            },
        )
        .await;
    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    use super::*;

    fn counting_app(cache: PageCache, calls: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/",
                get(move || {
                    let calls = Arc::clone(&calls);
                    async move {
                        let n = calls.fetch_add(1, Ordering::SeqCst);
                        format!("render #{n}")
                    }
                }),
            )
            .layer(middleware::from_fn_with_state(cache, page_cache_layer))
    }

    async fn body_of(app: &Router, uri: &str) -> String {
        let response = app
            .clone()
            .oneshot(
                axum::http::Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn serves_hits_until_cleared() {
        let cache = PageCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));
        let app = counting_app(cache.clone(), calls.clone());

        assert_eq!(body_of(&app, "/").await, "render #0");
        assert_eq!(body_of(&app, "/").await, "render #0");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // a different query string is a different page
        assert_eq!(body_of(&app, "/?page=2").await, "render #1");

        cache.clear();
        assert_eq!(body_of(&app, "/").await, "render #2");
    }

    #[tokio::test]
    async fn entries_expire() {
        let cache = PageCache::new(Duration::from_millis(100));
        let calls = Arc::new(AtomicUsize::new(0));
        let app = counting_app(cache, calls.clone());

        body_of(&app, "/").await;
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(body_of(&app, "/").await, "render #1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
