pub mod auth;
pub mod config;
pub mod error;
pub mod helpers;
pub mod media;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod schema;
pub mod services;
pub mod templates;

use std::path::PathBuf;
use std::time::Duration;

use axum_macros::FromRef;

use auth::SessionStore;
use config::AppCfg;
use media::MediaStorage;
use middleware::page_cache::PageCache;
use pagination::Paginator;
use services::Services;
use templates::SharedTera;

pub use error::AppError;

/// Everything the handlers share.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub services: Services,
    pub tera: SharedTera,
    pub sessions: SessionStore,
    pub media: MediaStorage,
    pub paginator: Paginator,
    pub page_cache: PageCache,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(cfg: &AppCfg, services: Services, tera: SharedTera) -> Self {
        Self {
            services,
            tera,
            sessions: SessionStore::new(
                cfg.session_cookie_secure,
                Duration::from_secs(cfg.session_idle_secs),
            ),
            media: MediaStorage::new(&cfg.media_root),
            paginator: Paginator::new(cfg.page_size),
            page_cache: PageCache::new(Duration::from_secs(cfg.index_cache_ttl_secs)),
            static_dir: cfg.static_dir.clone(),
        }
    }
}
