use anyhow::Context as _;
use diesel::Connection;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::pooled_connection::deadpool::{Hook, Pool};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::*;
use tracing_forest::ForestLayer;
use tracing_subscriber::{prelude::*, EnvFilter};

use yatube::config::tracing::HttpTracingExt;
use yatube::config::{AppCfg, StorageBackend};
use yatube::services::{MemoryStore, Services};
use yatube::{routes, templates, AppState};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

async fn run_migrations(database_url: String) -> anyhow::Result<()> {
    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let mut conn = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&database_url)?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow::anyhow!("running migrations: {e}"))?;
        info!(count = applied.len(), "migrations applied");
        Ok(())
    })
    .await?
}

async fn postgres_services(cfg: &AppCfg) -> anyhow::Result<Services> {
    if cfg.run_migrations {
        run_migrations(cfg.database_url.clone()).await?;
    }

    // create a new connection pool with the default config
    let mgr = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&cfg.database_url);

    info!("Starting DB pool");
    let pool = Pool::builder(mgr)
        .max_size(cfg.db_pool_size)
        .post_create(Hook::async_fn(|conn, metrics| {
            tracing::trace_span!("dbpool::post_create").in_scope(|| {
                let c = std::ptr::addr_of!(conn);
                tracing::trace!(?c, ?metrics, "Post-create");
                Box::pin(std::future::ready(Ok(())))
            })
        }))
        .build()?;

    Ok(Services::postgres(pool))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppCfg::load().context("loading configuration")?;

    // RUST_LOG wins; otherwise app and request logs at their default levels
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(ForestLayer::default())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(ForestLayer::default())
            .with_http_tracing()
            .init();
    }

    let services = match cfg.storage {
        StorageBackend::Postgres => postgres_services(&cfg).await?,
        StorageBackend::Memory => {
            warn!("using in-memory storage, data is lost on exit");
            Services::memory(MemoryStore::new())
        }
    };

    let tera = templates::load(&cfg.templates_glob)?;
    let _watcher = if cfg.templates_autoreload {
        Some(templates::watch(tera.clone(), &cfg.templates_glob)?)
    } else {
        None
    };

    let state = AppState::new(&cfg, services, tera);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    info!("starting listening at {}", cfg.listen_addr);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
