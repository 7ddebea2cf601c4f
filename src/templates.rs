//! Tera setup: loading, rendering and optional hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use axum::response::Html;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tera::{Context, Tera};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::AppError;

pub type SharedTera = Arc<RwLock<Tera>>;

pub fn load(glob: &str) -> anyhow::Result<SharedTera> {
    let tera = Tera::new(glob).with_context(|| format!("loading templates from {glob}"))?;
    info!(templates = tera.get_template_names().count(), "templates loaded");
    Ok(Arc::new(RwLock::new(tera)))
}

pub async fn render(tera: &SharedTera, name: &str, ctx: &Context) -> Result<Html<String>, AppError> {
    let html = tera
        .read()
        .await
        .render(name, ctx)
        .with_context(|| format!("rendering {name}"))?;
    Ok(Html(html))
}

/// The directory part of a glob such as `src/templates/**/*`.
fn watch_root(glob: &str) -> PathBuf {
    let root: PathBuf = Path::new(glob)
        .components()
        .take_while(|c| !c.as_os_str().to_string_lossy().contains('*'))
        .collect();
    if root.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        root
    }
}

/// Reload every template whenever a file under the glob's directory changes.
///
/// The returned watcher must be kept alive for reloading to continue.
pub fn watch(tera: SharedTera, glob: &str) -> anyhow::Result<RecommendedWatcher> {
    let (tx, mut rx) = tokio::sync::mpsc::channel::<()>(1);
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(ev) if ev.kind.is_modify() || ev.kind.is_create() || ev.kind.is_remove() => {
                let _ = tx.try_send(());
            }
            Ok(_) => {}
            Err(e) => warn!(%e, "template watcher error"),
        }
    })?;
    let root = watch_root(glob);
    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!(path = %root.display(), "watching templates");

    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            match tera.write().await.full_reload() {
                Ok(()) => info!("templates reloaded"),
                Err(e) => warn!(%e, "template reload failed, keeping previous set"),
            }
        }
    });

    Ok(watcher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_root_strips_glob() {
        assert_eq!(watch_root("src/templates/**/*"), PathBuf::from("src/templates"));
        assert_eq!(watch_root("*.html"), PathBuf::from("."));
    }

    #[tokio::test]
    async fn bundled_templates_load() {
        let tera = load(concat!(env!("CARGO_MANIFEST_DIR"), "/src/templates/**/*")).unwrap();
        let names: Vec<String> = tera
            .read()
            .await
            .get_template_names()
            .map(str::to_string)
            .collect();
        for expected in ["posts/index.html", "core/404.html", "posts/create_post.html"] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }
}
