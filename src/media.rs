use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use axum::body::Bytes;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Directory under the media root that post images go into.
pub const POST_IMAGES_DIR: &str = "posts";

const IMAGE_EXTENSIONS: &[&str] = &["gif", "png", "jpg", "jpeg", "webp", "bmp"];

/// Longest stored file name. With `posts/` and a collision suffix it stays
/// well inside the 255-character `image` column and filesystem name limits.
pub const MAX_FILE_NAME: usize = 100;
const MAX_EXTENSION: usize = 15;
const MAX_NAME_ATTEMPTS: usize = 8;

/// A file field taken from a multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl Upload {
    /// Accepts `image/*` content types, or a known image extension when the
    /// client sent no content type.
    pub fn is_image(&self) -> bool {
        match &self.content_type {
            Some(ct) if ct != "application/octet-stream" => ct.starts_with("image/"),
            _ => Path::new(&self.file_name)
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str())),
        }
    }
}

/// Uploaded files on local disk, addressed by paths relative to `root`.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a post image and return its media-relative path, e.g. `posts/cat.gif`.
    /// An existing file of the same name is never overwritten: the file is
    /// created exclusively and a taken name gets a random suffix.
    pub async fn save_post_image(&self, upload: &Upload) -> anyhow::Result<String> {
        let dir = self.root.join(POST_IMAGES_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("creating {}", dir.display()))?;

        let base = sanitize_file_name(&upload.file_name);
        let mut name = base.clone();
        for _ in 0..MAX_NAME_ATTEMPTS {
            let path = dir.join(&name);
            let mut file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    name = with_suffix(&base, &uuid::Uuid::now_v7().simple().to_string()[24..]);
                    continue;
                }
                Err(e) => return Err(e).with_context(|| format!("creating {}", path.display())),
            };
            file.write_all(&upload.bytes)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            file.flush().await?;
            info!(path = %path.display(), bytes = upload.bytes.len(), "stored upload");
            return Ok(format!("{POST_IMAGES_DIR}/{name}"));
        }
        anyhow::bail!("no free file name for {base} after {MAX_NAME_ATTEMPTS} attempts")
    }
}

/// Base name only, with anything but ASCII alphanumerics, `.`, `-` and `_` replaced,
/// cut to [`MAX_FILE_NAME`] characters keeping a short extension.
fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let clean: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let clean = clean.trim_start_matches('.');
    if clean.is_empty() {
        return "upload".to_string();
    }
    if clean.len() <= MAX_FILE_NAME {
        return clean.to_string();
    }
    // only ASCII is left, so byte offsets are char boundaries
    match clean.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() <= MAX_EXTENSION => {
            format!("{}.{ext}", &stem[..MAX_FILE_NAME - ext.len() - 1])
        }
        _ => clean[..MAX_FILE_NAME].to_string(),
    }
}

fn with_suffix(name: &str, suffix: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_{suffix}.{ext}"),
        None => format!("{name}_{suffix}"),
    }
}
