use std::path::PathBuf;

use futures_util::future::BoxFuture;
use thiserror::Error;
use uuid::Uuid;

use crate::config::UploadConfig;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("invalid blob name")]
    InvalidName,
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage for uploaded files. `put` returns the public URL of the stored blob.
pub trait BlobStore: Send + Sync {
    fn put<'a>(
        &'a self,
        name: &'a str,
        content_type: &'a str,
        bytes: Vec<u8>,
    ) -> BoxFuture<'a, Result<String, BlobError>>;
}

/// Blobs written to a local directory and served by the static file route.
#[derive(Clone, Debug)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            root: config.dir.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl BlobStore for LocalBlobStore {
    fn put<'a>(
        &'a self,
        name: &'a str,
        content_type: &'a str,
        bytes: Vec<u8>,
    ) -> BoxFuture<'a, Result<String, BlobError>> {
        Box::pin(async move {
            if name.is_empty() || name.contains('/') || name.contains('\\') || name.starts_with('.') {
                return Err(BlobError::InvalidName);
            }

            tokio::fs::create_dir_all(&self.root).await?;
            tokio::fs::write(self.root.join(name), &bytes).await?;
            tracing::debug!(name, content_type, size = bytes.len(), "Stored blob");

            Ok(format!("{}/{}", self.public_base_url, name))
        })
    }
}

/// Keeps ASCII letters, digits, `.`, `-` and `_`; everything else becomes `_`.
pub fn sanitize_filename(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.chars().take(100).collect()
    }
}

/// `<uuid>_<sanitized filename>`
pub fn unique_blob_name(original: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), sanitize_filename(original))
}
