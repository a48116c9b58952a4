//! Upload Use Case
//!
//! Files are checked for size and extension, renamed to
//! `{unix_ts}_{sanitized_name}` and handed to a [`FileStore`].

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::BlogConfig;
use crate::domain::storage::FileStore;
use crate::error::{BlogError, BlogResult};

/// Longest stored name, timestamp prefix excluded
const MAX_FILE_NAME_LENGTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub url: String,
    pub size: u64,
}

/// Base name only, anything outside `[A-Za-z0-9._-]` replaced by `_`
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let clean: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut clean = clean.trim_start_matches('.').to_string();

    if clean.len() > MAX_FILE_NAME_LENGTH {
        // Keep the extension when shortening
        let ext_start = clean.rfind('.').unwrap_or(clean.len());
        let ext = clean[ext_start..].to_string();
        clean.truncate(MAX_FILE_NAME_LENGTH.saturating_sub(ext.len()));
        clean.push_str(&ext);
    }

    if clean.is_empty() { "file".to_string() } else { clean }
}

fn extension(name: &str) -> Option<&str> {
    Path::new(name).extension().and_then(|e| e.to_str())
}

pub struct UploadFileUseCase<S>
where
    S: FileStore,
{
    store: Arc<S>,
    config: BlogConfig,
}

impl<S> UploadFileUseCase<S>
where
    S: FileStore,
{
    pub fn new(store: Arc<S>, config: BlogConfig) -> Self {
        Self { store, config }
    }

    pub async fn execute(
        &self,
        original_name: &str,
        bytes: &[u8],
        now: DateTime<Utc>,
    ) -> BlogResult<UploadedFile> {
        let size = bytes.len() as u64;
        if size > self.config.upload_max_bytes {
            return Err(BlogError::FileTooLarge {
                max_bytes: self.config.upload_max_bytes,
            });
        }

        let name = sanitize_file_name(original_name);
        if !extension(&name).is_some_and(|ext| self.config.is_allowed_extension(ext)) {
            return Err(BlogError::UnsupportedFileType);
        }

        let filename = format!("{}_{}", now.timestamp(), name);
        self.store.save(&filename, bytes).await?;

        tracing::info!(filename = %filename, size, "File uploaded");

        Ok(UploadedFile {
            url: self.config.public_url(&filename),
            filename,
            size,
        })
    }
}
