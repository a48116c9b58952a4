//! Disk-backed upload storage

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::domain::storage::FileStore;
use crate::error::{BlogError, BlogResult};

/// Writes uploads into a single flat directory
#[derive(Debug, Clone)]
pub struct DiskFileStore {
    root: PathBuf,
}

impl DiskFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory if it does not exist yet
    pub async fn ensure_dir(&self) -> BlogResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }
}

/// Write `bytes` to a freshly created file, removing it again on failure
/// so no truncated upload is left behind
async fn write_or_remove<W>(writer: &mut W, path: &Path, bytes: &[u8]) -> BlogResult<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        writer.write_all(bytes).await?;
        writer.flush().await
    }
    .await;

    if let Err(e) = written {
        if let Err(remove_err) = tokio::fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %remove_err, "Partial upload not removed");
        }
        return Err(e.into());
    }
    Ok(())
}

impl FileStore for DiskFileStore {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> BlogResult<()> {
        // Names reaching here are already sanitized; refuse anything else
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.starts_with('.') {
            return Err(BlogError::Internal(format!("unsafe file name: {file_name}")));
        }

        let path = self.root.join(file_name);
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(BlogError::Conflict(
                    "A file with this name already exists".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        write_or_remove(&mut file, &path, bytes).await?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Upload written");
        Ok(())
    }
}
