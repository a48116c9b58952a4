//! Uploaded file storage

use crate::error::BlogResult;

#[trait_variant::make(FileStore: Send)]
pub trait LocalFileStore {
    /// Store `bytes` under `file_name`; an existing file is never replaced
    async fn save(&self, file_name: &str, bytes: &[u8]) -> BlogResult<()>;
}
