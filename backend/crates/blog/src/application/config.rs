//! Application Configuration
//!
//! Upload settings for the blog. Built by the binary from environment
//! variables.

use std::path::PathBuf;

/// Extensions accepted by `/upload`, compared case-insensitively
pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "pdf"];

#[derive(Debug, Clone)]
pub struct BlogConfig {
    /// Directory uploaded files are written to
    pub upload_dir: PathBuf,
    pub upload_max_bytes: u64,
    /// URL prefix the upload directory is served under
    pub upload_public_path: String,
    /// Lowercase, without the dot
    pub allowed_extensions: Vec<String>,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("./uploads"),
            upload_max_bytes: 10 * 1024 * 1024,
            upload_public_path: "/uploads".to_string(),
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl BlogConfig {
    pub fn is_allowed_extension(&self, extension: &str) -> bool {
        let extension = extension.to_ascii_lowercase();
        self.allowed_extensions.iter().any(|e| *e == extension)
    }

    /// `{upload_public_path}/{file_name}`
    pub fn public_url(&self, file_name: &str) -> String {
        format!(
            "{}/{}",
            self.upload_public_path.trim_end_matches('/'),
            file_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions() {
        let config = BlogConfig::default();
        assert!(config.is_allowed_extension("png"));
        assert!(config.is_allowed_extension("JPEG"));
        assert!(!config.is_allowed_extension("exe"));
        assert!(!config.is_allowed_extension(""));
    }

    #[test]
    fn test_public_url() {
        let config = BlogConfig {
            upload_public_path: "/static/uploads/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.public_url("1_a.png"), "/static/uploads/1_a.png");
    }
}
