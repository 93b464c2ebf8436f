//! # Configuration
//!
//! Settings are loaded with [`confique`], layered in priority order:
//!
//! 1. **Environment variables**: `FIELDBOOK_UPLOAD_PATH`, `FIELDBOOK_COPY_BUFFER_SIZE`.
//! 2. **TOML file**: the path given to [`FieldbookConfig::load`], if it exists.
//! 3. **Compiled defaults**.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `upload_path` | OS data dir + `uploads` | Root directory for attachments |
//! | `copy_buffer_size` | `131072` | Chunk size when streaming uploads to disk |

use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FieldbookError, Result};

pub const DEFAULT_COPY_BUFFER_SIZE: usize = 2 << 16;

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldbookConfig {
    /// Root directory for stored attachments.
    #[config(env = "FIELDBOOK_UPLOAD_PATH")]
    pub upload_path: Option<PathBuf>,

    /// Bytes read per chunk when copying an upload.
    #[config(env = "FIELDBOOK_COPY_BUFFER_SIZE", default = 131072)]
    pub copy_buffer_size: usize,
}

impl Default for FieldbookConfig {
    fn default() -> Self {
        Self {
            upload_path: None,
            copy_buffer_size: DEFAULT_COPY_BUFFER_SIZE,
        }
    }
}

impl FieldbookConfig {
    /// Loads settings from the environment, then `path`, then defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = path {
            builder = builder.file(path);
        }
        builder
            .load()
            .map_err(|e| FieldbookError::Config(e.to_string()))
    }

    /// The configured attachment root, or the OS data directory.
    pub fn upload_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.upload_path {
            return Ok(path.clone());
        }
        ProjectDirs::from("org", "fieldbook", "fieldbook")
            .map(|dirs| dirs.data_dir().join("uploads"))
            .ok_or(FieldbookError::MissingUploadPath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = FieldbookConfig::default();
        assert_eq!(config.copy_buffer_size, 131072);
        assert!(config.upload_path.is_none());
    }

    #[test]
    fn explicit_upload_path_wins() {
        let config = FieldbookConfig {
            upload_path: Some(PathBuf::from("/srv/uploads")),
            ..Default::default()
        };
        assert_eq!(config.upload_path().unwrap(), PathBuf::from("/srv/uploads"));
    }

    #[test]
    fn load_reads_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fieldbook.toml");
        fs::write(&path, "upload_path = \"/data/blobs\"\ncopy_buffer_size = 4096\n").unwrap();

        let config = FieldbookConfig::load(Some(&path)).unwrap();
        assert_eq!(config.upload_path, Some(PathBuf::from("/data/blobs")));
        assert_eq!(config.copy_buffer_size, 4096);
    }

    #[test]
    fn load_rejects_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fieldbook.toml");
        fs::write(&path, "copy_buffer_size = \"lots\"\n").unwrap();

        let err = FieldbookConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, FieldbookError::Config(_)));
    }
}
