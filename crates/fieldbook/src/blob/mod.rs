//! # Attachment Storage
//!
//! Uploaded files are stored under a configured root with a path derived from
//! a fresh UUID, one directory level per UUID group:
//!
//! ```text
//! <root>/1b4e28ba/2fa1/11d2/883f/0016d3cca427
//! ```
//!
//! ## Write Protocol
//!
//! 1. Create the parent directories (an existing directory is fine).
//! 2. Stream the upload to `<dest>~`, flush and fsync it.
//! 3. Rename `<dest>~` to `<dest>` in one step.
//! 4. Detect the MIME type from the stored bytes.
//!
//! Readers therefore never see a partially written file at `<dest>`. A crash
//! before step 3 leaves at most an orphaned `~` file.
//!
//! Filesystem access and MIME detection go through [`BlobFs`] and
//! [`MimeSniffer`] so tests can inject failures.

mod fs;
mod sniff;

pub use fs::{BlobFs, OsFs};
pub use sniff::{MagicSniffer, MimeSniffer};

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::attributes::BlobInfo;
use crate::config::{FieldbookConfig, DEFAULT_COPY_BUFFER_SIZE};
use crate::error::{FieldbookError, Result};
use crate::input::Upload;

pub struct BlobStore<F = OsFs, S = MagicSniffer> {
    fs: F,
    sniffer: S,
    buffer_size: usize,
}

impl BlobStore {
    pub fn from_config(config: &FieldbookConfig) -> Self {
        BlobStore::new(OsFs, MagicSniffer).with_buffer_size(config.copy_buffer_size)
    }
}

impl Default for BlobStore {
    fn default() -> Self {
        BlobStore::new(OsFs, MagicSniffer)
    }
}

impl<F: BlobFs, S: MimeSniffer> BlobStore<F, S> {
    pub fn new(fs: F, sniffer: S) -> Self {
        Self {
            fs,
            sniffer,
            buffer_size: DEFAULT_COPY_BUFFER_SIZE,
        }
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    /// Durably stores `upload` under `root`.
    pub fn store(&self, upload: &mut Upload, root: &Path) -> Result<BlobInfo> {
        if root.as_os_str().is_empty() {
            return Err(FieldbookError::MissingUploadPath);
        }

        let dest = generated_path(root, Uuid::new_v4());
        if let Some(parent) = dest.parent() {
            self.fs.create_dir_all(parent)?;
        }

        let temp = temp_path(&dest);
        let size = match self.fs.write_durable(&temp, upload.reader(), self.buffer_size) {
            Ok(size) => size,
            Err(e) => {
                let _ = self.fs.remove_file(&temp);
                return Err(e.into());
            }
        };
        self.fs.rename(&temp, &dest)?;

        let mime_type = self.sniffer.sniff(&dest)?;
        debug!(path = %dest.display(), size, mime_type = %mime_type, "Stored attachment");

        Ok(BlobInfo::new(base_name(&upload.file_name), dest, mime_type))
    }

    /// Deletes a stored attachment. A file that is already gone is only logged.
    pub fn remove(&self, blob: &BlobInfo) -> Result<()> {
        match self.fs.remove_file(&blob.path) {
            Ok(()) => {
                debug!(path = %blob.path.display(), "Removed attachment");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %blob.path.display(), "Attachment already missing");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn generated_path(root: &Path, id: Uuid) -> PathBuf {
    id.to_string()
        .split('-')
        .fold(root.to_path_buf(), |path, part| path.join(part))
}

fn temp_path(dest: &Path) -> PathBuf {
    let mut name = OsString::from(dest.as_os_str());
    name.push("~");
    PathBuf::from(name)
}

/// Strips any client-side directories from an uploaded file name.
fn base_name(file_name: &str) -> String {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .to_string()
}
