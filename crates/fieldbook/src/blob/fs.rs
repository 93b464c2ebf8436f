use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

/// Filesystem operations the blob store needs.
///
/// Implementations must make `write_durable` data durable before returning:
/// a later `rename` is the only step that makes a file visible.
pub trait BlobFs {
    /// Creates `path` and its parents. An existing directory is success,
    /// including one created concurrently by another writer.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Streams `source` into a new file at `path` in chunks of `buffer_size`,
    /// then flushes and syncs it. Returns the number of bytes written.
    fn write_durable(&self, path: &Path, source: &mut dyn Read, buffer_size: usize) -> io::Result<u64>;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl BlobFs for OsFs {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        match fs::create_dir_all(path) {
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
            other => other,
        }
    }

    fn write_durable(&self, path: &Path, source: &mut dyn Read, buffer_size: usize) -> io::Result<u64> {
        let mut file = File::create(path)?;
        let mut buffer = vec![0u8; buffer_size.max(1)];
        let mut written = 0u64;
        loop {
            let n = match source.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            file.write_all(&buffer[..n])?;
            written += n as u64;
        }
        file.flush()?;
        file.sync_all()?;
        Ok(written)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}
