//! File system operations used by the lock transition
//!
//! The transition only needs a handful of primitives: the directory rename that
//! flips `in` to `locked`, and a few probes to reconcile the persisted state with
//! what is actually on disk. They sit behind a trait so tests can inject failures
//! the local filesystem cannot produce on demand (cross-device links, full disks).
//!
//! # Testing with Mocks
//!
//! ```rust,ignore
//! use ingest_admin::fs::MockFileSystemOperations;
//! use std::io;
//!
//! let mut mock_fs = MockFileSystemOperations::new();
//! mock_fs
//!     .expect_rename()
//!     .times(1)
//!     .returning(|_, _| Err(io::Error::from(io::ErrorKind::CrossesDevices)));
//! mock_fs.expect_is_dir().return_const(true);
//! ```
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Trait for file system operations that can be mocked in tests
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait FileSystemOperations: Send + Sync {
    /// Rename `from` to `to`. Must be a single rename(2), never a copy fallback.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// True when `path` exists and is a directory (symlinks followed)
    fn is_dir(&self, path: &Path) -> bool;

    /// True when anything exists at `path`, including a dangling symlink
    fn exists(&self, path: &Path) -> bool;

    /// Whether the permissions on `path` forbid writing
    fn is_read_only(&self, path: &Path) -> io::Result<bool>;
}

/// Standard implementation that uses actual file system operations
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardFileSystem;

impl FileSystemOperations for StandardFileSystem {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn is_read_only(&self, path: &Path) -> io::Result<bool> {
        Ok(fs::metadata(path)?.permissions().readonly())
    }
}

/// Atomically replace the file at `path` with `contents`.
///
/// The bytes are staged in a provisional `.<name>.*.tmp` file next to the
/// target, synced, then renamed over the target; finally the parent directory is
/// synced so the rename itself survives a crash. Readers observe either the old
/// file or the new one, never a partial write. A provisional file left behind by
/// a crash is never read back under the target name.
pub fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "staged".to_string());

    let mut staged = tempfile::Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".tmp")
        .tempfile_in(dir)?;
    staged.write_all(contents)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;

    sync_dir(dir)
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
