//! Reading and writing changelog documents

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anchorlog_core::error::ChangelogError;
use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

/// Read a changelog document; a missing file reads as empty
#[instrument]
pub fn read_document(path: &Path) -> Result<String, ChangelogError> {
    Ok(read_optional_text(path)?.unwrap_or_default())
}

/// Read a text file that may not exist yet
pub fn read_optional_text(path: &Path) -> Result<Option<String>, ChangelogError> {
    match fs::read_to_string(path) {
        Ok(text) => {
            debug!(path = %path.display(), len = text.len(), "read file");
            Ok(Some(text))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "file does not exist");
            Ok(None)
        }
        Err(source) => Err(ChangelogError::ReadFailed {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Replace `path` with `content` in one step.
///
/// The content goes to a temporary file in the same directory which is then
/// renamed over the destination. An existing destination keeps its
/// permissions.
#[instrument(skip(content), fields(len = content.len()))]
pub fn write_document(path: &Path, content: &str) -> Result<(), ChangelogError> {
    let write_failed = |source: io::Error| ChangelogError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = parent_dir(path);
    fs::create_dir_all(&dir).map_err(write_failed)?;

    let mut file = NamedTempFile::new_in(&dir).map_err(write_failed)?;
    file.write_all(content.as_bytes()).map_err(write_failed)?;
    file.as_file().sync_all().map_err(write_failed)?;
    if let Ok(existing) = fs::metadata(path) {
        fs::set_permissions(file.path(), existing.permissions()).map_err(write_failed)?;
    }
    file.persist(path).map_err(|e| write_failed(e.error))?;

    debug!(path = %path.display(), "document written");
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Exclusive advisory lock guarding one document for the length of a run.
///
/// The lock lives on a hidden sidecar file next to the document. Dropping
/// the guard removes the sidecar and releases the lock.
#[derive(Debug)]
pub struct DocumentLock {
    file: File,
    path: PathBuf,
}

impl DocumentLock {
    /// Block until the lock for `document` is held
    #[instrument]
    pub fn acquire(document: &Path) -> Result<Self, ChangelogError> {
        let path = lock_path(document);
        let lock_failed = |source: io::Error| ChangelogError::LockFailed {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(parent_dir(&path)).map_err(lock_failed)?;
        loop {
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&path)
                .map_err(lock_failed)?;
            file.lock_exclusive().map_err(lock_failed)?;

            // The previous holder may have removed the sidecar while we waited
            if is_same_file(&file, &path) {
                debug!(lock = %path.display(), "document lock acquired");
                return Ok(Self { file, path });
            }
            debug!(lock = %path.display(), "lock sidecar replaced, retrying");
        }
    }

    /// Path of the sidecar lock file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DocumentLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(unix)]
fn is_same_file(file: &File, path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (file.metadata(), fs::metadata(path)) {
        (Ok(held), Ok(current)) => held.dev() == current.dev() && held.ino() == current.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_same_file(_file: &File, path: &Path) -> bool {
    path.exists()
}

fn lock_path(document: &Path) -> PathBuf {
    let name = document
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "changelog".to_string());
    parent_dir(document).join(format!(".{}.lock", name))
}
