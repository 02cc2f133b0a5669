//! Filesystem-backed store.
//!
//! Layout: `<root>/<namespace>/<key>.json`. Writes go to a temp file that is
//! fsynced and then renamed over the target, so a reader sees either the old
//! value or the new one, never a partial write. The namespace directory is
//! fsynced after the rename so the new entry itself survives a crash.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::{KeyValueStore, Namespace, StoreError};

/// JSON files in a directory tree.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace directories cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        for namespace in Namespace::ALL {
            let dir = root.join(namespace.as_str());
            fs::create_dir_all(&dir).map_err(|source| StoreError::Io { path: dir, source })?;
        }
        tracing::debug!(root = %root.display(), "Opened file store");
        Ok(Self { root })
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, namespace: Namespace, key: &str) -> Result<PathBuf, StoreError> {
        if !is_safe_key(key) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self
            .root
            .join(namespace.as_str())
            .join(format!("{key}.json")))
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<(), StoreError> {
    File::open(dir)
        .and_then(|handle| handle.sync_all())
        .map_err(io_error(dir))
}

// Directories cannot be opened for syncing here; the rename is the best we get.
#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
const fn sync_dir(_dir: &Path) -> Result<(), StoreError> {
    Ok(())
}

/// Keys become file names, so only a conservative character set is allowed.
pub(crate) fn is_safe_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 64
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, namespace: Namespace, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(namespace, key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io { path, source: e }),
        }
    }

    fn set(&self, namespace: Namespace, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(namespace, key)?;
        let temp_path = path.with_extension("json.tmp");

        let mut file = File::create(&temp_path).map_err(io_error(&temp_path))?;
        file.write_all(value.as_bytes())
            .map_err(io_error(&temp_path))?;
        file.sync_all().map_err(io_error(&temp_path))?;
        drop(file);

        fs::rename(&temp_path, &path).map_err(io_error(&path))?;
        sync_dir(&self.root.join(namespace.as_str()))
    }

    fn delete(&self, namespace: Namespace, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(namespace, key)?;
        match fs::remove_file(&path) {
            Ok(()) => sync_dir(&self.root.join(namespace.as_str())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io { path, source: e }),
        }
    }
}
