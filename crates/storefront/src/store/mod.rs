//! Persistent key-value storage for engine state.
//!
//! # Namespaces
//!
//! | Namespace       | Value                                   |
//! |-----------------|-----------------------------------------|
//! | `cart`          | JSON sequence of line items             |
//! | `order-history` | JSON sequence of orders, newest first   |
//! | `session`       | JSON session record, absent when signed out |
//!
//! Backends implement [`KeyValueStore`] over raw text. [`PersistentStore`]
//! layers JSON encoding on top and reports reads as a tagged [`Loaded`] so a
//! never-written value and an unreadable one stay distinguishable, even though
//! the engines treat both as the empty state.

mod file;
mod memory;

pub use file::FileStore;
pub(crate) use file::is_safe_key as is_safe_store_key;
pub use memory::MemoryStore;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors from a storage backend.
///
/// Reads never surface these to engine callers; writes do, and a failed write
/// leaves the previously stored value in place.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Value could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Key contains characters that cannot be stored safely.
    #[error("invalid store key: {0:?}")]
    InvalidKey(String),
}

/// Storage namespaces used by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// The shopper's cart.
    Cart,
    /// Placed orders, newest first.
    OrderHistory,
    /// The current session.
    Session,
}

impl Namespace {
    /// Every namespace.
    pub const ALL: [Self; 3] = [Self::Cart, Self::OrderHistory, Self::Session];

    /// Namespace name as used on disk.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::OrderHistory => "order-history",
            Self::Session => "session",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw text storage, addressed by namespace and key.
///
/// Writes must be durable before they return. Deleting a missing entry is not
/// an error.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when nothing was ever written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, namespace: Namespace, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be durably written.
    fn set(&self, namespace: Namespace, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing value could not be removed.
    fn delete(&self, namespace: Namespace, key: &str) -> Result<(), StoreError>;
}

/// Outcome of reading a typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loaded<T> {
    /// A value was stored and decoded.
    Present(T),
    /// Nothing stored yet.
    Absent,
    /// Something was stored but could not be read or decoded.
    Unreadable(String),
}

impl<T> Loaded<T> {
    /// The value, treating `Absent` and `Unreadable` alike.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent | Self::Unreadable(_) => None,
        }
    }

    /// Whether a stored value could not be read.
    pub const fn is_unreadable(&self) -> bool {
        matches!(self, Self::Unreadable(_))
    }
}

impl<T: Default> Loaded<T> {
    /// The value, or the namespace's empty value.
    pub fn unwrap_or_default(self) -> T {
        self.into_option().unwrap_or_default()
    }
}

/// Typed access to one profile's entries across all namespaces.
///
/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct PersistentStore {
    backend: Arc<dyn KeyValueStore>,
    key: Arc<str>,
}

impl fmt::Debug for PersistentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl PersistentStore {
    /// Wrap `backend`, storing every namespace under `key`.
    pub fn new(backend: Arc<dyn KeyValueStore>, key: &str) -> Self {
        Self {
            backend,
            key: Arc::from(key),
        }
    }

    /// Key used inside every namespace.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read and decode a value.
    ///
    /// Never fails: backend errors and undecodable text are reported as
    /// [`Loaded::Unreadable`] and logged.
    pub fn load<T: DeserializeOwned>(&self, namespace: Namespace) -> Loaded<T> {
        let raw = match self.backend.get(namespace, &self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Loaded::Absent,
            Err(e) => {
                tracing::warn!(%namespace, error = %e, "Failed to read stored value, using empty state");
                return Loaded::Unreadable(e.to_string());
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Loaded::Present(value),
            Err(e) => {
                tracing::warn!(%namespace, error = %e, "Stored value is not valid, using empty state");
                Loaded::Unreadable(e.to_string())
            }
        }
    }

    /// Encode and durably write a value.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the backend write fails.
    pub fn save<T: Serialize>(&self, namespace: Namespace, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.backend.set(namespace, &self.key, &raw)?;
        tracing::debug!(%namespace, bytes = raw.len(), "Persisted value");
        Ok(())
    }

    /// Delete a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend delete fails.
    pub fn remove(&self, namespace: Namespace) -> Result<(), StoreError> {
        self.backend.delete(namespace, &self.key)?;
        tracing::debug!(%namespace, "Removed value");
        Ok(())
    }

    /// Read the raw stored text, for restoring it verbatim later.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn read_raw(&self, namespace: Namespace) -> Result<Option<String>, StoreError> {
        self.backend.get(namespace, &self.key)
    }

    /// Put back text captured with [`read_raw`](Self::read_raw).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write or delete fails.
    pub fn restore_raw(&self, namespace: Namespace, raw: Option<&str>) -> Result<(), StoreError> {
        match raw {
            Some(raw) => self.backend.set(namespace, &self.key, raw),
            None => self.backend.delete(namespace, &self.key),
        }
    }
}
