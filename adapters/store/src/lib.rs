#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Process-lifetime key-value storage for Touchline sessions.
//!
//! Sessions never keep state in statics. Everything that must survive a
//! remount, such as the difficulty rotation counter or a grid layout, is
//! written through an injected [`KeyValueStore`].

mod snapshot;

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

pub use snapshot::{LayoutSnapshot, SnapshotError};

/// Errors surfaced by key-value stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("could not access store file {path}")]
    Io {
        /// File the store is bound to.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The backing file does not hold a JSON object of strings.
    #[error("store file {path} is not valid")]
    Format {
        /// File the store is bound to.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// A counter key holds something other than a non-negative integer.
    #[error("value '{value}' stored under '{key}' is not a counter")]
    InvalidCounter {
        /// Key that was read.
        key: String,
        /// Raw value found under the key.
        value: String,
    },
}

/// String key-value storage shared by sessions.
pub trait KeyValueStore {
    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

impl<T> KeyValueStore for &mut T
where
    T: KeyValueStore + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// In-memory store living as long as the process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let _ = self.values.insert(key.to_owned(), value);
        Ok(())
    }
}

/// Store persisted as a single JSON object on disk.
///
/// The file is read once when the store opens and rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store at `path`, starting empty when the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Format {
                path: path.clone(),
                source,
            })?,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "store file missing, starting empty");
                BTreeMap::new()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self { path, values })
    }

    /// File backing the store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(&self.values).map_err(|source| {
            StoreError::Format {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, bytes).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let _ = self.values.insert(key.to_owned(), value);
        self.flush()
    }
}

/// Integer counter stored under a fixed key.
///
/// A missing key reads as zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistedCounter {
    key: String,
}

impl PersistedCounter {
    /// Key holding the shootout difficulty rotation index.
    pub const DIFFICULTY_ROTATION: &'static str = "shootout.difficulty_index";

    /// Creates a counter bound to `key`.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Counter driving the shootout difficulty rotation.
    #[must_use]
    pub fn difficulty_rotation() -> Self {
        Self::new(Self::DIFFICULTY_ROTATION)
    }

    /// Key the counter is stored under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the current value.
    pub fn read<S>(&self, store: &S) -> Result<u32, StoreError>
    where
        S: KeyValueStore + ?Sized,
    {
        match store.get(&self.key)? {
            None => Ok(0),
            Some(value) => value.trim().parse().map_err(|_| {
                warn!(key = %self.key, %value, "counter holds a non-numeric value");
                StoreError::InvalidCounter {
                    key: self.key.clone(),
                    value,
                }
            }),
        }
    }

    /// Overwrites the stored value.
    pub fn write<S>(&self, store: &mut S, value: u32) -> Result<(), StoreError>
    where
        S: KeyValueStore + ?Sized,
    {
        store.set(&self.key, value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_counter_reads_zero() {
        let store = MemoryStore::new();
        let counter = PersistedCounter::difficulty_rotation();
        assert_eq!(counter.read(&store).expect("read"), 0);
    }

    #[test]
    fn counter_write_is_visible_to_later_reads() {
        let mut store = MemoryStore::new();
        let counter = PersistedCounter::new("laps");
        counter.write(&mut store, 7).expect("write");
        assert_eq!(counter.read(&store).expect("read"), 7);
        assert_eq!(store.get("laps").expect("get"), Some("7".to_owned()));
    }

    #[test]
    fn garbage_counter_is_reported() {
        let mut store = MemoryStore::new();
        store.set("laps", "many".to_owned()).expect("set");
        let error = PersistedCounter::new("laps")
            .read(&store)
            .expect_err("garbage must not parse");
        assert!(matches!(error, StoreError::InvalidCounter { .. }));
    }

    #[test]
    fn json_file_store_survives_reopening() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("touchline.json");

        let mut store = JsonFileStore::open(&path).expect("open new store");
        assert_eq!(store.get("city").expect("get"), None);
        store.set("city", "layout".to_owned()).expect("set");
        drop(store);

        let reopened = JsonFileStore::open(&path).expect("reopen store");
        assert_eq!(reopened.get("city").expect("get"), Some("layout".to_owned()));
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn corrupt_store_file_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        fs::write(&path, b"[1, 2").expect("write fixture");

        let error = JsonFileStore::open(&path).expect_err("corrupt file must fail");
        assert!(matches!(error, StoreError::Format { .. }));
    }
}
