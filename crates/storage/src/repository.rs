use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Fixed name under which each store keeps its snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Session,
    Meditation,
    Course,
    MeditationCatalog,
    CourseCatalog,
}

impl StoreKey {
    pub const ALL: [StoreKey; 5] = [
        StoreKey::Session,
        StoreKey::Meditation,
        StoreKey::Course,
        StoreKey::MeditationCatalog,
        StoreKey::CourseCatalog,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            StoreKey::Session => "auth-storage",
            StoreKey::Meditation => "meditation-storage",
            StoreKey::Course => "course-storage",
            StoreKey::MeditationCatalog => "meditation-catalog",
            StoreKey::CourseCatalog => "course-catalog",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StoreKey {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StoreKey::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| StorageError::Serialization(format!("unknown store key: {s}")))
    }
}

/// One serialized store state. The payload is opaque to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    pub key: StoreKey,
    pub payload: String,
    pub updated_at: DateTime<Utc>,
}

impl SnapshotRecord {
    #[must_use]
    pub fn new(key: StoreKey, payload: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        Self {
            key,
            payload: payload.into(),
            updated_at,
        }
    }
}

/// Repository contract for whole-state snapshots, one per store key.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Fetch the latest snapshot for a store.
    ///
    /// Returns `Ok(None)` if the store was never saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn load(&self, key: StoreKey) -> Result<Option<SnapshotRecord>, StorageError>;

    /// Replace the snapshot for `record.key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save(&self, record: &SnapshotRecord) -> Result<(), StorageError>;

    /// Remove the snapshot for a store. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn clear(&self, key: StoreKey) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    snapshots: Arc<Mutex<HashMap<StoreKey, SnapshotRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            snapshots: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl SnapshotRepository for InMemoryRepository {
    async fn load(&self, key: StoreKey) -> Result<Option<SnapshotRecord>, StorageError> {
        let guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&key).cloned())
    }

    async fn save(&self, record: &SnapshotRecord) -> Result<(), StorageError> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(record.key, record.clone());
        Ok(())
    }

    async fn clear(&self, key: StoreKey) -> Result<(), StorageError> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&key);
        Ok(())
    }
}

/// Snapshot repository behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub snapshots: Arc<dyn SnapshotRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let snapshots: Arc<dyn SnapshotRepository> = Arc::new(InMemoryRepository::new());
        Self { snapshots }
    }
}
