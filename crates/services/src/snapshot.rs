//! Typed, versioned snapshots on top of the opaque snapshot repository.
//!
//! Each store writes its whole state as `{"version": N, "state": ...}` after
//! every mutation. Writes are best-effort: a failure is logged and the
//! in-memory state stays authoritative for the running process.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use storage::repository::{SnapshotRecord, SnapshotRepository, StorageError, StoreKey};
use tracing::{debug, warn};

use crate::Clock;

/// Current envelope version. Snapshots with another version are discarded.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    state: &'a T,
}

#[derive(serde::Deserialize)]
struct Envelope<T> {
    version: u32,
    state: T,
}

/// Reads and writes one store's state under a fixed key.
pub struct SnapshotSlot<T> {
    key: StoreKey,
    repo: Arc<dyn SnapshotRepository>,
    clock: Clock,
    _state: PhantomData<fn() -> T>,
}

impl<T> Clone for SnapshotSlot<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            repo: Arc::clone(&self.repo),
            clock: self.clock,
            _state: PhantomData,
        }
    }
}

impl<T> SnapshotSlot<T>
where
    T: Serialize + DeserializeOwned,
{
    #[must_use]
    pub fn new(key: StoreKey, repo: Arc<dyn SnapshotRepository>, clock: Clock) -> Self {
        Self {
            key,
            repo,
            clock,
            _state: PhantomData,
        }
    }

    #[must_use]
    pub fn key(&self) -> StoreKey {
        self.key
    }

    /// Load the stored state, or `fallback()` if there is none.
    ///
    /// A snapshot that cannot be decoded, or carries another version, is
    /// logged and replaced by the fallback.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the repository cannot be read.
    pub async fn load_or_else(&self, fallback: impl FnOnce() -> T) -> Result<T, StorageError> {
        let Some(record) = self.repo.load(self.key).await? else {
            debug!(store = %self.key, "no snapshot, starting fresh");
            return Ok(fallback());
        };

        match serde_json::from_str::<Envelope<T>>(&record.payload) {
            Ok(envelope) if envelope.version == SNAPSHOT_VERSION => Ok(envelope.state),
            Ok(envelope) => {
                warn!(
                    store = %self.key,
                    found = envelope.version,
                    expected = SNAPSHOT_VERSION,
                    "discarding snapshot with unsupported version"
                );
                Ok(fallback())
            }
            Err(err) => {
                warn!(store = %self.key, error = %err, "discarding unreadable snapshot");
                Ok(fallback())
            }
        }
    }

    /// Write the whole state. Failures are logged, never returned.
    pub async fn persist(&self, state: &T) {
        let envelope = EnvelopeRef {
            version: SNAPSHOT_VERSION,
            state,
        };
        let payload = match serde_json::to_string(&envelope) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(store = %self.key, error = %err, "failed to encode snapshot");
                return;
            }
        };

        let record = SnapshotRecord::new(self.key, payload, self.clock.now());
        if let Err(err) = self.repo.save(&record).await {
            warn!(store = %self.key, error = %err, "failed to persist snapshot");
        }
    }

    /// Drop the stored snapshot. Failures are logged.
    pub async fn clear(&self) {
        if let Err(err) = self.repo.clear(self.key).await {
            warn!(store = %self.key, error = %err, "failed to clear snapshot");
        }
    }
}
