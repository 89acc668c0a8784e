#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryRepository, SnapshotRecord, SnapshotRepository, Storage, StorageError, StoreKey,
};
