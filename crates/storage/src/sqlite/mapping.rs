use sqlx::Row;

use crate::repository::{SnapshotRecord, StorageError, StoreKey};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn map_snapshot_row(row: &sqlx::sqlite::SqliteRow) -> Result<SnapshotRecord, StorageError> {
    let key: String = row.try_get("store_key").map_err(ser)?;
    Ok(SnapshotRecord {
        key: key.parse::<StoreKey>()?,
        payload: row.try_get("payload").map_err(ser)?,
        updated_at: row.try_get("updated_at").map_err(ser)?,
    })
}
