use async_trait::async_trait;

use super::SqliteRepository;
use super::mapping::map_snapshot_row;
use crate::repository::{SnapshotRecord, SnapshotRepository, StorageError, StoreKey};

#[async_trait]
impl SnapshotRepository for SqliteRepository {
    async fn load(&self, key: StoreKey) -> Result<Option<SnapshotRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT store_key, payload, updated_at
            FROM store_snapshots
            WHERE store_key = ?1
            ",
        )
        .bind(key.name())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        row.as_ref().map(map_snapshot_row).transpose()
    }

    async fn save(&self, record: &SnapshotRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO store_snapshots (store_key, payload, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(store_key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            ",
        )
        .bind(record.key.name())
        .bind(&record.payload)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn clear(&self, key: StoreKey) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM store_snapshots WHERE store_key = ?1")
            .bind(key.name())
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
