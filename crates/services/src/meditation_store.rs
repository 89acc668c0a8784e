use std::sync::Arc;

use chrono::{DateTime, Utc};
use pleiades_core::CatalogQuery;
use pleiades_core::catalog::MeditationCatalog;
use pleiades_core::model::progress::{clamp_percent, playback_percent};
use pleiades_core::model::{HistoryEntry, Meditation, MeditationId, MeditationPatch, MeditationProgress};
use storage::repository::{SnapshotRepository, StoreKey};
use tracing::{debug, warn};

use crate::Clock;
use crate::app_services::CatalogPersistence;
use crate::error::StoreError;
use crate::snapshot::SnapshotSlot;

/// Meditation catalog plus the user's favorites, history and playback progress.
pub struct MeditationStore {
    clock: Clock,
    catalog: MeditationCatalog,
    progress: MeditationProgress,
    progress_slot: SnapshotSlot<MeditationProgress>,
    catalog_slot: Option<SnapshotSlot<MeditationCatalog>>,
}

impl MeditationStore {
    /// Load persisted progress and, when catalog persistence is durable, the
    /// edited catalog. Otherwise the catalog starts from the bundled seed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the repository cannot be read.
    pub async fn load(
        repo: Arc<dyn SnapshotRepository>,
        clock: Clock,
        persistence: CatalogPersistence,
    ) -> Result<Self, StoreError> {
        let progress_slot = SnapshotSlot::new(StoreKey::Meditation, Arc::clone(&repo), clock);
        let progress = progress_slot.load_or_else(MeditationProgress::new).await?;

        let (catalog, catalog_slot) = match persistence {
            CatalogPersistence::Ephemeral => (MeditationCatalog::seeded(), None),
            CatalogPersistence::Durable => {
                let slot = SnapshotSlot::new(StoreKey::MeditationCatalog, repo, clock);
                let catalog = slot.load_or_else(MeditationCatalog::seeded).await?;
                (catalog, Some(slot))
            }
        };

        Ok(Self {
            clock,
            catalog,
            progress,
            progress_slot,
            catalog_slot,
        })
    }

    // ─── Catalog reads ──────────────────────────────────────────────────────

    #[must_use]
    pub fn get_meditation(&self, id: &MeditationId) -> Option<&Meditation> {
        self.catalog.get(id)
    }

    #[must_use]
    pub fn all_meditations(&self) -> &[Meditation] {
        self.catalog.all()
    }

    #[must_use]
    pub fn featured(&self) -> Vec<&Meditation> {
        self.catalog.featured()
    }

    #[must_use]
    pub fn search(&self, query: &CatalogQuery) -> Vec<&Meditation> {
        self.catalog.search(query)
    }

    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.catalog.categories()
    }

    #[must_use]
    pub fn catalog(&self) -> &MeditationCatalog {
        &self.catalog
    }

    // ─── Favorites ──────────────────────────────────────────────────────────

    pub async fn add_to_favorites(&mut self, id: MeditationId) {
        debug!(meditation = %id, "add favorite");
        if self.progress.add_favorite(id) {
            self.persist_progress().await;
        }
    }

    pub async fn remove_from_favorites(&mut self, id: &MeditationId) {
        debug!(meditation = %id, "remove favorite");
        if self.progress.remove_favorite(id) {
            self.persist_progress().await;
        }
    }

    #[must_use]
    pub fn is_favorite(&self, id: &MeditationId) -> bool {
        self.progress.is_favorite(id)
    }

    /// Favorites that still exist in the catalog, in the order they were added.
    #[must_use]
    pub fn favorite_meditations(&self) -> Vec<&Meditation> {
        self.progress
            .favorites()
            .iter()
            .filter_map(|id| self.catalog.get(id))
            .collect()
    }

    // ─── History ────────────────────────────────────────────────────────────

    /// Record a play at the current clock time, most recent first.
    pub async fn add_to_history(&mut self, id: MeditationId) {
        let now = self.clock.now();
        debug!(meditation = %id, at = %now, "record play");
        self.progress.record_play(id, now);
        self.persist_progress().await;
    }

    #[must_use]
    pub fn get_last_played(&self, id: &MeditationId) -> Option<DateTime<Utc>> {
        self.progress.last_played(id)
    }

    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        self.progress.history()
    }

    /// Up to `limit` recently played meditations still in the catalog.
    #[must_use]
    pub fn recently_played(&self, limit: usize) -> Vec<(&Meditation, DateTime<Utc>)> {
        self.progress
            .history()
            .iter()
            .filter_map(|entry| {
                self.catalog
                    .get(&entry.meditation_id)
                    .map(|m| (m, entry.last_played))
            })
            .take(limit)
            .collect()
    }

    // ─── Progress ───────────────────────────────────────────────────────────

    /// Store a percentage as given. Callers are expected to clamp.
    /// Non-finite values are dropped with a warning.
    pub async fn update_progress(&mut self, id: MeditationId, percent: f64) {
        debug!(meditation = %id, percent, "update progress");
        if !self.progress.set_progress(id.clone(), percent) {
            warn!(meditation = %id, percent, "ignoring non-finite progress");
            return;
        }
        self.persist_progress().await;
    }

    #[must_use]
    pub fn get_progress(&self, id: &MeditationId) -> f64 {
        self.progress.progress(id)
    }

    /// Player tick: converts elapsed seconds into a clamped percentage of the
    /// meditation's length and stores it. Returns `None` for an unknown id.
    pub async fn record_playback(&mut self, id: &MeditationId, elapsed_secs: u64) -> Option<f64> {
        let minutes = self.catalog.get(id)?.duration_minutes();
        let percent = clamp_percent(playback_percent(elapsed_secs, minutes));
        self.update_progress(id.clone(), percent).await;
        Some(percent)
    }

    #[must_use]
    pub fn progress_state(&self) -> &MeditationProgress {
        &self.progress
    }

    // ─── Admin ──────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns `StoreError::Catalog` if the id is already used.
    pub async fn add_meditation(&mut self, meditation: Meditation) -> Result<(), StoreError> {
        debug!(meditation = %meditation.id(), "admin add meditation");
        self.catalog.insert(meditation)?;
        self.persist_catalog().await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `StoreError::Catalog` for an unknown id or an invalid patch.
    pub async fn update_meditation(
        &mut self,
        id: &MeditationId,
        patch: MeditationPatch,
    ) -> Result<(), StoreError> {
        debug!(meditation = %id, "admin update meditation");
        self.catalog.update(id, patch)?;
        self.persist_catalog().await;
        Ok(())
    }

    /// Removes the meditation from the catalog only. Favorites, history and
    /// progress that reference it are kept.
    pub async fn delete_meditation(&mut self, id: &MeditationId) -> bool {
        debug!(meditation = %id, "admin delete meditation");
        let removed = self.catalog.remove(id);
        if removed {
            self.persist_catalog().await;
        }
        removed
    }

    /// Forget favorites, history and progress, and restore the bundled
    /// catalog. Stored snapshots are removed.
    pub async fn reset(&mut self) {
        debug!("reset meditation store");
        self.progress = MeditationProgress::new();
        self.catalog = MeditationCatalog::seeded();
        self.progress_slot.clear().await;
        if let Some(slot) = &self.catalog_slot {
            slot.clear().await;
        }
    }

    async fn persist_progress(&self) {
        self.progress_slot.persist(&self.progress).await;
    }

    async fn persist_catalog(&self) {
        if let Some(slot) = &self.catalog_slot {
            slot.persist(&self.catalog).await;
        }
    }
}
