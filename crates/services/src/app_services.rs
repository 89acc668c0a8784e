use std::str::FromStr;
use std::sync::Arc;

use storage::repository::{SnapshotRepository, Storage};
use tracing::info;

use crate::Clock;
use crate::course_store::CourseStore;
use crate::error::AppServicesError;
use crate::meditation_store::MeditationStore;
use crate::session_store::SessionStore;

/// Whether admin catalog edits outlive the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogPersistence {
    /// Edits live in memory; every launch starts from the bundled catalog.
    #[default]
    Ephemeral,
    /// Edited catalogs are snapshotted like user progress.
    Durable,
}

impl FromStr for CatalogPersistence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ephemeral" | "memory" | "false" | "0" => Ok(Self::Ephemeral),
            "durable" | "persist" | "true" | "1" => Ok(Self::Durable),
            other => Err(format!("unknown catalog persistence: {other}")),
        }
    }
}

/// The three stores, loaded from one snapshot repository.
pub struct AppServices {
    session: SessionStore,
    meditations: MeditationStore,
    courses: CourseStore,
}

impl AppServices {
    /// Load every store from the given storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Store` if any snapshot cannot be read.
    pub async fn new(
        storage: &Storage,
        clock: Clock,
        catalog_persistence: CatalogPersistence,
    ) -> Result<Self, AppServicesError> {
        let repo: &Arc<dyn SnapshotRepository> = &storage.snapshots;
        let session = SessionStore::load(Arc::clone(repo), clock).await?;
        let meditations =
            MeditationStore::load(Arc::clone(repo), clock, catalog_persistence).await?;
        let courses = CourseStore::load(Arc::clone(repo), clock, catalog_persistence).await?;

        info!(
            signed_in = session.is_authenticated(),
            meditations = meditations.all_meditations().len(),
            courses = courses.all_courses().len(),
            ?catalog_persistence,
            "stores loaded"
        );

        Ok(Self {
            session,
            meditations,
            courses,
        })
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or loading fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        catalog_persistence: CatalogPersistence,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::new(&storage, clock, catalog_persistence).await
    }

    /// Return every store to its first-launch state.
    pub async fn reset(&mut self) {
        self.session.reset().await;
        self.meditations.reset().await;
        self.courses.reset().await;
        info!("all stores reset");
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionStore {
        &mut self.session
    }

    #[must_use]
    pub fn meditations(&self) -> &MeditationStore {
        &self.meditations
    }

    pub fn meditations_mut(&mut self) -> &mut MeditationStore {
        &mut self.meditations
    }

    #[must_use]
    pub fn courses(&self) -> &CourseStore {
        &self.courses
    }

    pub fn courses_mut(&mut self) -> &mut CourseStore {
        &mut self.courses
    }
}
