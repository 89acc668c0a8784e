use std::sync::Arc;

use pleiades_core::CatalogQuery;
use pleiades_core::catalog::CourseCatalog;
use pleiades_core::model::{
    Course, CourseId, CoursePatch, CourseProgress, Lesson, LessonAccess, LessonId, LessonPatch,
};
use storage::repository::{SnapshotRepository, StoreKey};
use tracing::debug;

use crate::Clock;
use crate::app_services::CatalogPersistence;
use crate::error::StoreError;
use crate::snapshot::SnapshotSlot;

/// Course catalog plus the user's enrollments and lesson completions.
pub struct CourseStore {
    catalog: CourseCatalog,
    progress: CourseProgress,
    progress_slot: SnapshotSlot<CourseProgress>,
    catalog_slot: Option<SnapshotSlot<CourseCatalog>>,
}

impl CourseStore {
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the repository cannot be read.
    pub async fn load(
        repo: Arc<dyn SnapshotRepository>,
        clock: Clock,
        persistence: CatalogPersistence,
    ) -> Result<Self, StoreError> {
        let progress_slot = SnapshotSlot::new(StoreKey::Course, Arc::clone(&repo), clock);
        let progress = progress_slot.load_or_else(CourseProgress::new).await?;

        let (catalog, catalog_slot) = match persistence {
            CatalogPersistence::Ephemeral => (CourseCatalog::seeded(), None),
            CatalogPersistence::Durable => {
                let slot = SnapshotSlot::new(StoreKey::CourseCatalog, repo, clock);
                let catalog = slot.load_or_else(CourseCatalog::seeded).await?;
                (catalog, Some(slot))
            }
        };

        Ok(Self {
            catalog,
            progress,
            progress_slot,
            catalog_slot,
        })
    }

    // ─── Catalog reads ──────────────────────────────────────────────────────

    #[must_use]
    pub fn get_course(&self, id: &CourseId) -> Option<&Course> {
        self.catalog.get(id)
    }

    #[must_use]
    pub fn all_courses(&self) -> &[Course] {
        self.catalog.all()
    }

    #[must_use]
    pub fn featured(&self) -> Vec<&Course> {
        self.catalog.featured()
    }

    #[must_use]
    pub fn search(&self, query: &CatalogQuery) -> Vec<&Course> {
        self.catalog.search(query)
    }

    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.catalog.categories()
    }

    #[must_use]
    pub fn catalog(&self) -> &CourseCatalog {
        &self.catalog
    }

    // ─── Enrollment ─────────────────────────────────────────────────────────

    pub async fn enroll_in_course(&mut self, id: CourseId) {
        debug!(course = %id, "enroll");
        if self.progress.enroll(id) {
            self.persist_progress().await;
        }
    }

    /// Completed lessons are kept.
    pub async fn unenroll_from_course(&mut self, id: &CourseId) {
        debug!(course = %id, "unenroll");
        if self.progress.unenroll(id) {
            self.persist_progress().await;
        }
    }

    #[must_use]
    pub fn is_enrolled(&self, id: &CourseId) -> bool {
        self.progress.is_enrolled(id)
    }

    /// Enrolled courses still present in the catalog.
    #[must_use]
    pub fn enrolled_courses(&self) -> Vec<&Course> {
        self.progress
            .enrolled()
            .iter()
            .filter_map(|id| self.catalog.get(id))
            .collect()
    }

    // ─── Lessons ────────────────────────────────────────────────────────────

    /// Record a finished lesson. Repeats are no-ops.
    pub async fn complete_lesson(&mut self, course_id: CourseId, lesson_id: LessonId) {
        debug!(course = %course_id, lesson = %lesson_id, "complete lesson");
        if self.progress.complete_lesson(course_id, lesson_id) {
            self.persist_progress().await;
        }
    }

    /// Complete a lesson only if it is currently reachable.
    ///
    /// Returns the lesson's access after the call: `Completed` on success,
    /// `Locked` if the course must be joined first, `None` for an unknown
    /// course or lesson. Nothing is recorded unless the result is `Completed`.
    pub async fn complete_unlocked_lesson(
        &mut self,
        course_id: &CourseId,
        lesson_id: &LessonId,
    ) -> Option<LessonAccess> {
        match self.lesson_access(course_id, lesson_id)? {
            LessonAccess::Locked => {
                debug!(course = %course_id, lesson = %lesson_id, "lesson locked");
                Some(LessonAccess::Locked)
            }
            LessonAccess::Unlocked => {
                self.complete_lesson(course_id.clone(), lesson_id.clone()).await;
                Some(LessonAccess::Completed)
            }
            LessonAccess::Completed => Some(LessonAccess::Completed),
        }
    }

    #[must_use]
    pub fn is_lesson_completed(&self, course_id: &CourseId, lesson_id: &LessonId) -> bool {
        self.progress.is_lesson_completed(course_id, lesson_id)
    }

    /// Completion percentage; 0 for an unknown course or one without lessons.
    #[must_use]
    pub fn get_course_progress(&self, course_id: &CourseId) -> f64 {
        self.catalog
            .get(course_id)
            .map_or(0.0, |course| self.progress.course_progress(course))
    }

    /// `None` if the course or lesson is unknown.
    #[must_use]
    pub fn lesson_access(&self, course_id: &CourseId, lesson_id: &LessonId) -> Option<LessonAccess> {
        let course = self.catalog.get(course_id)?;
        let lesson = course.lesson(lesson_id)?;
        Some(self.progress.lesson_access(course, lesson))
    }

    #[must_use]
    pub fn next_lesson(&self, course_id: &CourseId, lesson_id: &LessonId) -> Option<&Lesson> {
        self.catalog.get(course_id)?.next_lesson(lesson_id)
    }

    #[must_use]
    pub fn progress_state(&self) -> &CourseProgress {
        &self.progress
    }

    // ─── Admin ──────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns `StoreError::Catalog` if the id is already used.
    pub async fn add_course(&mut self, course: Course) -> Result<(), StoreError> {
        debug!(course = %course.id(), "admin add course");
        self.catalog.insert(course)?;
        self.persist_catalog().await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `StoreError::Catalog` for an unknown id or an invalid patch.
    pub async fn update_course(&mut self, id: &CourseId, patch: CoursePatch) -> Result<(), StoreError> {
        debug!(course = %id, "admin update course");
        self.catalog.update(id, patch)?;
        self.persist_catalog().await;
        Ok(())
    }

    /// Removes the course from the catalog. Enrollments and completions that
    /// reference it are kept.
    pub async fn delete_course(&mut self, id: &CourseId) -> bool {
        debug!(course = %id, "admin delete course");
        let removed = self.catalog.remove(id);
        if removed {
            self.persist_catalog().await;
        }
        removed
    }

    /// # Errors
    ///
    /// Returns `StoreError::Catalog` for an unknown course or a duplicate lesson.
    pub async fn add_lesson(&mut self, course_id: &CourseId, lesson: Lesson) -> Result<(), StoreError> {
        debug!(course = %course_id, lesson = %lesson.id(), "admin add lesson");
        self.catalog.add_lesson(course_id, lesson)?;
        self.persist_catalog().await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `StoreError::Catalog` for an unknown course or lesson, or an
    /// invalid patch.
    pub async fn update_lesson(
        &mut self,
        course_id: &CourseId,
        lesson_id: &LessonId,
        patch: LessonPatch,
    ) -> Result<(), StoreError> {
        debug!(course = %course_id, lesson = %lesson_id, "admin update lesson");
        self.catalog.update_lesson(course_id, lesson_id, patch)?;
        self.persist_catalog().await;
        Ok(())
    }

    /// Returns `Ok(false)` if the course has no such lesson.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Catalog` for an unknown course.
    pub async fn delete_lesson(
        &mut self,
        course_id: &CourseId,
        lesson_id: &LessonId,
    ) -> Result<bool, StoreError> {
        debug!(course = %course_id, lesson = %lesson_id, "admin delete lesson");
        let removed = self.catalog.remove_lesson(course_id, lesson_id)?;
        if removed {
            self.persist_catalog().await;
        }
        Ok(removed)
    }

    /// Forget enrollments and completions, and restore the bundled catalog.
    pub async fn reset(&mut self) {
        debug!("reset course store");
        self.progress = CourseProgress::new();
        self.catalog = CourseCatalog::seeded();
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
