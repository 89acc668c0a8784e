//! Browsable content: meditations and courses.
//!
//! Catalogs are plain ordered collections. Admin edits mutate them in place;
//! relations that reference a removed item (favorites, history, enrollments,
//! completions) are left as they are.

mod seed;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    Course, CourseError, CourseId, CoursePatch, Lesson, LessonId, LessonPatch, Meditation,
    MeditationError, MeditationId, MeditationPatch,
};

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("meditation {0} already exists")]
    DuplicateMeditation(MeditationId),

    #[error("meditation {0} not found")]
    MeditationNotFound(MeditationId),

    #[error("course {0} already exists")]
    DuplicateCourse(CourseId),

    #[error("course {0} not found")]
    CourseNotFound(CourseId),

    #[error(transparent)]
    Meditation(#[from] MeditationError),

    #[error(transparent)]
    Course(#[from] CourseError),
}

/// Browse filter used by the list screens.
///
/// `category: None` matches every category. `text` is matched
/// case-insensitively against title and description; empty text matches all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub text: String,
}

impl CatalogQuery {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    fn matches(&self, category: &str, title: &str, description: &str) -> bool {
        if let Some(wanted) = self.category.as_deref() {
            if wanted != category {
                return false;
            }
        }
        if self.text.is_empty() {
            return true;
        }
        let needle = self.text.to_lowercase();
        title.to_lowercase().contains(&needle) || description.to_lowercase().contains(&needle)
    }
}

fn distinct_categories<'a>(categories: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for category in categories {
        if !seen.iter().any(|c| c == category) {
            seen.push(category.to_owned());
        }
    }
    seen
}

//
// ─── MEDITATIONS ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeditationCatalog {
    items: Vec<Meditation>,
}

impl MeditationCatalog {
    #[must_use]
    pub fn new(items: Vec<Meditation>) -> Self {
        Self { items }
    }

    /// The bundled demo meditations.
    #[must_use]
    pub fn seeded() -> Self {
        Self::new(seed::meditations())
    }

    #[must_use]
    pub fn get(&self, id: &MeditationId) -> Option<&Meditation> {
        self.items.iter().find(|m| m.id() == id)
    }

    #[must_use]
    pub fn all(&self) -> &[Meditation] {
        &self.items
    }

    #[must_use]
    pub fn featured(&self) -> Vec<&Meditation> {
        self.items.iter().filter(|m| m.is_featured()).collect()
    }

    #[must_use]
    pub fn search(&self, query: &CatalogQuery) -> Vec<&Meditation> {
        self.items
            .iter()
            .filter(|m| query.matches(m.category(), m.title(), m.description()))
            .collect()
    }

    /// Distinct categories in catalog order.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        distinct_categories(self.items.iter().map(Meditation::category))
    }

    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateMeditation` if the id is taken.
    pub fn insert(&mut self, meditation: Meditation) -> Result<(), CatalogError> {
        if self.get(meditation.id()).is_some() {
            return Err(CatalogError::DuplicateMeditation(meditation.id().clone()));
        }
        self.items.push(meditation);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CatalogError::MeditationNotFound` for an unknown id, or the
    /// patch's validation error.
    pub fn update(&mut self, id: &MeditationId, patch: MeditationPatch) -> Result<(), CatalogError> {
        let meditation = self
            .items
            .iter_mut()
            .find(|m| m.id() == id)
            .ok_or_else(|| CatalogError::MeditationNotFound(id.clone()))?;
        meditation.apply(patch)?;
        Ok(())
    }

    /// Returns `false` if nothing was removed.
    pub fn remove(&mut self, id: &MeditationId) -> bool {
        let before = self.items.len();
        self.items.retain(|m| m.id() != id);
        self.items.len() != before
    }
}

//
// ─── COURSES ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseCatalog {
    items: Vec<Course>,
}

impl CourseCatalog {
    #[must_use]
    pub fn new(items: Vec<Course>) -> Self {
        Self { items }
    }

    /// The bundled demo courses.
    #[must_use]
    pub fn seeded() -> Self {
        Self::new(seed::courses())
    }

    #[must_use]
    pub fn get(&self, id: &CourseId) -> Option<&Course> {
        self.items.iter().find(|c| c.id() == id)
    }

    fn get_mut(&mut self, id: &CourseId) -> Result<&mut Course, CatalogError> {
        self.items
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or_else(|| CatalogError::CourseNotFound(id.clone()))
    }

    #[must_use]
    pub fn all(&self) -> &[Course] {
        &self.items
    }

    #[must_use]
    pub fn featured(&self) -> Vec<&Course> {
        self.items.iter().filter(|c| c.is_featured()).collect()
    }

    #[must_use]
    pub fn search(&self, query: &CatalogQuery) -> Vec<&Course> {
        self.items
            .iter()
            .filter(|c| query.matches(c.category(), c.title(), c.description()))
            .collect()
    }

    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        distinct_categories(self.items.iter().map(Course::category))
    }

    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateCourse` if the id is taken.
    pub fn insert(&mut self, course: Course) -> Result<(), CatalogError> {
        if self.get(course.id()).is_some() {
            return Err(CatalogError::DuplicateCourse(course.id().clone()));
        }
        self.items.push(course);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CatalogError::CourseNotFound` or the patch's validation error.
    pub fn update(&mut self, id: &CourseId, patch: CoursePatch) -> Result<(), CatalogError> {
        self.get_mut(id)?.apply(patch)?;
        Ok(())
    }

    pub fn remove(&mut self, id: &CourseId) -> bool {
        let before = self.items.len();
        self.items.retain(|c| c.id() != id);
        self.items.len() != before
    }

    /// # Errors
    ///
    /// Returns `CatalogError::CourseNotFound` or `CourseError::DuplicateLesson`.
    pub fn add_lesson(&mut self, course_id: &CourseId, lesson: Lesson) -> Result<(), CatalogError> {
        self.get_mut(course_id)?.add_lesson(lesson)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CatalogError::CourseNotFound` or the lesson's update error.
    pub fn update_lesson(
        &mut self,
        course_id: &CourseId,
        lesson_id: &LessonId,
        patch: LessonPatch,
    ) -> Result<(), CatalogError> {
        self.get_mut(course_id)?.update_lesson(lesson_id, patch)?;
        Ok(())
    }

    /// Returns `Ok(false)` if the course exists but has no such lesson.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::CourseNotFound` for an unknown course.
    pub fn remove_lesson(
        &mut self,
        course_id: &CourseId,
        lesson_id: &LessonId,
    ) -> Result<bool, CatalogError> {
        Ok(self.get_mut(course_id)?.remove_lesson(lesson_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LessonDraft, MeditationDraft};

    fn med(id: &str, title: &str, category: &str, featured: bool) -> Meditation {
        Meditation::new(
            MeditationId::new(id).unwrap(),
            MeditationDraft {
                title: title.into(),
                description: format!("About {title}"),
                duration_minutes: 10,
                category: category.into(),
                featured,
                ..MeditationDraft::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn seeded_catalogs_are_not_empty() {
        let meds = MeditationCatalog::seeded();
        let courses = CourseCatalog::seeded();
        assert!(!meds.all().is_empty());
        assert!(!courses.all().is_empty());
        assert!(!meds.featured().is_empty());
        assert!(courses.all().iter().all(|c| !c.lessons().is_empty()));
    }

    #[test]
    fn search_filters_by_category_and_text() {
        let catalog = MeditationCatalog::new(vec![
            med("1", "Star Harmony", "Stellar", true),
            med("2", "Inner Child", "Healing", false),
            med("3", "Starlit Sleep", "Sleep", false),
        ]);

        let all = catalog.search(&CatalogQuery::all());
        assert_eq!(all.len(), 3);

        let stellar = catalog.search(&CatalogQuery::all().category("Stellar"));
        assert_eq!(stellar.len(), 1);

        let star = catalog.search(&CatalogQuery::all().text("STAR"));
        let ids: Vec<&str> = star.iter().map(|m| m.id().as_str()).collect();
        assert_eq!(ids, ["1", "3"]);

        let none = catalog.search(&CatalogQuery::all().category("Healing").text("star"));
        assert!(none.is_empty());
    }

    #[test]
    fn search_matches_description() {
        let catalog = MeditationCatalog::new(vec![med("1", "Calm", "Sleep", false)]);
        assert_eq!(catalog.search(&CatalogQuery::all().text("about calm")).len(), 1);
    }

    #[test]
    fn categories_are_distinct_and_ordered() {
        let catalog = MeditationCatalog::new(vec![
            med("1", "a", "Sleep", false),
            med("2", "b", "Healing", false),
            med("3", "c", "Sleep", false),
        ]);
        assert_eq!(catalog.categories(), ["Sleep", "Healing"]);
    }

    #[test]
    fn insert_update_remove_meditation() {
        let mut catalog = MeditationCatalog::default();
        catalog.insert(med("1", "a", "Sleep", false)).unwrap();
        let err = catalog.insert(med("1", "b", "Sleep", false)).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateMeditation(MeditationId::new("1").unwrap()));

        let id = MeditationId::new("1").unwrap();
        catalog
            .update(
                &id,
                MeditationPatch {
                    featured: Some(true),
                    ..MeditationPatch::default()
                },
            )
            .unwrap();
        assert!(catalog.get(&id).unwrap().is_featured());

        assert!(catalog.remove(&id));
        assert!(!catalog.remove(&id));
        let err = catalog.update(&id, MeditationPatch::default()).unwrap_err();
        assert_eq!(err, CatalogError::MeditationNotFound(id));
    }

    #[test]
    fn lesson_edits_on_unknown_course_fail() {
        let mut catalog = CourseCatalog::default();
        let course_id = CourseId::new("nope").unwrap();
        let lesson = Lesson::new(
            LessonId::new("1").unwrap(),
            LessonDraft {
                title: "x".into(),
                ..LessonDraft::default()
            },
        )
        .unwrap();
        let err = catalog.add_lesson(&course_id, lesson).unwrap_err();
        assert_eq!(err, CatalogError::CourseNotFound(course_id.clone()));
        assert!(
            catalog
                .remove_lesson(&course_id, &LessonId::new("1").unwrap())
                .is_err()
        );
    }

    #[test]
    fn lesson_edits_flow_through_course() {
        let mut catalog = CourseCatalog::seeded();
        let course_id = catalog.all()[0].id().clone();
        let before = catalog.get(&course_id).unwrap().lesson_count();

        let lesson = Lesson::new(
            LessonId::new("extra").unwrap(),
            LessonDraft {
                title: "Bonus".into(),
                ..LessonDraft::default()
            },
        )
        .unwrap();
        catalog.add_lesson(&course_id, lesson).unwrap();
        assert_eq!(catalog.get(&course_id).unwrap().lesson_count(), before + 1);

        assert!(
            catalog
                .remove_lesson(&course_id, &LessonId::new("extra").unwrap())
                .unwrap()
        );
        assert_eq!(catalog.get(&course_id).unwrap().lesson_count(), before);
    }
}
