use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{CourseId, LessonId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("course category cannot be empty")]
    EmptyCategory,

    #[error("course rating must be in [0, 5], got {0}")]
    InvalidRating(f32),

    #[error("lesson title cannot be empty")]
    EmptyLessonTitle,

    #[error("lesson {0} already exists in this course")]
    DuplicateLesson(LessonId),

    #[error("lesson {0} not found in this course")]
    LessonNotFound(LessonId),
}

fn validate_rating(rating: f32) -> Result<f32, CourseError> {
    if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
        return Err(CourseError::InvalidRating(rating));
    }
    Ok(rating)
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// Unvalidated input for a lesson.
#[derive(Debug, Clone, Default)]
pub struct LessonDraft {
    pub title: String,
    pub duration_label: String,
    pub description: String,
    pub video_url: Option<String>,
    pub locked: bool,
}

/// A single lesson inside a course.
///
/// Locked lessons are only reachable once the user enrolls in the course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    id: LessonId,
    title: String,
    duration_label: String,
    description: String,
    video_url: Option<String>,
    locked: bool,
}

impl Lesson {
    /// Creates a new lesson.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyLessonTitle` if the title is blank.
    pub fn new(id: LessonId, draft: LessonDraft) -> Result<Self, CourseError> {
        let title = draft.title.trim().to_owned();
        if title.is_empty() {
            return Err(CourseError::EmptyLessonTitle);
        }
        Ok(Self {
            id,
            title,
            duration_label: draft.duration_label.trim().to_owned(),
            description: draft.description.trim().to_owned(),
            video_url: draft.video_url.filter(|url| !url.trim().is_empty()),
            locked: draft.locked,
        })
    }

    /// Applies a partial update. The id is never changed.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyLessonTitle` if the patch blanks the title.
    pub fn apply(&mut self, patch: LessonPatch) -> Result<(), CourseError> {
        if let Some(title) = patch.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(CourseError::EmptyLessonTitle);
            }
            self.title = title.to_owned();
        }
        if let Some(label) = patch.duration_label {
            self.duration_label = label.trim().to_owned();
        }
        if let Some(description) = patch.description {
            self.description = description.trim().to_owned();
        }
        if let Some(video_url) = patch.video_url {
            self.video_url = video_url;
        }
        if let Some(locked) = patch.locked {
            self.locked = locked;
        }
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn duration_label(&self) -> &str {
        &self.duration_label
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref()
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

/// Field-level partial update for a lesson.
///
/// `video_url: Some(None)` clears the video.
#[derive(Debug, Clone, Default)]
pub struct LessonPatch {
    pub title: Option<String>,
    pub duration_label: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<Option<String>>,
    pub locked: Option<bool>,
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// Unvalidated input for a new course.
#[derive(Debug, Clone, Default)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub rating: f32,
    pub image_url: String,
    pub category: String,
    pub featured: bool,
    pub lessons: Vec<Lesson>,
}

/// A course made of an ordered list of lessons.
///
/// `lesson_count` is catalog metadata shown on cards. It is adjusted on
/// lesson add/remove but is not recomputed from `lessons`, so seeded content
/// may advertise more lessons than are published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    id: CourseId,
    title: String,
    description: String,
    lesson_count: u32,
    rating: f32,
    image_url: String,
    category: String,
    featured: bool,
    lessons: Vec<Lesson>,
}

impl Course {
    /// Creates a new course. `lesson_count` starts at the number of lessons given.
    ///
    /// # Errors
    ///
    /// Returns `CourseError` for a blank title or category, an out of range
    /// rating, or duplicate lesson ids.
    pub fn new(id: CourseId, draft: CourseDraft) -> Result<Self, CourseError> {
        let count = u32::try_from(draft.lessons.len()).unwrap_or(u32::MAX);
        Self::with_lesson_count(id, draft, count)
    }

    /// Creates a course with an explicit advertised lesson count.
    ///
    /// # Errors
    ///
    /// Same as [`Course::new`].
    pub fn with_lesson_count(
        id: CourseId,
        draft: CourseDraft,
        lesson_count: u32,
    ) -> Result<Self, CourseError> {
        let title = draft.title.trim().to_owned();
        if title.is_empty() {
            return Err(CourseError::EmptyTitle);
        }
        let category = draft.category.trim().to_owned();
        if category.is_empty() {
            return Err(CourseError::EmptyCategory);
        }
        let rating = validate_rating(draft.rating)?;

        for (idx, lesson) in draft.lessons.iter().enumerate() {
            if draft.lessons[..idx].iter().any(|l| l.id == lesson.id) {
                return Err(CourseError::DuplicateLesson(lesson.id.clone()));
            }
        }

        Ok(Self {
            id,
            title,
            description: draft.description.trim().to_owned(),
            lesson_count,
            rating,
            image_url: draft.image_url,
            category,
            featured: draft.featured,
            lessons: draft.lessons,
        })
    }

    /// Applies a partial update to the course metadata.
    ///
    /// # Errors
    ///
    /// Returns `CourseError` if the patch is invalid; nothing is changed then.
    pub fn apply(&mut self, patch: CoursePatch) -> Result<(), CourseError> {
        if let Some(title) = patch.title.as_deref() {
            if title.trim().is_empty() {
                return Err(CourseError::EmptyTitle);
            }
        }
        if let Some(category) = patch.category.as_deref() {
            if category.trim().is_empty() {
                return Err(CourseError::EmptyCategory);
            }
        }
        if let Some(rating) = patch.rating {
            validate_rating(rating)?;
        }

        if let Some(title) = patch.title {
            self.title = title.trim().to_owned();
        }
        if let Some(description) = patch.description {
            self.description = description.trim().to_owned();
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
        if let Some(url) = patch.image_url {
            self.image_url = url;
        }
        if let Some(category) = patch.category {
            self.category = category.trim().to_owned();
        }
        if let Some(featured) = patch.featured {
            self.featured = featured;
        }
        Ok(())
    }

    /// Appends a lesson and bumps the advertised lesson count.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::DuplicateLesson` if the id is already used.
    pub fn add_lesson(&mut self, lesson: Lesson) -> Result<(), CourseError> {
        if self.lesson(&lesson.id).is_some() {
            return Err(CourseError::DuplicateLesson(lesson.id));
        }
        self.lessons.push(lesson);
        self.lesson_count = self.lesson_count.saturating_add(1);
        Ok(())
    }

    /// Updates a lesson in place.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::LessonNotFound` for an unknown lesson, or the
    /// lesson's own validation error.
    pub fn update_lesson(&mut self, lesson_id: &LessonId, patch: LessonPatch) -> Result<(), CourseError> {
        let lesson = self
            .lessons
            .iter_mut()
            .find(|l| &l.id == lesson_id)
            .ok_or_else(|| CourseError::LessonNotFound(lesson_id.clone()))?;
        lesson.apply(patch)
    }

    /// Removes a lesson. Returns `false` when the lesson was not present.
    pub fn remove_lesson(&mut self, lesson_id: &LessonId) -> bool {
        let before = self.lessons.len();
        self.lessons.retain(|l| &l.id != lesson_id);
        let removed = self.lessons.len() != before;
        if removed {
            self.lesson_count = self.lesson_count.saturating_sub(1);
        }
        removed
    }

    #[must_use]
    pub fn lesson(&self, lesson_id: &LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|l| &l.id == lesson_id)
    }

    /// The lesson after `lesson_id`, or `None` at the end of the course
    /// (or for an unknown lesson).
    #[must_use]
    pub fn next_lesson(&self, lesson_id: &LessonId) -> Option<&Lesson> {
        let idx = self.lessons.iter().position(|l| &l.id == lesson_id)?;
        self.lessons.get(idx + 1)
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &CourseId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn lesson_count(&self) -> u32 {
        self.lesson_count
    }

    #[must_use]
    pub fn rating(&self) -> f32 {
        self.rating
    }

    #[must_use]
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn is_featured(&self) -> bool {
        self.featured
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }
}

/// Field-level partial update for course metadata. Lessons are edited
/// through the dedicated lesson methods.
#[derive(Debug, Clone, Default)]
pub struct CoursePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub rating: Option<f32>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub featured: Option<bool>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
