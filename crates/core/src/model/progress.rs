use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::course::{Course, Lesson};
use crate::model::ids::{CourseId, LessonId, MeditationId};

/// Clamps a percentage into `[0, 100]`. NaN becomes 0.
#[must_use]
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// Playback position as a percentage of the meditation length.
///
/// A zero-minute meditation is treated as one minute long.
#[must_use]
pub fn playback_percent(elapsed_secs: u64, duration_minutes: u32) -> f64 {
    let total_secs = f64::from(duration_minutes.max(1)) * 60.0;
    #[allow(clippy::cast_precision_loss)]
    let elapsed = elapsed_secs as f64;
    clamp_percent(elapsed / total_secs * 100.0)
}

//
// ─── MEDITATIONS ───────────────────────────────────────────────────────────────
//

/// One play of a meditation; only the latest play per meditation is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub meditation_id: MeditationId,
    pub last_played: DateTime<Utc>,
}

/// Per-user relations to meditations: favorites, play history and progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeditationProgress {
    favorites: Vec<MeditationId>,
    history: Vec<HistoryEntry>,
    progress: BTreeMap<MeditationId, f64>,
}

impl MeditationProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the id was newly added.
    pub fn add_favorite(&mut self, id: MeditationId) -> bool {
        if self.favorites.contains(&id) {
            return false;
        }
        self.favorites.push(id);
        true
    }

    /// Returns `true` if the id was present.
    pub fn remove_favorite(&mut self, id: &MeditationId) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|fav| fav != id);
        self.favorites.len() != before
    }

    #[must_use]
    pub fn is_favorite(&self, id: &MeditationId) -> bool {
        self.favorites.contains(id)
    }

    /// Favorites in the order they were added.
    #[must_use]
    pub fn favorites(&self) -> &[MeditationId] {
        &self.favorites
    }

    /// Records a play: drops any older entry for `id` and puts a fresh one first.
    pub fn record_play(&mut self, id: MeditationId, at: DateTime<Utc>) {
        self.history.retain(|entry| entry.meditation_id != id);
        self.history.insert(
            0,
            HistoryEntry {
                meditation_id: id,
                last_played: at,
            },
        );
    }

    #[must_use]
    pub fn last_played(&self, id: &MeditationId) -> Option<DateTime<Utc>> {
        self.history
            .iter()
            .find(|entry| &entry.meditation_id == id)
            .map(|entry| entry.last_played)
    }

    /// Most recent first.
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Overwrites the stored percentage. Callers clamp; last write wins.
    ///
    /// NaN and infinities are ignored and `false` is returned, since they
    /// cannot be written to a snapshot.
    pub fn set_progress(&mut self, id: MeditationId, percent: f64) -> bool {
        if !percent.is_finite() {
            return false;
        }
        self.progress.insert(id, percent);
        true
    }

    /// Stored percentage, or 0 when nothing was recorded.
    #[must_use]
    pub fn progress(&self, id: &MeditationId) -> f64 {
        self.progress.get(id).copied().unwrap_or(0.0)
    }
}

//
// ─── COURSES ───────────────────────────────────────────────────────────────────
//

/// A finished lesson. Completions are never removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LessonCompletion {
    pub course_id: CourseId,
    pub lesson_id: LessonId,
}

/// Where a user stands with a single lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonAccess {
    /// Locked lesson in a course the user is not enrolled in.
    Locked,
    Unlocked,
    Completed,
}

/// Per-user relations to courses: enrollments and lesson completions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseProgress {
    enrolled: Vec<CourseId>,
    completed: Vec<LessonCompletion>,
}

impl CourseProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the user was not enrolled before.
    pub fn enroll(&mut self, id: CourseId) -> bool {
        if self.enrolled.contains(&id) {
            return false;
        }
        self.enrolled.push(id);
        true
    }

    /// Leaves completion records in place.
    pub fn unenroll(&mut self, id: &CourseId) -> bool {
        let before = self.enrolled.len();
        self.enrolled.retain(|enrolled| enrolled != id);
        self.enrolled.len() != before
    }

    #[must_use]
    pub fn is_enrolled(&self, id: &CourseId) -> bool {
        self.enrolled.contains(id)
    }

    #[must_use]
    pub fn enrolled(&self) -> &[CourseId] {
        &self.enrolled
    }

    /// Returns `true` if the pair was newly recorded.
    pub fn complete_lesson(&mut self, course_id: CourseId, lesson_id: LessonId) -> bool {
        if self.is_lesson_completed(&course_id, &lesson_id) {
            return false;
        }
        self.completed.push(LessonCompletion {
            course_id,
            lesson_id,
        });
        true
    }

    #[must_use]
    pub fn is_lesson_completed(&self, course_id: &CourseId, lesson_id: &LessonId) -> bool {
        self.completed
            .iter()
            .any(|c| &c.course_id == course_id && &c.lesson_id == lesson_id)
    }

    #[must_use]
    pub fn completions(&self) -> &[LessonCompletion] {
        &self.completed
    }

    /// Number of recorded completions for a course.
    #[must_use]
    pub fn completed_count(&self, course_id: &CourseId) -> usize {
        self.completed
            .iter()
            .filter(|c| &c.course_id == course_id)
            .count()
    }

    /// Percentage of the course's lessons that are completed.
    ///
    /// Counts every completion recorded under the course id, including ones
    /// for lessons since removed from the catalog. The result is therefore not
    /// capped at 100. A course without lessons reports 0.
    #[must_use]
    pub fn course_progress(&self, course: &Course) -> f64 {
        let total = course.lessons().len();
        if total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.completed_count(course.id()) as f64 / total as f64;
        ratio * 100.0
    }

    /// Lesson state: completed wins, otherwise unlocked when the user is
    /// enrolled or the lesson is free.
    #[must_use]
    pub fn lesson_access(&self, course: &Course, lesson: &Lesson) -> LessonAccess {
        if self.is_lesson_completed(course.id(), lesson.id()) {
            LessonAccess::Completed
        } else if !lesson.is_locked() || self.is_enrolled(course.id()) {
            LessonAccess::Unlocked
        } else {
            LessonAccess::Locked
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
