mod course;
mod ids;
mod meditation;
pub mod progress;
mod session;
mod user;

pub use ids::{CourseId, LessonId, MeditationId, ParseIdError, UserId};

pub use course::{Course, CourseDraft, CourseError, CoursePatch, Lesson, LessonDraft, LessonPatch};
pub use meditation::{Meditation, MeditationDraft, MeditationError, MeditationPatch};
pub use progress::{
    CourseProgress, HistoryEntry, LessonAccess, LessonCompletion, MeditationProgress,
};
pub use session::{ADMIN_PASSWORD, MIN_PASSWORD_LEN, SessionState};
pub use user::{Role, User, UserPatch};
