use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use pleiades_core::CatalogQuery;
use pleiades_core::model::{
    Course, CourseDraft, CourseId, Lesson, LessonAccess, LessonDraft, LessonId, MeditationDraft,
    MeditationId, Meditation, MeditationPatch, Role,
};
use pleiades_core::time::{fixed_clock, fixed_now};
use services::{AppServices, CatalogPersistence, Clock, CourseStore, MeditationStore, SessionStore};
use storage::repository::{
    InMemoryRepository, SnapshotRecord, SnapshotRepository, Storage, StorageError, StoreKey,
};

fn mid(id: &str) -> MeditationId {
    MeditationId::new(id).unwrap()
}

fn cid(id: &str) -> CourseId {
    CourseId::new(id).unwrap()
}

fn lid(id: &str) -> LessonId {
    LessonId::new(id).unwrap()
}

fn repo_arc(repo: &InMemoryRepository) -> Arc<dyn SnapshotRepository> {
    Arc::new(repo.clone())
}

fn two_lesson_course(id: &str) -> Course {
    let lessons = ["a", "b"]
        .iter()
        .map(|l| {
            Lesson::new(
                lid(l),
                LessonDraft {
                    title: format!("Lesson {l}"),
                    locked: *l == "b",
                    ..LessonDraft::default()
                },
            )
            .unwrap()
        })
        .collect();
    Course::new(
        cid(id),
        CourseDraft {
            title: "Two lessons".into(),
            category: "Beginners".into(),
            rating: 4.0,
            lessons,
            ..CourseDraft::default()
        },
    )
    .unwrap()
}

/// Repository whose writes always fail.
#[derive(Clone, Default)]
struct ReadOnlyRepository {
    inner: InMemoryRepository,
}

#[async_trait]
impl SnapshotRepository for ReadOnlyRepository {
    async fn load(&self, key: StoreKey) -> Result<Option<SnapshotRecord>, StorageError> {
        self.inner.load(key).await
    }

    async fn save(&self, _record: &SnapshotRecord) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk full".into()))
    }

    async fn clear(&self, _key: StoreKey) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk full".into()))
    }
}

#[tokio::test]
async fn favorites_are_idempotent_and_persisted() {
    let repo = InMemoryRepository::new();
    let mut store = MeditationStore::load(repo_arc(&repo), fixed_clock(), CatalogPersistence::Ephemeral)
        .await
        .unwrap();

    assert!(!store.is_favorite(&mid("1")));
    store.add_to_favorites(mid("1")).await;
    store.add_to_favorites(mid("1")).await;
    store.add_to_favorites(mid("2")).await;
    assert!(store.is_favorite(&mid("1")));
    assert_eq!(store.progress_state().favorites().len(), 2);

    store.remove_from_favorites(&mid("2")).await;
    assert!(!store.is_favorite(&mid("2")));

    let reloaded = MeditationStore::load(repo_arc(&repo), fixed_clock(), CatalogPersistence::Ephemeral)
        .await
        .unwrap();
    assert!(reloaded.is_favorite(&mid("1")));
    assert!(!reloaded.is_favorite(&mid("2")));
    let ids: Vec<&str> = reloaded.favorite_meditations().iter().map(|m| m.id().as_str()).collect();
    assert_eq!(ids, ["1"]);
}

#[tokio::test]
async fn history_keeps_one_entry_per_meditation() {
    let repo = InMemoryRepository::new();
    let mut clock = fixed_clock();
    let mut store = MeditationStore::load(repo_arc(&repo), clock, CatalogPersistence::Ephemeral)
        .await
        .unwrap();
    store.add_to_history(mid("1")).await;
    store.add_to_history(mid("2")).await;

    // a store built on an advanced clock stamps later plays
    clock.advance(Duration::minutes(5));
    let mut later = MeditationStore::load(repo_arc(&repo), clock, CatalogPersistence::Ephemeral)
        .await
        .unwrap();
    later.add_to_history(mid("1")).await;

    let history = later.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].meditation_id, mid("1"));
    assert_eq!(history[0].last_played, fixed_now() + Duration::minutes(5));
    assert_eq!(later.get_last_played(&mid("1")), Some(fixed_now() + Duration::minutes(5)));
    assert_eq!(later.get_last_played(&mid("9")), None);

    let recent = later.recently_played(1);
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].0.id(), &mid("1"));
}

#[tokio::test]
async fn progress_is_stored_as_given() {
    let repo = InMemoryRepository::new();
    let mut store = MeditationStore::load(repo_arc(&repo), fixed_clock(), CatalogPersistence::Ephemeral)
        .await
        .unwrap();

    assert!((store.get_progress(&mid("1")) - 0.0).abs() < f64::EPSILON);
    store.update_progress(mid("1"), 120.0).await;
    assert!((store.get_progress(&mid("1")) - 120.0).abs() < f64::EPSILON);
    store.update_progress(mid("1"), 40.0).await;
    assert!((store.get_progress(&mid("1")) - 40.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn playback_ticks_are_clamped() {
    let repo = InMemoryRepository::new();
    let mut store = MeditationStore::load(repo_arc(&repo), fixed_clock(), CatalogPersistence::Ephemeral)
        .await
        .unwrap();
    // seeded meditation 1 is 15 minutes long
    let half = store.record_playback(&mid("1"), 450).await.unwrap();
    assert!((half - 50.0).abs() < 1e-9);
    let done = store.record_playback(&mid("1"), 10_000).await.unwrap();
    assert!((done - 100.0).abs() < 1e-9);
    assert!(store.record_playback(&mid("missing"), 10).await.is_none());
}

#[tokio::test]
async fn deleting_a_meditation_keeps_relations() {
    let repo = InMemoryRepository::new();
    let mut store = MeditationStore::load(repo_arc(&repo), fixed_clock(), CatalogPersistence::Ephemeral)
        .await
        .unwrap();
    store.add_to_favorites(mid("1")).await;
    store.update_progress(mid("1"), 30.0).await;

    assert!(store.delete_meditation(&mid("1")).await);
    assert!(!store.delete_meditation(&mid("1")).await);
    assert!(store.get_meditation(&mid("1")).is_none());

    assert!(store.is_favorite(&mid("1")));
    assert!((store.get_progress(&mid("1")) - 30.0).abs() < f64::EPSILON);
    assert!(store.favorite_meditations().is_empty());
}

#[tokio::test]
async fn ephemeral_catalog_edits_reset_on_restart() {
    let repo = InMemoryRepository::new();
    let mut store = MeditationStore::load(repo_arc(&repo), fixed_clock(), CatalogPersistence::Ephemeral)
        .await
        .unwrap();
    store
        .update_meditation(
            &mid("1"),
            MeditationPatch {
                title: Some("Renamed".into()),
                ..MeditationPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(store.get_meditation(&mid("1")).unwrap().title(), "Renamed");

    let reloaded = MeditationStore::load(repo_arc(&repo), fixed_clock(), CatalogPersistence::Ephemeral)
        .await
        .unwrap();
    assert_ne!(reloaded.get_meditation(&mid("1")).unwrap().title(), "Renamed");
    assert!(repo.load(StoreKey::MeditationCatalog).await.unwrap().is_none());
}

#[tokio::test]
async fn durable_catalog_edits_survive_restart() {
    let repo = InMemoryRepository::new();
    let mut store = MeditationStore::load(repo_arc(&repo), fixed_clock(), CatalogPersistence::Durable)
        .await
        .unwrap();
    let fresh = Meditation::new(
        mid("100"),
        MeditationDraft {
            title: "Morning Sun".into(),
            category: "Energy".into(),
            duration_minutes: 5,
            featured: true,
            ..MeditationDraft::default()
        },
    )
    .unwrap();
    store.add_meditation(fresh.clone()).await.unwrap();
    assert!(store.add_meditation(fresh).await.is_err());

    let reloaded = MeditationStore::load(repo_arc(&repo), fixed_clock(), CatalogPersistence::Durable)
        .await
        .unwrap();
    assert_eq!(reloaded.get_meditation(&mid("100")).unwrap().title(), "Morning Sun");
    assert!(reloaded.featured().iter().any(|m| m.id() == &mid("100")));
}

#[tokio::test]
async fn course_progress_follows_completions() {
    let repo = InMemoryRepository::new();
    let mut store = CourseStore::load(repo_arc(&repo), fixed_clock(), CatalogPersistence::Ephemeral)
        .await
        .unwrap();
    store.add_course(two_lesson_course("x")).await.unwrap();

    assert!((store.get_course_progress(&cid("x")) - 0.0).abs() < f64::EPSILON);
    assert!((store.get_course_progress(&cid("unknown")) - 0.0).abs() < f64::EPSILON);

    store.complete_lesson(cid("x"), lid("a")).await;
    store.complete_lesson(cid("x"), lid("a")).await;
    assert!((store.get_course_progress(&cid("x")) - 50.0).abs() < f64::EPSILON);

    store.complete_lesson(cid("x"), lid("b")).await;
    assert!((store.get_course_progress(&cid("x")) - 100.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn empty_course_reports_zero_progress() {
    let repo = InMemoryRepository::new();
    let mut store = CourseStore::load(repo_arc(&repo), fixed_clock(), CatalogPersistence::Ephemeral)
        .await
        .unwrap();
    let empty = Course::new(
        cid("empty"),
        CourseDraft {
            title: "Nothing yet".into(),
            category: "Beginners".into(),
            ..CourseDraft::default()
        },
    )
    .unwrap();
    store.add_course(empty).await.unwrap();
    assert!((store.get_course_progress(&cid("empty")) - 0.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn enrollment_unlocks_lessons_and_persists() {
    let repo = InMemoryRepository::new();
    let mut store = CourseStore::load(repo_arc(&repo), fixed_clock(), CatalogPersistence::Ephemeral)
        .await
        .unwrap();
    // seeded course 1: lesson 1-1 free, 1-3 locked
    assert_eq!(store.lesson_access(&cid("1"), &lid("1-1")), Some(LessonAccess::Unlocked));
    assert_eq!(store.lesson_access(&cid("1"), &lid("1-3")), Some(LessonAccess::Locked));
    assert_eq!(store.lesson_access(&cid("1"), &lid("nope")), None);

    store.enroll_in_course(cid("1")).await;
    store.enroll_in_course(cid("1")).await;
    assert_eq!(store.progress_state().enrolled().len(), 1);
    assert_eq!(store.lesson_access(&cid("1"), &lid("1-3")), Some(LessonAccess::Unlocked));

    store.complete_lesson(cid("1"), lid("1-3")).await;
    store.unenroll_from_course(&cid("1")).await;

    let reloaded = CourseStore::load(repo_arc(&repo), fixed_clock(), CatalogPersistence::Ephemeral)
        .await
        .unwrap();
    assert!(!reloaded.is_enrolled(&cid("1")));
    assert!(reloaded.is_lesson_completed(&cid("1"), &lid("1-3")));
    assert_eq!(reloaded.lesson_access(&cid("1"), &lid("1-3")), Some(LessonAccess::Completed));
    assert_eq!(
        reloaded.next_lesson(&cid("1"), &lid("1-1")).map(|l| l.id().as_str()),
        Some("1-2")
    );
}

#[tokio::test]
async fn lesson_admin_edits_adjust_lesson_count() {
    let repo = InMemoryRepository::new();
    let mut store = CourseStore::load(repo_arc(&repo), fixed_clock(), CatalogPersistence::Ephemeral)
        .await
        .unwrap();
    store.add_course(two_lesson_course("x")).await.unwrap();

    let extra = Lesson::new(
        lid("c"),
        LessonDraft {
            title: "Extra".into(),
            ..LessonDraft::default()
        },
    )
    .unwrap();
    store.add_lesson(&cid("x"), extra).await.unwrap();
    assert_eq!(store.get_course(&cid("x")).unwrap().lesson_count(), 3);

    assert!(store.delete_lesson(&cid("x"), &lid("a")).await.unwrap());
    assert!(!store.delete_lesson(&cid("x"), &lid("a")).await.unwrap());
    assert_eq!(store.get_course(&cid("x")).unwrap().lesson_count(), 2);
    assert!(store.delete_lesson(&cid("missing"), &lid("a")).await.is_err());

    assert!(store.delete_course(&cid("x")).await);
    assert!(store.get_course(&cid("x")).is_none());
}

#[tokio::test]
async fn search_combines_category_and_text() {
    let repo = InMemoryRepository::new();
    let store = CourseStore::load(repo_arc(&repo), fixed_clock(), CatalogPersistence::Ephemeral)
        .await
        .unwrap();
    let healing = store.search(&CatalogQuery::all().category("Healing"));
    assert!(healing.iter().all(|c| c.category() == "Healing"));
    assert!(!healing.is_empty());
    assert!(store.search(&CatalogQuery::all().text("zzz-no-match")).is_empty());
    assert!(store.categories().contains(&"Astrology".to_owned()));
}

#[tokio::test]
async fn admin_login_rules() {
    let repo = InMemoryRepository::new();
    let mut session = SessionStore::load(repo_arc(&repo), fixed_clock()).await.unwrap();

    assert!(!session.admin_login("user@admin.com", "wrong").await);
    assert!(!session.is_authenticated());

    assert!(session.admin_login("user@admin.com", "admin123").await);
    assert_eq!(session.current_user().unwrap().role(), Role::Admin);

    assert!(!session.admin_login("user@admin.com", "wrong").await);
    assert!(session.is_admin());
}

#[tokio::test]
async fn failed_writes_do_not_break_the_session() {
    let repo: Arc<dyn SnapshotRepository> = Arc::new(ReadOnlyRepository::default());
    let mut meditations = MeditationStore::load(Arc::clone(&repo), Clock::system(), CatalogPersistence::Durable)
        .await
        .unwrap();
    meditations.add_to_favorites(mid("1")).await;
    assert!(meditations.is_favorite(&mid("1")));

    let mut session = SessionStore::load(repo, Clock::system()).await.unwrap();
    assert!(session.login("a@b.com", "123456").await);
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn app_services_share_one_repository() {
    let storage = Storage::in_memory();
    let mut app = AppServices::new(&storage, fixed_clock(), CatalogPersistence::Ephemeral)
        .await
        .unwrap();
    assert!(app.session_mut().login("nova@example.com", "starlight").await);
    app.meditations_mut().add_to_favorites(mid("2")).await;
    app.courses_mut().enroll_in_course(cid("2")).await;

    let again = AppServices::new(&storage, fixed_clock(), CatalogPersistence::Ephemeral)
        .await
        .unwrap();
    assert_eq!(again.session().current_user().unwrap().name(), "nova");
    assert!(again.meditations().is_favorite(&mid("2")));
    assert!(again.courses().is_enrolled(&cid("2")));
    assert_eq!(again.courses().enrolled_courses().len(), 1);
}

#[tokio::test]
async fn reset_returns_to_first_launch() {
    let storage = Storage::in_memory();
    let mut app = AppServices::new(&storage, fixed_clock(), CatalogPersistence::Durable)
        .await
        .unwrap();
    assert!(app.session_mut().login("nova@example.com", "starlight").await);
    app.meditations_mut().add_to_history(mid("3")).await;
    assert!(app.meditations_mut().delete_meditation(&mid("3")).await);
    app.courses_mut().complete_lesson(cid("3"), lid("3-1")).await;

    app.reset().await;
    assert!(!app.session().is_authenticated());
    assert!(app.meditations().history().is_empty());
    assert!(app.meditations().get_meditation(&mid("3")).is_some());

    for key in StoreKey::ALL {
        assert!(storage.snapshots.load(key).await.unwrap().is_none(), "{key} still stored");
    }
}

#[tokio::test]
async fn non_finite_progress_does_not_lose_saved_state() {
    let repo = InMemoryRepository::new();
    let mut store = MeditationStore::load(repo_arc(&repo), fixed_clock(), CatalogPersistence::Ephemeral)
        .await
        .unwrap();
    store.add_to_favorites(mid("1")).await;
    store.add_to_history(mid("1")).await;
    store.update_progress(mid("1"), 35.0).await;
    store.update_progress(mid("2"), f64::NAN).await;
    store.update_progress(mid("1"), f64::INFINITY).await;
    assert!((store.get_progress(&mid("1")) - 35.0).abs() < f64::EPSILON);
    assert!((store.get_progress(&mid("2")) - 0.0).abs() < f64::EPSILON);

    let reloaded = MeditationStore::load(repo_arc(&repo), fixed_clock(), CatalogPersistence::Ephemeral)
        .await
        .unwrap();
    assert!(reloaded.is_favorite(&mid("1")));
    assert_eq!(reloaded.history().len(), 1);
    assert!((reloaded.get_progress(&mid("1")) - 35.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn checked_completion_respects_lesson_access() {
    let repo = InMemoryRepository::new();
    let mut store = CourseStore::load(repo_arc(&repo), fixed_clock(), CatalogPersistence::Ephemeral)
        .await
        .unwrap();

    // seeded course 1: 1-1 free, 1-3 locked until enrollment
    assert_eq!(
        store.complete_unlocked_lesson(&cid("1"), &lid("1-3")).await,
        Some(LessonAccess::Locked)
    );
    assert!(!store.is_lesson_completed(&cid("1"), &lid("1-3")));

    assert_eq!(store.complete_unlocked_lesson(&cid("nope"), &lid("x")).await, None);
    assert_eq!(store.complete_unlocked_lesson(&cid("1"), &lid("nope")).await, None);
    assert!(store.progress_state().completions().is_empty());

    assert_eq!(
        store.complete_unlocked_lesson(&cid("1"), &lid("1-1")).await,
        Some(LessonAccess::Completed)
    );
    store.enroll_in_course(cid("1")).await;
    assert_eq!(
        store.complete_unlocked_lesson(&cid("1"), &lid("1-3")).await,
        Some(LessonAccess::Completed)
    );
    assert_eq!(store.progress_state().completions().len(), 2);

    let reloaded = CourseStore::load(repo_arc(&repo), fixed_clock(), CatalogPersistence::Ephemeral)
        .await
        .unwrap();
    assert!(reloaded.is_lesson_completed(&cid("1"), &lid("1-3")));
    assert!((reloaded.get_course_progress(&cid("1")) - 50.0).abs() < f64::EPSILON);
}
