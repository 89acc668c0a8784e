use pleiades_core::model::{
    CourseId, LessonAccess, LessonId, Meditation, MeditationDraft, MeditationId, Role, UserPatch,
};
use pleiades_core::{CatalogQuery, Error as CoreError};
use services::AppServices;

use crate::cli::{AdminCommand, Command};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

fn meditation_id(raw: &str) -> Result<MeditationId, CoreError> {
    Ok(MeditationId::new(raw)?)
}

fn course_id(raw: &str) -> Result<CourseId, CoreError> {
    Ok(CourseId::new(raw)?)
}

fn lesson_id(raw: &str) -> Result<LessonId, CoreError> {
    Ok(LessonId::new(raw)?)
}

fn query(category: Option<String>, search: Option<String>) -> CatalogQuery {
    let mut query = CatalogQuery::all();
    if let Some(category) = category {
        query = query.category(category);
    }
    if let Some(search) = search {
        query = query.text(search);
    }
    query
}

fn access_label(access: LessonAccess) -> &'static str {
    match access {
        LessonAccess::Locked => "locked",
        LessonAccess::Unlocked => "open",
        LessonAccess::Completed => "done",
    }
}

pub async fn execute(app: &mut AppServices, command: Command) -> CommandResult {
    match command {
        // ─── Session ────────────────────────────────────────────────────────
        Command::Login { email, password } => {
            if app.session_mut().login(&email, &password).await {
                whoami(app);
            } else {
                println!("login rejected: email required, password needs at least 6 characters");
            }
        }
        Command::AdminLogin { email, password } => {
            if app.session_mut().admin_login(&email, &password).await {
                whoami(app);
            } else {
                println!("admin login rejected");
            }
        }
        Command::Logout => {
            app.session_mut().logout().await;
            println!("signed out");
        }
        Command::Whoami => whoami(app),
        Command::Profile {
            name,
            email,
            avatar,
        } => {
            if name.is_some() || email.is_some() || avatar.is_some() {
                let patch = UserPatch {
                    name,
                    email,
                    avatar: avatar.map(|url| Some(url).filter(|url| !url.trim().is_empty())),
                };
                if !app.session_mut().update_user(patch).await {
                    println!("not signed in");
                    return Ok(());
                }
            }
            profile(app);
        }

        // ─── Meditations ────────────────────────────────────────────────────
        Command::Meditations { category, search } => {
            let store = app.meditations();
            for m in store.search(&query(category, search)) {
                let star = if store.is_favorite(m.id()) { "*" } else { " " };
                println!(
                    "{star} [{}] {} ({}, {}) {:.0}%",
                    m.id(),
                    m.title(),
                    m.category(),
                    m.duration_label(),
                    store.get_progress(m.id())
                );
            }
        }
        Command::Favorite { id } => {
            let id = meditation_id(&id)?;
            app.meditations_mut().add_to_favorites(id.clone()).await;
            println!("{id} added to favorites");
        }
        Command::Unfavorite { id } => {
            let id = meditation_id(&id)?;
            app.meditations_mut().remove_from_favorites(&id).await;
            println!("{id} removed from favorites");
        }
        Command::Play { id, seconds } => {
            let id = meditation_id(&id)?;
            if app.meditations().get_meditation(&id).is_none() {
                println!("no meditation {id}");
                return Ok(());
            }
            let store = app.meditations_mut();
            store.add_to_history(id.clone()).await;
            if let Some(percent) = store.record_playback(&id, seconds).await {
                println!("{id}: {percent:.0}% listened");
            }
        }
        Command::History { limit } => {
            for (m, at) in app.meditations().recently_played(limit) {
                println!("{}  [{}] {}", at.format("%Y-%m-%d %H:%M"), m.id(), m.title());
            }
        }

        // ─── Courses ────────────────────────────────────────────────────────
        Command::Courses { category, search } => {
            let store = app.courses();
            for c in store.search(&query(category, search)) {
                let mark = if store.is_enrolled(c.id()) { "+" } else { " " };
                println!(
                    "{mark} [{}] {} ({}, {} lessons, {:.1}) {:.0}%",
                    c.id(),
                    c.title(),
                    c.category(),
                    c.lesson_count(),
                    c.rating(),
                    store.get_course_progress(c.id())
                );
            }
        }
        Command::Enroll { id } => {
            let id = course_id(&id)?;
            app.courses_mut().enroll_in_course(id.clone()).await;
            println!("enrolled in {id}");
        }
        Command::Unenroll { id } => {
            let id = course_id(&id)?;
            app.courses_mut().unenroll_from_course(&id).await;
            println!("left {id}");
        }
        Command::Complete { course, lesson } => {
            let course = course_id(&course)?;
            let lesson = lesson_id(&lesson)?;
            let store = app.courses_mut();
            match store.complete_unlocked_lesson(&course, &lesson).await {
                None => {
                    println!("no lesson {lesson} in course {course}");
                    return Ok(());
                }
                Some(LessonAccess::Locked) => {
                    println!("{course}/{lesson} is locked, enroll in {course} first");
                    return Ok(());
                }
                Some(_) => {}
            }
            println!(
                "{course}/{lesson} completed, course at {:.0}%",
                store.get_course_progress(&course)
            );
            if let Some(next) = store.next_lesson(&course, &lesson) {
                println!("next: [{}] {}", next.id(), next.title());
            }
        }
        Command::Course { id } => {
            let id = course_id(&id)?;
            let store = app.courses();
            let Some(course) = store.get_course(&id) else {
                println!("no course {id}");
                return Ok(());
            };
            println!("{} ({})", course.title(), course.category());
            println!("{}", course.description());
            println!("progress: {:.0}%", store.get_course_progress(&id));
            for lesson in course.lessons() {
                let access = store
                    .lesson_access(&id, lesson.id())
                    .map_or("?", access_label);
                println!(
                    "  {access:<6} [{}] {} ({})",
                    lesson.id(),
                    lesson.title(),
                    lesson.duration_label()
                );
            }
        }

        Command::Reset => {
            app.reset().await;
            println!("all saved data cleared");
        }
        Command::Admin { command } => admin(app, command).await?,
    }
    Ok(())
}

async fn admin(app: &mut AppServices, command: AdminCommand) -> CommandResult {
    match command {
        AdminCommand::AddMeditation {
            id,
            title,
            category,
            minutes,
            description,
            featured,
        } => {
            let id = meditation_id(&id)?;
            let meditation = Meditation::new(
                id.clone(),
                MeditationDraft {
                    title,
                    description,
                    duration_label: format!("{minutes} min"),
                    duration_minutes: minutes,
                    category,
                    featured,
                    ..MeditationDraft::default()
                },
            )
            .map_err(CoreError::from)?;
            app.meditations_mut().add_meditation(meditation).await?;
            println!("added meditation {id}");
        }
        AdminCommand::RemoveMeditation { id } => {
            let id = meditation_id(&id)?;
            let removed = app.meditations_mut().delete_meditation(&id).await;
            println!("{}", if removed { "removed" } else { "not found" });
        }
        AdminCommand::RemoveCourse { id } => {
            let id = course_id(&id)?;
            let removed = app.courses_mut().delete_course(&id).await;
            println!("{}", if removed { "removed" } else { "not found" });
        }
        AdminCommand::RemoveLesson { course, lesson } => {
            let course = course_id(&course)?;
            let lesson = lesson_id(&lesson)?;
            let removed = app.courses_mut().delete_lesson(&course, &lesson).await?;
            println!("{}", if removed { "removed" } else { "not found" });
        }
    }
    Ok(())
}

fn whoami(app: &AppServices) {
    match app.session().current_user() {
        Some(user) => {
            let role = match user.role() {
                Role::Admin => "admin",
                Role::Member => "member",
            };
            println!("{} <{}> ({role})", user.name(), user.email());
        }
        None => println!("not signed in"),
    }
}

fn profile(app: &AppServices) {
    whoami(app);
    let Some(user) = app.session().current_user() else {
        return;
    };
    if let Some(avatar) = user.avatar() {
        println!("avatar: {avatar}");
    }
    println!("favorites: {}", app.meditations().favorite_meditations().len());
    println!("played: {}", app.meditations().history().len());
    println!("enrolled: {}", app.courses().enrolled_courses().len());
}
