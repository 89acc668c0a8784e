use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use services::CatalogPersistence;

#[derive(Debug, Parser)]
#[command(name = "pleiades")]
#[command(about = "Meditations, courses and progress tracking from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// SQLite database holding the saved stores
    #[arg(long = "db", env = "PLEIADES_DB_URL", default_value = "sqlite://pleiades.sqlite3")]
    pub db_url: String,

    /// Keep admin catalog edits between runs (`ephemeral` or `durable`)
    #[arg(long, env = "PLEIADES_PERSIST_CATALOG", default_value = "ephemeral")]
    pub catalog: CatalogPersistence,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in as a member
    Login { email: String, password: String },
    /// Sign in as the administrator
    AdminLogin { email: String, password: String },
    Logout,
    /// Show the signed-in identity
    Whoami,
    /// Show or edit the signed-in user's profile
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Avatar URL; pass an empty string to remove it
        #[arg(long)]
        avatar: Option<String>,
    },
    /// List meditations
    Meditations {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    Favorite { id: String },
    Unfavorite { id: String },
    /// Record a play and report the listened share
    Play {
        id: String,
        /// Seconds listened so far
        #[arg(long, default_value_t = 0)]
        seconds: u64,
    },
    /// Recently played meditations
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// List courses
    Courses {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    Enroll { id: String },
    Unenroll { id: String },
    /// Mark a lesson as finished
    Complete { course: String, lesson: String },
    /// Show a course with its lessons and progress
    Course { id: String },
    /// Forget the session, progress and catalog edits
    Reset,
    /// Catalog administration
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    AddMeditation {
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        category: String,
        #[arg(long, default_value_t = 10)]
        minutes: u32,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        featured: bool,
    },
    RemoveMeditation { id: String },
    RemoveCourse { id: String },
    RemoveLesson { course: String, lesson: String },
}

/// Turn a path or loose `sqlite:` URL into an absolute `sqlite://` URL that
/// creates the file on first use.
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.contains("mode=memory") {
        return trimmed.to_owned();
    }

    let rest = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let (path_str, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };

    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };

    match query {
        Some(query) if query.contains("mode=") => {
            format!("sqlite://{}?{query}", absolute.display())
        }
        Some(query) => format!("sqlite://{}?{query}&mode=rwc", absolute.display()),
        None => format!("sqlite://{}?mode=rwc", absolute.display()),
    }
}

/// Local file behind a normalized URL, if any.
pub fn sqlite_file_path(db_url: &str) -> Option<&Path> {
    let rest = db_url.strip_prefix("sqlite://")?;
    let path = rest.split('?').next().unwrap_or(rest);
    (!path.is_empty()).then(|| Path::new(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_become_absolute_with_create_mode() {
        let url = normalize_sqlite_url("data/pleiades.sqlite3");
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/pleiades.sqlite3?mode=rwc"));
    }

    #[test]
    fn explicit_mode_is_kept() {
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/p.db?mode=ro"),
            "sqlite:///tmp/p.db?mode=ro"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:/tmp/p.db?cache=shared"),
            "sqlite:///tmp/p.db?cache=shared&mode=rwc"
        );
    }

    #[test]
    fn memory_urls_pass_through() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
    }

    #[test]
    fn file_path_strips_scheme_and_query() {
        assert_eq!(
            sqlite_file_path("sqlite:///tmp/p.db?mode=rwc"),
            Some(Path::new("/tmp/p.db"))
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
    }

    #[test]
    fn parses_play_with_catalog_flag() {
        let cli = Cli::try_parse_from(["pleiades", "--catalog", "durable", "play", "4", "--seconds", "90"])
            .unwrap();
        assert_eq!(cli.catalog, CatalogPersistence::Durable);
        assert!(matches!(cli.command, Command::Play { ref id, seconds: 90 } if id == "4"));
    }
}
