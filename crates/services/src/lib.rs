#![forbid(unsafe_code)]

pub mod app_services;
pub mod course_store;
pub mod error;
pub mod meditation_store;
pub mod session_store;
pub mod snapshot;

pub use pleiades_core::Clock;

pub use app_services::{AppServices, CatalogPersistence};
pub use course_store::CourseStore;
pub use error::{AppServicesError, StoreError};
pub use meditation_store::MeditationStore;
pub use session_store::SessionStore;
pub use snapshot::{SNAPSHOT_VERSION, SnapshotSlot};
