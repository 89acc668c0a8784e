use thiserror::Error;

use crate::catalog::CatalogError;
use crate::model::{CourseError, MeditationError, ParseIdError};

/// Umbrella error for callers that do not care which domain rule failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Id(#[from] ParseIdError),
    #[error(transparent)]
    Meditation(#[from] MeditationError),
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
