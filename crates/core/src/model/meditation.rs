use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::MeditationId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MeditationError {
    #[error("meditation title cannot be empty")]
    EmptyTitle,

    #[error("meditation category cannot be empty")]
    EmptyCategory,
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated input for a new catalog meditation.
#[derive(Debug, Clone, Default)]
pub struct MeditationDraft {
    pub title: String,
    pub description: String,
    pub duration_label: String,
    pub duration_minutes: u32,
    pub image_url: String,
    pub audio_url: String,
    pub category: String,
    pub featured: bool,
}

//
// ─── MEDITATION ────────────────────────────────────────────────────────────────
//

/// A guided meditation available for playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meditation {
    id: MeditationId,
    title: String,
    description: String,
    duration_label: String,
    duration_minutes: u32,
    image_url: String,
    audio_url: String,
    category: String,
    featured: bool,
}

impl Meditation {
    /// Creates a new meditation from a draft.
    ///
    /// # Errors
    ///
    /// Returns `MeditationError::EmptyTitle` or `MeditationError::EmptyCategory`
    /// if either is blank after trimming.
    pub fn new(id: MeditationId, draft: MeditationDraft) -> Result<Self, MeditationError> {
        let title = draft.title.trim().to_owned();
        if title.is_empty() {
            return Err(MeditationError::EmptyTitle);
        }
        let category = draft.category.trim().to_owned();
        if category.is_empty() {
            return Err(MeditationError::EmptyCategory);
        }

        Ok(Self {
            id,
            title,
            description: draft.description.trim().to_owned(),
            duration_label: draft.duration_label.trim().to_owned(),
            duration_minutes: draft.duration_minutes,
            image_url: draft.image_url,
            audio_url: draft.audio_url,
            category,
            featured: draft.featured,
        })
    }

    /// Applies a partial update. The id is never changed.
    ///
    /// # Errors
    ///
    /// Returns `MeditationError` if the patch would blank the title or category.
    /// The meditation is left untouched on error.
    pub fn apply(&mut self, patch: MeditationPatch) -> Result<(), MeditationError> {
        if let Some(title) = patch.title.as_deref() {
            if title.trim().is_empty() {
                return Err(MeditationError::EmptyTitle);
            }
        }
        if let Some(category) = patch.category.as_deref() {
            if category.trim().is_empty() {
                return Err(MeditationError::EmptyCategory);
            }
        }

        if let Some(title) = patch.title {
            self.title = title.trim().to_owned();
        }
        if let Some(description) = patch.description {
            self.description = description.trim().to_owned();
        }
        if let Some(label) = patch.duration_label {
            self.duration_label = label.trim().to_owned();
        }
        if let Some(minutes) = patch.duration_minutes {
            self.duration_minutes = minutes;
        }
        if let Some(url) = patch.image_url {
            self.image_url = url;
        }
        if let Some(url) = patch.audio_url {
            self.audio_url = url;
        }
        if let Some(category) = patch.category {
            self.category = category.trim().to_owned();
        }
        if let Some(featured) = patch.featured {
            self.featured = featured;
        }
        Ok(())
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &MeditationId {
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

    /// Human readable duration, e.g. "15 min".
    #[must_use]
    pub fn duration_label(&self) -> &str {
        &self.duration_label
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    #[must_use]
    pub fn audio_url(&self) -> &str {
        &self.audio_url
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn is_featured(&self) -> bool {
        self.featured
    }
}

/// Field-level partial update for a meditation. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct MeditationPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_label: Option<String>,
    pub duration_minutes: Option<u32>,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub category: Option<String>,
    pub featured: Option<bool>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
