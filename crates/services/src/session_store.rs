use std::sync::Arc;

use pleiades_core::model::{SessionState, User, UserPatch};
use storage::repository::{SnapshotRepository, StoreKey};
use tracing::{debug, info};

use crate::Clock;
use crate::error::StoreError;
use crate::snapshot::SnapshotSlot;

/// Current signed-in identity, persisted under `auth-storage`.
pub struct SessionStore {
    state: SessionState,
    slot: SnapshotSlot<SessionState>,
}

impl SessionStore {
    /// Load the session saved by a previous run, or start signed out.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the repository cannot be read.
    pub async fn load(
        repo: Arc<dyn SnapshotRepository>,
        clock: Clock,
    ) -> Result<Self, StoreError> {
        let slot = SnapshotSlot::new(StoreKey::Session, repo, clock);
        let state = slot.load_or_else(SessionState::signed_out).await?;
        Ok(Self { state, slot })
    }

    /// Member sign-in. Returns `false` for rejected credentials.
    pub async fn login(&mut self, email: &str, password: &str) -> bool {
        if !self.state.login(email, password) {
            debug!("member login rejected");
            return false;
        }
        info!(email, "member signed in");
        self.slot.persist(&self.state).await;
        true
    }

    /// Administrator sign-in. A failed attempt keeps the current identity.
    pub async fn admin_login(&mut self, email: &str, password: &str) -> bool {
        if !self.state.admin_login(email, password) {
            debug!("admin login rejected");
            return false;
        }
        info!(email, "admin signed in");
        self.slot.persist(&self.state).await;
        true
    }

    pub async fn logout(&mut self) {
        self.state.logout();
        debug!("signed out");
        self.slot.persist(&self.state).await;
    }

    /// Sign out and drop the stored session.
    pub async fn reset(&mut self) {
        self.state.logout();
        self.slot.clear().await;
    }

    /// Edit the signed-in user's profile. Returns `false` if signed out.
    pub async fn update_user(&mut self, patch: UserPatch) -> bool {
        if !self.state.update_user(patch) {
            return false;
        }
        self.slot.persist(&self.state).await;
        true
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&User> {
        self.state.user()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.state.is_admin()
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }
}
