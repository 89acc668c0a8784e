use serde::{Deserialize, Serialize};

use crate::model::ids::UserId;
use crate::model::user::{Role, User, UserPatch};

/// Minimum password length accepted by [`SessionState::login`].
pub const MIN_PASSWORD_LEN: usize = 6;

/// The fixed password for the demo administrator account.
pub const ADMIN_PASSWORD: &str = "admin123";

const MEMBER_USER_ID: &str = "1";
const ADMIN_USER_ID: &str = "admin1";
const ADMIN_DISPLAY_NAME: &str = "Administrator";

/// Who is signed in, if anyone.
///
/// Credential checks are demo predicates, not an authentication boundary:
/// any non-empty email with a long enough password signs in as a member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    user: Option<User>,
}

impl SessionState {
    #[must_use]
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Signs in as a member. Returns `false` and leaves the state untouched
    /// if the email is empty or the password is shorter than
    /// [`MIN_PASSWORD_LEN`] characters.
    pub fn login(&mut self, email: &str, password: &str) -> bool {
        if email.is_empty() || password.chars().count() < MIN_PASSWORD_LEN {
            return false;
        }
        let Ok(id) = UserId::new(MEMBER_USER_ID) else {
            return false;
        };
        self.user = Some(User::new(id, local_part(email), email, Role::Member));
        true
    }

    /// Signs in as administrator. Requires "admin" somewhere in the email
    /// and the fixed [`ADMIN_PASSWORD`].
    pub fn admin_login(&mut self, email: &str, password: &str) -> bool {
        if !email.contains("admin") || password != ADMIN_PASSWORD {
            return false;
        }
        let Ok(id) = UserId::new(ADMIN_USER_ID) else {
            return false;
        };
        self.user = Some(User::new(id, ADMIN_DISPLAY_NAME, email, Role::Admin));
        true
    }

    pub fn logout(&mut self) {
        self.user = None;
    }

    /// Returns `false` when nobody is signed in.
    pub fn update_user(&mut self, patch: UserPatch) -> bool {
        match self.user.as_mut() {
            Some(user) => {
                user.apply(patch);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }
}

fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_requires_six_char_password() {
        let mut session = SessionState::signed_out();
        assert!(!session.login("a@b.com", "12345"));
        assert!(!session.is_authenticated());

        assert!(session.login("a@b.com", "123456"));
        let user = session.user().unwrap();
        assert_eq!(user.name(), "a");
        assert_eq!(user.email(), "a@b.com");
        assert_eq!(user.role(), Role::Member);
        assert!(!session.is_admin());
    }

    #[test]
    fn login_rejects_empty_email() {
        let mut session = SessionState::signed_out();
        assert!(!session.login("", "long-enough"));
    }

    #[test]
    fn name_is_whole_email_without_at_sign() {
        let mut session = SessionState::signed_out();
        assert!(session.login("stargazer", "secret1"));
        assert_eq!(session.user().unwrap().name(), "stargazer");
    }

    #[test]
    fn admin_login_grants_admin_role() {
        let mut session = SessionState::signed_out();
        assert!(session.admin_login("user@admin.com", "admin123"));
        assert!(session.is_admin());
        assert_eq!(session.user().unwrap().role(), Role::Admin);
        assert_eq!(session.user().unwrap().id().as_str(), "admin1");
    }

    #[test]
    fn failed_admin_login_keeps_previous_identity() {
        let mut session = SessionState::signed_out();
        assert!(session.login("a@b.com", "123456"));
        let before = session.clone();

        assert!(!session.admin_login("user@admin.com", "wrong"));
        assert!(!session.admin_login("user@example.com", "admin123"));
        assert_eq!(session, before);
    }

    #[test]
    fn logout_is_idempotent() {
        let mut session = SessionState::signed_out();
        assert!(session.login("a@b.com", "123456"));
        session.logout();
        session.logout();
        assert!(!session.is_authenticated());
        assert!(!session.is_admin());
    }

    #[test]
    fn update_user_merges_profile_fields() {
        let mut session = SessionState::signed_out();
        assert!(!session.update_user(UserPatch::default()));

        assert!(session.login("a@b.com", "123456"));
        assert!(session.update_user(UserPatch {
            name: Some("Alya".into()),
            avatar: Some(Some("https://example.com/a.png".into())),
            ..UserPatch::default()
        }));
        let user = session.user().unwrap();
        assert_eq!(user.name(), "Alya");
        assert_eq!(user.email(), "a@b.com");
        assert_eq!(user.avatar(), Some("https://example.com/a.png"));
    }
}
