use thiserror::Error;
use tracing::{info, warn};

use crate::models::{Role, User};

/// Password accepted for every account. This is a demo gate, not real
/// authentication; the data file is unprotected either way.
pub const DEMO_PASSWORD: &str = "demo123";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// The signed-in user. Owned by the application state and dropped on
/// logout; nothing about the session is global.
#[derive(Debug, Clone)]
pub struct Session {
    user: User,
}

impl Session {
    /// Check the demo credentials against the stored users.
    pub fn login(users: &[User], email: &str, password: &str) -> Result<Session, AuthError> {
        let user = users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()));

        match user {
            Some(user) if password == DEMO_PASSWORD => {
                info!(email = %user.email, "user signed in");
                Ok(Session { user: user.clone() })
            }
            _ => {
                warn!(email = %email, "rejected sign-in attempt");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// Firm-level visibility: admins see everything, other users only the
    /// firms granted to them.
    pub fn has_access_to_firm(&self, firm_id: &str) -> bool {
        match self.user.role {
            Role::Admin => true,
            Role::User => self.user.firm_access.iter().any(|id| id == firm_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(email: &str, role: Role, firm_access: &[&str]) -> User {
        User {
            id: "u1".to_string(),
            name: "Test User".to_string(),
            email: email.to_string(),
            role,
            firm_access: firm_access.iter().map(|s| s.to_string()).collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn login_accepts_known_email_with_demo_password() {
        let users = vec![user("owner@email.com", Role::Admin, &[])];
        let session = Session::login(&users, "owner@email.com", DEMO_PASSWORD).unwrap();
        assert_eq!(session.user().email, "owner@email.com");
    }

    #[test]
    fn login_is_case_insensitive_on_email() {
        let users = vec![user("owner@email.com", Role::Admin, &[])];
        assert!(Session::login(&users, "  Owner@Email.com ", DEMO_PASSWORD).is_ok());
    }

    #[test]
    fn login_rejects_wrong_password_and_unknown_email() {
        let users = vec![user("owner@email.com", Role::Admin, &[])];
        assert!(Session::login(&users, "owner@email.com", "hunter2").is_err());
        assert!(Session::login(&users, "nobody@email.com", DEMO_PASSWORD).is_err());
    }

    #[test]
    fn admin_sees_every_firm() {
        let users = vec![user("owner@email.com", Role::Admin, &[])];
        let session = Session::login(&users, "owner@email.com", DEMO_PASSWORD).unwrap();
        assert!(session.has_access_to_firm("anything"));
    }

    #[test]
    fn regular_user_is_limited_to_granted_firms() {
        let users = vec![user("aide@email.com", Role::User, &["f1"])];
        let session = Session::login(&users, "aide@email.com", DEMO_PASSWORD).unwrap();
        assert!(session.has_access_to_firm("f1"));
        assert!(!session.has_access_to_firm("f2"));
    }
}
