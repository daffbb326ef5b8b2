use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A stored user record.
///
/// This is the internal representation and includes the password hash and the
/// currently outstanding tokens. It is deliberately not `Serialize`; anything
/// crossing the HTTP boundary goes through [`UserProfile`] instead, so the
/// hash can never leak into a response body.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Stored lowercased; lookups are case-insensitive.
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    /// Set exactly once, by team confirmation.
    pub team_id: Option<Uuid>,
    /// Present iff an unconsumed invitation exists for this user.
    pub invitation_token: Option<String>,
    /// Present iff an unconsumed password-reset request exists.
    pub reset_token: Option<String>,
    /// The single currently-valid refresh token; cleared on logout.
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: &str, email: &str, password_hash: String, avatar: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_lowercase(),
            password_hash,
            avatar,
            team_id: None,
            invitation_token: None,
            reset_token: None,
            refresh_token: None,
            created_at: Utc::now(),
        }
    }

    /// The hash-free view of this user.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            avatar: self.avatar.clone(),
            team_id: self.team_id,
            created_at: self.created_at,
        }
    }
}

/// Public projection of a [`User`], safe to serialize into responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub team_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_lowercases_email() {
        let user = User::new("Ada", "Ada@Example.COM", "$2b$12$hash".into(), None);
        assert_eq!(user.email, "ada@example.com");
        assert!(user.team_id.is_none());
        assert!(user.invitation_token.is_none());
        assert!(user.reset_token.is_none());
        assert!(user.refresh_token.is_none());
    }

    #[test]
    fn test_profile_has_no_hash() {
        let user = User::new("Ada", "ada@example.com", "$2b$12$hash".into(), None);
        let profile = user.profile();
        let body = serde_json::to_string(&profile).unwrap();
        assert!(!body.contains("hash"));
        assert_eq!(profile.id, user.id);
    }
}
