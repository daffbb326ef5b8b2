//! Session management.
//!
//! Login issues an access/refresh pair and stores the refresh token on the
//! user record, so there is at most one live session per user and a stored
//! mismatch revokes every earlier refresh token. Refresh checks that stored
//! value, never just the signature.

use std::sync::Arc;

use crate::accounts::Accounts;
use crate::auth::token::{TokenCodec, TokenKind};
use crate::error::AppError;
use crate::models::{Team, User};
use crate::teams::Teams;

/// What a successful login hands back to the HTTP layer.
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    /// The team the user is a member of, if any.
    pub team: Option<Team>,
}

#[derive(Clone)]
pub struct Sessions {
    accounts: Accounts,
    teams: Teams,
    codec: Arc<TokenCodec>,
}

impl Sessions {
    pub fn new(accounts: Accounts, teams: Teams, codec: Arc<TokenCodec>) -> Self {
        Self {
            accounts,
            teams,
            codec,
        }
    }

    /// Authenticates and opens a session.
    ///
    /// Unknown email and wrong password produce the same `Unauthorized`, so a
    /// caller cannot probe for account existence.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let invalid = || AppError::Unauthorized("Invalid email or password".into());

        let mut user = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or_else(invalid)?;

        if !self.accounts.verify_password(&user, password)? {
            return Err(invalid());
        }

        let access_token = self.codec.issue(user.id, TokenKind::SessionAccess)?;
        let refresh_token = self.codec.issue(user.id, TokenKind::SessionRefresh)?;

        // Overwrites any prior refresh token: one live session per user.
        user.refresh_token = Some(refresh_token.clone());
        self.accounts.save(&user).await?;

        let team = self.teams.find_by_member(user.id).await?;

        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
            team,
        })
    }

    /// Revokes the session holding `refresh_token`. Idempotent: an unknown
    /// or already-cleared token is a silent no-op.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AppError> {
        self.accounts.clear_refresh_token(refresh_token).await
    }

    /// Re-issues an access token for a live refresh token.
    ///
    /// The presented token must equal the one currently stored for its
    /// subject; signature validity alone does not survive logout or a newer
    /// login.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let subject = self
            .codec
            .verify(refresh_token, TokenKind::SessionRefresh)
            .map_err(AppError::from)?;

        let user = self
            .accounts
            .find_by_id(subject)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".into()))?;

        if user.refresh_token.as_deref() != Some(refresh_token) {
            return Err(AppError::Unauthorized("Refresh token revoked".into()));
        }

        self.codec.issue(user.id, TokenKind::SessionAccess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TokenConfig, TokenSettings};
    use crate::storage::MemoryStorage;
    use chrono::Duration;

    fn fixture() -> (Accounts, Sessions) {
        let storage = Arc::new(MemoryStorage::new());
        let accounts = Accounts::new(storage.clone());
        let teams = Teams::new(storage);
        let codec = Arc::new(TokenCodec::new(&TokenConfig {
            session_access: TokenSettings {
                secret: "access-secret".into(),
                ttl: Duration::hours(1),
            },
            session_refresh: TokenSettings {
                secret: "refresh-secret".into(),
                ttl: Duration::days(14),
            },
            invitation: TokenSettings {
                secret: "invitation-secret".into(),
                ttl: Duration::days(7),
            },
            reset: TokenSettings {
                secret: "reset-secret".into(),
                ttl: Duration::hours(1),
            },
        }));
        let sessions = Sessions::new(accounts.clone(), teams, codec);
        (accounts, sessions)
    }

    #[tokio::test]
    async fn test_login_issues_pair_and_stores_refresh() {
        let (accounts, sessions) = fixture();
        let user = accounts
            .register("Ada", "a@x.com", "p1-secret", None)
            .await
            .unwrap();

        let outcome = sessions.login("a@x.com", "p1-secret").await.unwrap();
        assert_ne!(outcome.access_token, outcome.refresh_token);
        assert!(outcome.team.is_none());

        let stored = accounts.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some(outcome.refresh_token.as_str()));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (accounts, sessions) = fixture();
        accounts
            .register("Ada", "a@x.com", "p1-secret", None)
            .await
            .unwrap();

        let wrong_password = sessions.login("a@x.com", "wrong").await.unwrap_err();
        let unknown_email = sessions.login("b@x.com", "p1-secret").await.unwrap_err();

        match (wrong_password, unknown_email) {
            (AppError::Unauthorized(a), AppError::Unauthorized(b)) => assert_eq!(a, b),
            other => panic!("expected matching Unauthorized errors, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_logout_revokes_refresh() {
        let (accounts, sessions) = fixture();
        accounts
            .register("Ada", "a@x.com", "p1-secret", None)
            .await
            .unwrap();

        let outcome = sessions.login("a@x.com", "p1-secret").await.unwrap();
        assert!(sessions.refresh(&outcome.refresh_token).await.is_ok());

        sessions.logout(&outcome.refresh_token).await.unwrap();
        // Idempotent.
        sessions.logout(&outcome.refresh_token).await.unwrap();

        let result = sessions.refresh(&outcome.refresh_token).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_new_login_revokes_prior_refresh() {
        let (accounts, sessions) = fixture();
        accounts
            .register("Ada", "a@x.com", "p1-secret", None)
            .await
            .unwrap();

        let first = sessions.login("a@x.com", "p1-secret").await.unwrap();
        let second = sessions.login("a@x.com", "p1-secret").await.unwrap();

        let result = sessions.refresh(&first.refresh_token).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
        assert!(sessions.refresh(&second.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_access_token_rejected_as_refresh() {
        let (accounts, sessions) = fixture();
        accounts
            .register("Ada", "a@x.com", "p1-secret", None)
            .await
            .unwrap();

        let outcome = sessions.login("a@x.com", "p1-secret").await.unwrap();
        let result = sessions.refresh(&outcome.access_token).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}
