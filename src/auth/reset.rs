//! Password-reset flow.
//!
//! Single use is enforced by comparing the presented token against the
//! stored `reset_token`, not by expiry: cryptographic validity survives a
//! password change, the stored field does not.

use std::sync::Arc;

use crate::accounts::Accounts;
use crate::auth::token::{TokenCodec, TokenKind};
use crate::error::AppError;
use crate::models::User;
use crate::notify::{self, Notifier};

#[derive(Clone)]
pub struct PasswordResets {
    accounts: Accounts,
    codec: Arc<TokenCodec>,
    notifier: Arc<dyn Notifier>,
    reset_link: String,
}

impl PasswordResets {
    pub fn new(
        accounts: Accounts,
        codec: Arc<TokenCodec>,
        notifier: Arc<dyn Notifier>,
        reset_link: String,
    ) -> Self {
        Self {
            accounts,
            codec,
            notifier,
            reset_link,
        }
    }

    /// Issues a reset token for the account behind `email`, stores it, and
    /// mails the reset link. Unknown emails surface `NotFound`, a known
    /// account-enumeration leak.
    pub async fn request(&self, email: &str) -> Result<String, AppError> {
        let mut user = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("No user with that email".into()))?;

        let token = self.codec.issue(user.id, TokenKind::Reset)?;
        user.reset_token = Some(token.clone());
        self.accounts.save(&user).await?;

        let link = format!("{}/{}", self.reset_link, token);
        notify::send_best_effort(
            self.notifier.as_ref(),
            &user.email,
            "Password reset request",
            &format!("Follow this link to reset your password: {}", link),
        )
        .await;

        Ok(token)
    }

    /// Consumes a reset token and rotates the password.
    ///
    /// All failure cases are `Unauthorized`: bad/expired token, unknown
    /// subject, or a token that no longer equals the stored one (replay).
    pub async fn reset(&self, token: &str, new_password: &str) -> Result<User, AppError> {
        let subject = self
            .codec
            .verify(token, TokenKind::Reset)
            .map_err(AppError::from)?;

        let mut user = self
            .accounts
            .find_by_id(subject)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid reset token".into()))?;

        if user.reset_token.as_deref() != Some(token) {
            return Err(AppError::Unauthorized("Invalid reset token".into()));
        }

        user.reset_token = None;
        self.accounts.rotate_password(&mut user, new_password).await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TokenConfig, TokenSettings};
    use crate::notify::LogNotifier;
    use crate::storage::MemoryStorage;
    use chrono::Duration;

    fn fixture() -> (Accounts, PasswordResets) {
        let storage = Arc::new(MemoryStorage::new());
        let accounts = Accounts::new(storage);
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
        let resets = PasswordResets::new(
            accounts.clone(),
            codec,
            Arc::new(LogNotifier),
            "http://127.0.0.1:8080/reset-password".into(),
        );
        (accounts, resets)
    }

    #[tokio::test]
    async fn test_reset_rotates_password_once() {
        let (accounts, resets) = fixture();
        let user = accounts
            .register("Ada", "a@x.com", "p1-secret", None)
            .await
            .unwrap();

        let token = resets.request("a@x.com").await.unwrap();
        let updated = resets.reset(&token, "p2-secret").await.unwrap();

        assert!(updated.reset_token.is_none());
        let reloaded = accounts.find_by_id(user.id).await.unwrap().unwrap();
        assert!(accounts.verify_password(&reloaded, "p2-secret").unwrap());
        assert!(!accounts.verify_password(&reloaded, "p1-secret").unwrap());

        // Replay: same token fails after consumption.
        let replay = resets.reset(&token, "p3-secret").await;
        assert!(matches!(replay, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_request_unknown_email_not_found() {
        let (_accounts, resets) = fixture();
        let result = resets.request("nobody@x.com").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_superseded_request_invalidates_earlier_token() {
        let (accounts, resets) = fixture();
        accounts
            .register("Ada", "a@x.com", "p1-secret", None)
            .await
            .unwrap();

        let stale = resets.request("a@x.com").await.unwrap();
        let fresh = resets.request("a@x.com").await.unwrap();
        assert_ne!(stale, fresh);

        let result = resets.reset(&stale, "p2-secret").await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));

        assert!(resets.reset(&fresh, "p2-secret").await.is_ok());
    }
}
