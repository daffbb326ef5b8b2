//! Team-invitation flow.
//!
//! Per-user state machine: no invitation -> pending (token issued at
//! registration) -> confirmed (token consumed, team joined). Confirmation is
//! a join protocol that must stay safe under retries and double-clicks, so
//! every step after token verification is idempotent and the invitation-token
//! clear is persisted last.

use std::sync::Arc;

use crate::accounts::Accounts;
use crate::auth::token::{TokenCodec, TokenKind};
use crate::error::AppError;
use crate::models::User;
use crate::notify::{self, Notifier};
use crate::teams::Teams;

#[derive(Clone)]
pub struct Invitations {
    accounts: Accounts,
    teams: Teams,
    codec: Arc<TokenCodec>,
    notifier: Arc<dyn Notifier>,
    confirm_link: String,
}

impl Invitations {
    pub fn new(
        accounts: Accounts,
        teams: Teams,
        codec: Arc<TokenCodec>,
        notifier: Arc<dyn Notifier>,
        confirm_link: String,
    ) -> Self {
        Self {
            accounts,
            teams,
            codec,
            notifier,
            confirm_link,
        }
    }

    /// Issues an invitation token for `user`, stores it on the record, and
    /// mails the confirmation link. Called right after registration; a later
    /// call supersedes any earlier unconsumed token.
    ///
    /// The mail is sent only after the token is durably stored.
    pub async fn issue(&self, user: &mut User) -> Result<String, AppError> {
        let token = self.codec.issue(user.id, TokenKind::Invitation)?;
        user.invitation_token = Some(token.clone());
        self.accounts.save(user).await?;

        let link = format!("{}/{}", self.confirm_link, token);
        notify::send_best_effort(
            self.notifier.as_ref(),
            &user.email,
            "Confirm your team",
            &format!("Follow this link to confirm your team membership: {}", link),
        )
        .await;

        Ok(token)
    }

    /// Confirms an invitation against a team name and performs the join.
    ///
    /// Ordering matters: the team is created and the membership added before
    /// the user record's final transition (team assignment + token clear) is
    /// persisted, so no observable state has the token consumed without the
    /// join having happened.
    pub async fn confirm(&self, token: &str, team_name: &str) -> Result<User, AppError> {
        let subject = self
            .codec
            .verify(token, TokenKind::Invitation)
            .map_err(AppError::from)?;

        let mut user = self
            .accounts
            .find_by_id(subject)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        match user.invitation_token.as_deref() {
            Some(stored) if stored == token => {}
            // Already confirmed: a retried confirmation is a no-op success.
            None if user.team_id.is_some() => return Ok(user),
            // A token that was valid at issuance but has been superseded.
            _ => return Err(AppError::Unauthorized("Invalid invitation token".into())),
        }

        let team = self.teams.find_or_create(team_name, user.id).await?;
        self.teams.add_member(team.id, user.id).await?;

        user.team_id = Some(team.id);
        user.invitation_token = None;
        self.accounts.save(&user).await?;

        Ok(user)
    }
}
