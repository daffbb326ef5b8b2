pub mod extractors;
pub mod invitation;
pub mod middleware;
pub mod password;
pub mod reset;
pub mod session;
pub mod token;

use crate::models::{Team, UserProfile};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use extractors::AuthenticatedUserId;
pub use invitation::Invitations;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use reset::PasswordResets;
pub use session::{LoginOutcome, Sessions};
pub use token::{Claims, TokenCodec, TokenError, TokenKind};

lazy_static! {
    // Display names: letters, digits, spaces, underscores, hyphens
    static ref NAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9 _-]+$").unwrap();
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name for the new account.
    #[validate(
        length(min = 2, max = 32),
        regex(
            path = "NAME_REGEX",
            message = "Name must be alphanumeric, spaces, underscores, or hyphens"
        )
    )]
    pub name: String,
    /// Email address for the new account.
    #[validate(email)]
    pub email: String,
    /// Password for the new account. Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
    /// Optional avatar reference.
    pub avatar: Option<String>,
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Payload confirming an invitation against a team name.
#[derive(Debug, Deserialize, Validate)]
pub struct ConfirmTeamRequest {
    #[validate(length(min = 1))]
    pub token: String,
    /// The human-facing join key; the team is created on first confirmation.
    #[validate(length(min = 1, max = 50))]
    pub team: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LogoutRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetConfirm {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Response structure after successful registration.
///
/// Carries the invitation token so a client can drive team confirmation
/// without waiting on the email.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserProfile,
    pub invitation_token: String,
}

/// Response structure after successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub access_token: String,
    pub refresh_token: String,
    pub team: Option<Team>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
}
