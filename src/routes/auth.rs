use crate::{
    accounts::Accounts,
    auth::{
        ConfirmTeamRequest, Invitations, LoginRequest, LoginResponse, LogoutRequest,
        PasswordResetConfirm, PasswordResetRequest, PasswordResets, RefreshRequest,
        RefreshResponse, RegisterRequest, RegisterResponse, Sessions,
    },
    error::AppError,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates the account and issues its invitation token; the confirmation
/// email goes out best-effort after both are persisted.
#[post("/register")]
pub async fn register(
    accounts: web::Data<Accounts>,
    invitations: web::Data<Invitations>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    register_data.validate()?;

    let mut user = accounts
        .register(
            &register_data.name,
            &register_data.email,
            &register_data.password,
            register_data.avatar.clone(),
        )
        .await?;

    let invitation_token = invitations.issue(&mut user).await?;

    Ok(HttpResponse::Created().json(RegisterResponse {
        user: user.profile(),
        invitation_token,
    }))
}

/// Confirm a team invitation
///
/// Joins the named team, creating it if this is the first confirmation for
/// that name. Safe to retry: a repeated confirmation succeeds without
/// duplicating membership.
#[post("/confirm-team")]
pub async fn confirm_team(
    invitations: web::Data<Invitations>,
    confirm_data: web::Json<ConfirmTeamRequest>,
) -> Result<impl Responder, AppError> {
    confirm_data.validate()?;

    let user = invitations
        .confirm(&confirm_data.token, &confirm_data.team)
        .await?;

    Ok(HttpResponse::Ok().json(user.profile()))
}

/// Login user
///
/// Authenticates and returns an access/refresh token pair plus the user's
/// team, if any.
#[post("/login")]
pub async fn login(
    sessions: web::Data<Sessions>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let outcome = sessions
        .login(&login_data.email, &login_data.password)
        .await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: outcome.user.profile(),
        access_token: outcome.access_token,
        refresh_token: outcome.refresh_token,
        team: outcome.team,
    }))
}

/// Logout
///
/// Revokes the session holding the given refresh token. Idempotent.
#[post("/logout")]
pub async fn logout(
    sessions: web::Data<Sessions>,
    logout_data: web::Json<LogoutRequest>,
) -> Result<impl Responder, AppError> {
    logout_data.validate()?;

    sessions.logout(&logout_data.refresh_token).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Refresh the access token
///
/// Re-issues an access token for a refresh token that is still the one
/// stored on the account.
#[post("/refresh")]
pub async fn refresh(
    sessions: web::Data<Sessions>,
    refresh_data: web::Json<RefreshRequest>,
) -> Result<impl Responder, AppError> {
    refresh_data.validate()?;

    let access_token = sessions.refresh(&refresh_data.refresh_token).await?;

    Ok(HttpResponse::Ok().json(RefreshResponse { access_token }))
}

/// Request a password reset
///
/// Issues a reset token and mails the reset link. The token itself is never
/// in the response body.
#[post("/password-reset/request")]
pub async fn request_password_reset(
    resets: web::Data<PasswordResets>,
    request_data: web::Json<PasswordResetRequest>,
) -> Result<impl Responder, AppError> {
    request_data.validate()?;

    resets.request(&request_data.email).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Password reset email sent"
    })))
}

/// Complete a password reset
///
/// Consumes the reset token and sets the new password. A replayed token
/// fails with 401.
#[post("/password-reset/confirm")]
pub async fn reset_password(
    resets: web::Data<PasswordResets>,
    reset_data: web::Json<PasswordResetConfirm>,
) -> Result<impl Responder, AppError> {
    reset_data.validate()?;

    let user = resets
        .reset(&reset_data.token, &reset_data.password)
        .await?;

    Ok(HttpResponse::Ok().json(user.profile()))
}
