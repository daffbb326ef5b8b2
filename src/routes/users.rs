use crate::{
    accounts::Accounts, auth::AuthenticatedUserId, error::AppError, teams::Teams,
};
use actix_web::{get, web, HttpResponse, Responder};

/// Retrieves the authenticated user's profile and team.
///
/// Requires a valid access token; the password hash never appears in the
/// response because only the `UserProfile` projection is serialized.
#[get("/me")]
pub async fn me(
    accounts: web::Data<Accounts>,
    teams: web::Data<Teams>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let user = accounts
        .find_by_id(user_id.0)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let team = teams.find_by_member(user.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "user": user.profile(),
        "team": team,
    })))
}
