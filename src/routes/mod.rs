pub mod auth;
pub mod health;
pub mod users;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::confirm_team)
            .service(auth::login)
            .service(auth::logout)
            .service(auth::refresh)
            .service(auth::request_password_reset)
            .service(auth::reset_password),
    )
    .service(users::me);
}
