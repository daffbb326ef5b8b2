use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;

use crewbase::accounts::Accounts;
use crewbase::auth::{AuthMiddleware, Invitations, PasswordResets, Sessions, TokenCodec};
use crewbase::config::Config;
use crewbase::notify::LogNotifier;
use crewbase::routes;
use crewbase::storage::PgStorage;
use crewbase::teams::Teams;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    let storage = Arc::new(PgStorage::new(pool));
    let codec = Arc::new(TokenCodec::new(&config.tokens));
    let notifier = Arc::new(LogNotifier);

    let accounts = Accounts::new(storage.clone());
    let teams = Teams::new(storage);
    let invitations = Invitations::new(
        accounts.clone(),
        teams.clone(),
        codec.clone(),
        notifier.clone(),
        config.confirm_team_link.clone(),
    );
    let sessions = Sessions::new(accounts.clone(), teams.clone(), codec.clone());
    let resets = PasswordResets::new(
        accounts.clone(),
        codec.clone(),
        notifier,
        config.reset_password_link.clone(),
    );

    log::info!("Starting CrewBase server at {}", config.server_url());

    let bind_addr = (config.server_host.clone(), config.server_port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(codec.clone()))
            .app_data(web::Data::new(accounts.clone()))
            .app_data(web::Data::new(teams.clone()))
            .app_data(web::Data::new(invitations.clone()))
            .app_data(web::Data::new(sessions.clone()))
            .app_data(web::Data::new(resets.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(routes::health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
