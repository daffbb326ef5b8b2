use chrono::Duration;
use std::env;

/// Signing secret and default time-to-live for one token kind.
#[derive(Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub ttl: Duration,
}

/// Per-kind token settings.
///
/// Every kind carries its own secret so that leakage of one secret cannot be
/// used to forge tokens of another kind. Secrets have no fallback value: a
/// missing secret aborts startup instead of silently signing with a guessable
/// constant.
#[derive(Clone)]
pub struct TokenConfig {
    pub session_access: TokenSettings,
    pub session_refresh: TokenSettings,
    pub invitation: TokenSettings,
    pub reset: TokenSettings,
}

pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub tokens: TokenConfig,
    /// Base URL prepended to invitation tokens in confirmation emails.
    pub confirm_team_link: String,
    /// Base URL prepended to reset tokens in password-reset emails.
    pub reset_password_link: String,
}

fn required_secret(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("{} must be set", name))
}

fn ttl_from_env(name: &str, default_secs: i64) -> Duration {
    let secs = env::var(name)
        .map(|v| v.parse().unwrap_or_else(|_| panic!("{} must be a number of seconds", name)))
        .unwrap_or(default_secs);
    Duration::seconds(secs)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            tokens: TokenConfig {
                session_access: TokenSettings {
                    secret: required_secret("ACCESS_TOKEN_SECRET"),
                    ttl: ttl_from_env("ACCESS_TOKEN_TTL_SECS", 60 * 60),
                },
                session_refresh: TokenSettings {
                    secret: required_secret("REFRESH_TOKEN_SECRET"),
                    ttl: ttl_from_env("REFRESH_TOKEN_TTL_SECS", 14 * 24 * 60 * 60),
                },
                invitation: TokenSettings {
                    secret: required_secret("INVITATION_TOKEN_SECRET"),
                    ttl: ttl_from_env("INVITATION_TOKEN_TTL_SECS", 7 * 24 * 60 * 60),
                },
                reset: TokenSettings {
                    secret: required_secret("RESET_TOKEN_SECRET"),
                    ttl: ttl_from_env("RESET_TOKEN_TTL_SECS", 60 * 60),
                },
            },
            confirm_team_link: env::var("CONFIRMATION_TEAM_LINK")
                .unwrap_or_else(|_| "http://127.0.0.1:8080/confirm-team".to_string()),
            reset_password_link: env::var("RESET_PASSWORD_LINK")
                .unwrap_or_else(|_| "http://127.0.0.1:8080/reset-password".to_string()),
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
