//!
//! # Storage
//!
//! Durable record stores for `User` and `Team`, expressed as traits so the
//! identity flows stay independent of the backing store. Two implementations
//! are provided: [`PgStorage`] for production and [`MemoryStorage`] for tests
//! and local development.
//!
//! Cross-request coordination lives entirely behind these traits: the insert
//! enforces uniqueness, `find_or_create` is atomic from the caller's
//! perspective, and `add_member` is a set-union update. Callers never do
//! check-then-create.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStorage;
pub use postgres::PgStorage;

use crate::error::AppError;
use crate::models::{Team, User};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a new user. Fails with `Conflict` if the email is taken.
    async fn insert(&self, user: &User) -> Result<(), AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Case-insensitive email lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Overwrites an existing record. Fails with `NotFound` if absent.
    async fn update(&self, user: &User) -> Result<(), AppError>;

    /// Clears the stored refresh token matching `refresh_token`, if any.
    /// A silent no-op when nothing matches; logout is idempotent.
    async fn clear_refresh_token(&self, refresh_token: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Returns the team with `name`, creating it with `owner_id` as owner and
    /// sole member if it does not exist. Concurrent calls with the same name
    /// yield exactly one team.
    async fn find_or_create(&self, name: &str, owner_id: Uuid) -> Result<Team, AppError>;

    /// Adds `user_id` to the team's member set. No-op if already a member.
    async fn add_member(&self, team_id: Uuid, user_id: Uuid) -> Result<(), AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>, AppError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Team>, AppError>;

    async fn find_by_member(&self, user_id: Uuid) -> Result<Option<Team>, AppError>;
}
