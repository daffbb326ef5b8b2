//!
//! # Accounts
//!
//! Owner of `User` records: registration with credential hashing, password
//! verification and rotation, and lookups. Every other component mutates
//! users through this service; none of them see the password hash in a
//! response, and raw passwords exist only transiently inside this module's
//! calls into `auth::password`.

use std::sync::Arc;

use crate::auth::password::{hash_password, verify_password};
use crate::error::AppError;
use crate::models::User;
use crate::storage::UserStore;
use uuid::Uuid;

#[derive(Clone)]
pub struct Accounts {
    users: Arc<dyn UserStore>,
}

impl Accounts {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Creates a user with a freshly salted hash of `password`.
    ///
    /// Fails with `Conflict` when the email is already registered; the
    /// existing record is never overwritten.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        avatar: Option<String>,
    ) -> Result<User, AppError> {
        let password_hash = hash_password(password)?;
        let user = User::new(name, email, password_hash, avatar);
        self.users.insert(&user).await?;
        Ok(user)
    }

    /// Checks `password` against the stored hash. The hash itself is never
    /// returned or logged.
    pub fn verify_password(&self, user: &User, password: &str) -> Result<bool, AppError> {
        verify_password(password, &user.password_hash)
    }

    /// Replaces the stored hash and persists the record as-is.
    ///
    /// Invalidates nothing else by itself; clearing the reset token is the
    /// reset flow's responsibility (it does so on `user` before calling in).
    pub async fn rotate_password(
        &self,
        user: &mut User,
        new_password: &str,
    ) -> Result<(), AppError> {
        user.password_hash = hash_password(new_password)?;
        self.users.update(user).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        self.users.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.users.find_by_email(email).await
    }

    /// Persists an updated record (token fields, team assignment).
    pub async fn save(&self, user: &User) -> Result<(), AppError> {
        self.users.update(user).await
    }

    /// Clears whichever record currently stores `refresh_token`. Silent
    /// no-op when none does.
    pub async fn clear_refresh_token(&self, refresh_token: &str) -> Result<(), AppError> {
        self.users.clear_refresh_token(refresh_token).await
    }
}
