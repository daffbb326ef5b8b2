//! In-memory storage used by the test suites and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Team, User};
use crate::storage::{TeamStore, UserStore};

#[derive(Default)]
struct UserTable {
    by_id: HashMap<Uuid, User>,
    /// lowercased email -> user id
    by_email: HashMap<String, Uuid>,
}

#[derive(Default)]
struct TeamTable {
    by_id: HashMap<Uuid, Team>,
    by_name: HashMap<String, Uuid>,
}

/// In-memory implementation of [`UserStore`] and [`TeamStore`].
///
/// Each table sits behind a single `RwLock`, so compound operations
/// (insert with uniqueness check, find-or-create) hold one write guard and
/// are atomic with respect to each other.
#[derive(Default)]
pub struct MemoryStorage {
    users: RwLock<UserTable>,
    teams: RwLock<TeamTable>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStorage {
    async fn insert(&self, user: &User) -> Result<(), AppError> {
        let mut table = self.users.write().await;
        let email = user.email.to_lowercase();

        if table.by_email.contains_key(&email) {
            return Err(AppError::Conflict("Email already registered".into()));
        }

        table.by_email.insert(email, user.id);
        table.by_id.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let table = self.users.read().await;
        Ok(table.by_id.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let table = self.users.read().await;
        match table.by_email.get(&email.to_lowercase()) {
            Some(id) => Ok(table.by_id.get(id).cloned()),
            None => Ok(None),
        }
    }

    async fn update(&self, user: &User) -> Result<(), AppError> {
        let mut table = self.users.write().await;
        if !table.by_id.contains_key(&user.id) {
            return Err(AppError::NotFound("User not found".into()));
        }
        table.by_id.insert(user.id, user.clone());
        Ok(())
    }

    async fn clear_refresh_token(&self, refresh_token: &str) -> Result<(), AppError> {
        let mut table = self.users.write().await;
        for user in table.by_id.values_mut() {
            if user.refresh_token.as_deref() == Some(refresh_token) {
                user.refresh_token = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TeamStore for MemoryStorage {
    async fn find_or_create(&self, name: &str, owner_id: Uuid) -> Result<Team, AppError> {
        let mut table = self.teams.write().await;

        if let Some(id) = table.by_name.get(name) {
            let existing = table
                .by_id
                .get(id)
                .cloned()
                .ok_or_else(|| AppError::DatabaseError("Dangling team name index".into()))?;
            return Ok(existing);
        }

        let team = Team::new(name, owner_id);
        table.by_name.insert(name.to_string(), team.id);
        table.by_id.insert(team.id, team.clone());
        Ok(team)
    }

    async fn add_member(&self, team_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let mut table = self.teams.write().await;
        let team = table
            .by_id
            .get_mut(&team_id)
            .ok_or_else(|| AppError::NotFound("Team not found".into()))?;
        // Set insert; repeated joins cannot duplicate.
        team.members.insert(user_id);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>, AppError> {
        let table = self.teams.read().await;
        Ok(table.by_id.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Team>, AppError> {
        let table = self.teams.read().await;
        match table.by_name.get(name) {
            Some(id) => Ok(table.by_id.get(id).cloned()),
            None => Ok(None),
        }
    }

    async fn find_by_member(&self, user_id: Uuid) -> Result<Option<Team>, AppError> {
        let table = self.teams.read().await;
        Ok(table
            .by_id
            .values()
            .find(|team| team.members.contains(&user_id))
            .cloned())
    }
}
