//! Postgres-backed storage.
//!
//! Uniqueness lives in the schema (`users.email`, `teams.name`, and the
//! `team_members` primary key); see `schema.sql`. Find-or-create is
//! insert-on-conflict followed by a re-fetch, never check-then-create, so it
//! stays correct under concurrent confirmations for the same team name.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Team, User};
use crate::storage::{TeamStore, UserStore};

pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_team(&self, row: TeamRow) -> Result<Team, AppError> {
        let members: Vec<Uuid> =
            sqlx::query_scalar("SELECT user_id FROM team_members WHERE team_id = $1")
                .bind(row.id)
                .fetch_all(&self.pool)
                .await?;

        Ok(Team {
            id: row.id,
            name: row.name,
            owner_id: row.owner_id,
            members: members.into_iter().collect(),
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TeamRow {
    id: Uuid,
    name: String,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl UserStore for PgStorage {
    async fn insert(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO users \
             (id, name, email, password_hash, avatar, team_id, invitation_token, reset_token, refresh_token, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.avatar)
        .bind(user.team_id)
        .bind(&user.invitation_token)
        .bind(&user.reset_token)
        .bind(&user.refresh_token)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE users SET \
             name = $2, email = $3, password_hash = $4, avatar = $5, team_id = $6, \
             invitation_token = $7, reset_token = $8, refresh_token = $9 \
             WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.avatar)
        .bind(user.team_id)
        .bind(&user.invitation_token)
        .bind(&user.reset_token)
        .bind(&user.refresh_token)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }

    async fn clear_refresh_token(&self, refresh_token: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET refresh_token = NULL WHERE refresh_token = $1")
            .bind(refresh_token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TeamStore for PgStorage {
    async fn find_or_create(&self, name: &str, owner_id: Uuid) -> Result<Team, AppError> {
        let candidate = Team::new(name, owner_id);

        // Losing the race is fine: DO NOTHING leaves the winner's row in
        // place and the re-fetch below observes it.
        let inserted = sqlx::query(
            "INSERT INTO teams (id, name, owner_id, created_at) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(candidate.id)
        .bind(&candidate.name)
        .bind(candidate.owner_id)
        .bind(candidate.created_at)
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() == 1 {
            // Owner joins the team they just created.
            self.add_member(candidate.id, owner_id).await?;
        }

        match self.find_by_name(name).await? {
            Some(team) => Ok(team),
            None => Err(AppError::DatabaseError(format!(
                "Team '{}' vanished after find-or-create",
                name
            ))),
        }
    }

    async fn add_member(&self, team_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO team_members (team_id, user_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(team_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>, AppError> {
        let row = sqlx::query_as::<_, TeamRow>(
            "SELECT id, name, owner_id, created_at FROM teams WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.load_team(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Team>, AppError> {
        let row = sqlx::query_as::<_, TeamRow>(
            "SELECT id, name, owner_id, created_at FROM teams WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.load_team(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_member(&self, user_id: Uuid) -> Result<Option<Team>, AppError> {
        let row = sqlx::query_as::<_, TeamRow>(
            "SELECT t.id, t.name, t.owner_id, t.created_at FROM teams t \
             JOIN team_members m ON m.team_id = t.id WHERE m.user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.load_team(row).await?)),
            None => Ok(None),
        }
    }
}
