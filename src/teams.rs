//!
//! # Teams
//!
//! Owner of `Team` records plus the membership predicate the task/project
//! mutation paths gate on. Atomicity of `find_or_create` and the set
//! semantics of `add_member` are delegated to the store, so this service is
//! correct with any number of concurrent request handlers.

use std::sync::Arc;

use crate::error::AppError;
use crate::models::Team;
use crate::storage::TeamStore;
use uuid::Uuid;

#[derive(Clone)]
pub struct Teams {
    teams: Arc<dyn TeamStore>,
}

impl Teams {
    pub fn new(teams: Arc<dyn TeamStore>) -> Self {
        Self { teams }
    }

    pub async fn find_or_create(&self, name: &str, owner_id: Uuid) -> Result<Team, AppError> {
        self.teams.find_or_create(name, owner_id).await
    }

    pub async fn add_member(&self, team_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        self.teams.add_member(team_id, user_id).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>, AppError> {
        self.teams.find_by_id(id).await
    }

    pub async fn find_by_member(&self, user_id: Uuid) -> Result<Option<Team>, AppError> {
        self.teams.find_by_member(user_id).await
    }

    /// Authorization gate for team-owned resources: true iff `team_id` names
    /// a team whose member set contains `user_id`.
    ///
    /// Callers must reject the write before creating any record when this
    /// returns false.
    pub async fn is_member(&self, user_id: Uuid, team_id: Uuid) -> Result<bool, AppError> {
        Ok(self
            .teams
            .find_by_id(team_id)
            .await?
            .map(|team| team.is_member(user_id))
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn teams() -> Teams {
        Teams::new(Arc::new(MemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_is_member() {
        let teams = teams();
        let owner = Uuid::new_v4();
        let joiner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let team = teams.find_or_create("acme", owner).await.unwrap();
        teams.add_member(team.id, joiner).await.unwrap();

        assert!(teams.is_member(owner, team.id).await.unwrap());
        assert!(teams.is_member(joiner, team.id).await.unwrap());
        assert!(!teams.is_member(stranger, team.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_is_member_unknown_team_is_false() {
        let teams = teams();
        assert!(!teams
            .is_member(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap());
    }
}
