use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use uuid::Uuid;

/// A team record.
///
/// Membership is modelled as a true set so the idempotence of repeated joins
/// is a property of the type, not of a scan-before-push at each call site.
#[derive(Debug, Clone, Serialize)]
pub struct Team {
    pub id: Uuid,
    /// Unique; the human-facing join key.
    pub name: String,
    /// The user whose confirmation caused the team to be created.
    pub owner_id: Uuid,
    pub members: BTreeSet<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Team {
    /// Creates a team with the owner as its sole member.
    pub fn new(name: &str, owner_id: Uuid) -> Self {
        let mut members = BTreeSet::new();
        members.insert(owner_id);
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            owner_id,
            members,
            created_at: Utc::now(),
        }
    }

    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.members.contains(&user_id)
    }
}
