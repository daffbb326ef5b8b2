use std::sync::Arc;

use chrono::Duration;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use crewbase::accounts::Accounts;
use crewbase::auth::{Invitations, TokenCodec};
use crewbase::config::{TokenConfig, TokenSettings};
use crewbase::notify::LogNotifier;
use crewbase::storage::MemoryStorage;
use crewbase::teams::Teams;

fn codec() -> Arc<TokenCodec> {
    Arc::new(TokenCodec::new(&TokenConfig {
        session_access: TokenSettings {
            secret: "test-access-secret".into(),
            ttl: Duration::hours(1),
        },
        session_refresh: TokenSettings {
            secret: "test-refresh-secret".into(),
            ttl: Duration::days(14),
        },
        invitation: TokenSettings {
            secret: "test-invitation-secret".into(),
            ttl: Duration::days(7),
        },
        reset: TokenSettings {
            secret: "test-reset-secret".into(),
            ttl: Duration::hours(1),
        },
    }))
}

#[tokio::test]
async fn test_concurrent_find_or_create_yields_one_team() {
    let teams = Teams::new(Arc::new(MemoryStorage::new()));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let teams = teams.clone();
        handles.push(tokio::spawn(async move {
            teams.find_or_create("acme", Uuid::new_v4()).await.unwrap()
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().id);
    }

    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 1, "concurrent find_or_create created duplicates");
}

#[tokio::test]
async fn test_concurrent_confirmations_keep_members_unique() {
    let storage = Arc::new(MemoryStorage::new());
    let accounts = Accounts::new(storage.clone());
    let teams = Teams::new(storage);
    let invitations = Invitations::new(
        accounts.clone(),
        teams.clone(),
        codec(),
        Arc::new(LogNotifier),
        "http://test/confirm-team".into(),
    );

    let mut user = accounts
        .register("Ada", "a@x.com", "Password123!", None)
        .await
        .unwrap();
    let token = invitations.issue(&mut user).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let invitations = invitations.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            invitations.confirm(&token, "Acme").await
        }));
    }

    for handle in handles {
        // Every retry succeeds; the join is idempotent.
        handle.await.unwrap().unwrap();
    }

    let team = teams.find_by_member(user.id).await.unwrap().unwrap();
    assert_eq!(team.members.len(), 1);
}

#[tokio::test]
async fn test_membership_guard_two_team_isolation() {
    let storage = Arc::new(MemoryStorage::new());
    let accounts = Accounts::new(storage.clone());
    let teams = Teams::new(storage);
    let invitations = Invitations::new(
        accounts.clone(),
        teams.clone(),
        codec(),
        Arc::new(LogNotifier),
        "http://test/confirm-team".into(),
    );

    let mut a = accounts
        .register("Ada", "a@x.com", "Password123!", None)
        .await
        .unwrap();
    let token_a = invitations.issue(&mut a).await.unwrap();
    invitations.confirm(&token_a, "Acme").await.unwrap();

    let mut b = accounts
        .register("Bea", "b@x.com", "Password123!", None)
        .await
        .unwrap();
    let token_b = invitations.issue(&mut b).await.unwrap();
    invitations.confirm(&token_b, "Globex").await.unwrap();

    let acme = teams.find_by_member(a.id).await.unwrap().unwrap();
    let globex = teams.find_by_member(b.id).await.unwrap().unwrap();
    assert_ne!(acme.id, globex.id);

    // The predicate the task-mutation path gates on.
    assert!(teams.is_member(a.id, acme.id).await.unwrap());
    assert!(!teams.is_member(a.id, globex.id).await.unwrap());
    assert!(teams.is_member(b.id, globex.id).await.unwrap());
    assert!(!teams.is_member(b.id, acme.id).await.unwrap());
}
