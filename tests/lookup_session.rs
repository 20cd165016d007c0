mod common;

use common::*;
use github_h_index::actors::lookup_session::{current_state, submit, LookupSession};
use github_h_index::models::{LookupStatus, RequestState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};

async fn wait_until_settled(updates: &mut watch::Receiver<RequestState>) -> RequestState {
    tokio::time::timeout(
        Duration::from_secs(5),
        updates.wait_for(|state| state.status == LookupStatus::Loaded),
    )
    .await
    .expect("Timed out waiting for lookup")
    .expect("Session closed")
    .clone()
}

#[tokio::test]
async fn test_session_starts_idle() {
    let api = Arc::new(ScriptedGitHub::new());
    let (session, updates) = LookupSession::spawn(aggregator_for(&api))
        .await
        .expect("Failed to spawn session");

    let state = current_state(&session).await.expect("Failed to read state");
    assert_eq!(state, RequestState::idle());
    assert_eq!(*updates.borrow(), RequestState::idle());

    session.stop(None);
}

#[tokio::test]
async fn test_submit_commits_result() {
    let api = Arc::new(alice_and_acme());
    let (session, mut updates) = LookupSession::spawn(aggregator_for(&api))
        .await
        .expect("Failed to spawn session");

    let generation = submit(&session, "alice").await.expect("Failed to submit");
    assert_eq!(generation, 1);

    let state = wait_until_settled(&mut updates).await;
    assert_eq!(state.generation, 1);
    assert_eq!(state.username.as_deref(), Some("alice"));
    assert_eq!(state.result.h_index, 3);
    assert_eq!(state.result.total_stars, 17);

    let snapshot = current_state(&session).await.expect("Failed to read state");
    assert_eq!(snapshot, state);

    session.stop(None);
}

#[tokio::test]
async fn test_submit_clears_previous_result_while_loading() {
    let held = Arc::new(Notify::new());
    let api = Arc::new(alice_and_acme().with_gate("bob", held.clone()));
    let (session, mut updates) = LookupSession::spawn(aggregator_for(&api))
        .await
        .expect("Failed to spawn session");

    submit(&session, "alice").await.expect("Failed to submit");
    wait_until_settled(&mut updates).await;

    let generation = submit(&session, "bob").await.expect("Failed to submit");
    assert_eq!(generation, 2);

    let state = current_state(&session).await.expect("Failed to read state");
    assert!(state.is_loading());
    assert_eq!(state.generation, 2);
    assert_eq!(state.username.as_deref(), Some("bob"));
    assert!(state.result.repositories.is_empty());
    assert_eq!(state.result.total_stars, 0);

    session.stop(None);
}

#[tokio::test]
async fn test_stale_result_is_discarded() {
    let release = Arc::new(Notify::new());
    let api = Arc::new(
        ScriptedGitHub::new()
            .with_pages(user("slow"), vec![Page::Repos(repos_with_stars("slow", &[50, 50]))])
            .with_gate("slow", release.clone())
            .with_pages(user("fast"), vec![Page::Repos(repos_with_stars("fast", &[1]))]),
    );
    let (session, mut updates) = LookupSession::spawn(aggregator_for(&api))
        .await
        .expect("Failed to spawn session");

    let first = submit(&session, "slow").await.expect("Failed to submit");
    let second = submit(&session, "fast").await.expect("Failed to submit");
    assert_eq!((first, second), (1, 2));

    let state = wait_until_settled(&mut updates).await;
    assert_eq!(state.generation, 2);
    assert_eq!(state.username.as_deref(), Some("fast"));

    // the slow lookup only finishes once released, after the newer one committed
    assert_eq!(api.requests_matching("users/slow/orgs"), 0);
    release.notify_one();
    tokio::time::timeout(Duration::from_secs(5), async {
        while api.requests_matching("users/slow/orgs") == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("Slow lookup never finished");
    assert_eq!(api.requests_matching("users/slow/repos"), 1);

    let state = current_state(&session).await.expect("Failed to read state");
    assert_eq!(state.generation, 2);
    assert_eq!(state.username.as_deref(), Some("fast"));
    assert_eq!(state.result.total_stars, 1);

    session.stop(None);
}

#[tokio::test]
async fn test_generations_increase_per_submit() {
    let api = Arc::new(ScriptedGitHub::new());
    let (session, _updates) = LookupSession::spawn(aggregator_for(&api))
        .await
        .expect("Failed to spawn session");

    for expected in 1..=3 {
        let generation = submit(&session, "someone").await.expect("Failed to submit");
        assert_eq!(generation, expected);
    }

    session.stop(None);
}
