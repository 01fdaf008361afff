// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running and skip
//! themselves otherwise. IDs are unique per run so a shared emulator works.

use serde_json::json;
use skillswap_api::config::Config;
use skillswap_api::error::AppError;
use skillswap_api::models::{
    NotificationType, SessionStatus, SwapRequestAction, SwapRequestStatus, SwapStatus,
};
use skillswap_api::AppState;

mod common;
use common::{test_db, unique_id};

async fn test_state() -> AppState {
    AppState::new(Config::test_default(), test_db().await)
}

/// Register and onboard a user who teaches `teaches` and wants `wants`.
async fn onboarded_user(state: &AppState, name: &str, teaches: &str, wants: &str) -> String {
    let id = unique_id(name);
    state
        .users
        .register(
            &id,
            serde_json::from_value(json!({
                "email": format!("{}@example.com", name),
                "name": name,
            }))
            .unwrap(),
        )
        .await
        .unwrap();

    state
        .users
        .complete_onboarding(
            &id,
            serde_json::from_value(json!({
                "skills_i_teach": [{ "name": teaches, "category": "Other", "level": "Advanced" }],
                "skills_i_want_to_learn": [
                    { "name": wants, "category": "Other", "level": "Beginner" }
                ],
                "prefer_online": true,
            }))
            .unwrap(),
        )
        .await
        .unwrap();

    id
}

// ═══════════════════════════════════════════════════════════════════════════
// USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_register_is_idempotent() {
    require_emulator!();

    let state = test_state().await;
    let id = unique_id("reg");
    let input = || {
        serde_json::from_value(json!({ "email": "reg@example.com", "name": "Reg" })).unwrap()
    };

    let first = state.users.register(&id, input()).await.unwrap();
    assert!(!first.is_onboarding_complete);

    let second = state.users.register(&id, input()).await.unwrap();
    assert_eq!(second.created_at, first.created_at);
    assert!(second.last_login_at.is_some());
}

#[tokio::test]
async fn test_missing_user_is_not_found() {
    require_emulator!();

    let state = test_state().await;
    let err = state.users.get(&unique_id("ghost")).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_mutual_match_found() {
    require_emulator!();

    let state = test_state().await;
    let flute = unique_id("Flute");
    let oboe = unique_id("Oboe");
    let alice = onboarded_user(&state, "alice", &flute, &oboe).await;
    let bob = onboarded_user(&state, "bob", &oboe, &flute).await;

    let matches = state.matching.find_matches(&alice).await.unwrap();
    let found = matches
        .iter()
        .find(|m| m.user.id == bob)
        .expect("bob should match alice");
    assert!(found.score > 0.0);
    assert_eq!(found.skills_they_teach, vec![oboe.clone()]);
}

// ═══════════════════════════════════════════════════════════════════════════
// SWAP LIFECYCLE
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_full_swap_lifecycle() {
    require_emulator!();

    let state = test_state().await;
    let alice = onboarded_user(&state, "alice", "Guitar", "Spanish").await;
    let bob = onboarded_user(&state, "bob", "Spanish", "Guitar").await;

    // Request and accept
    let request = state
        .swaps
        .create_request(
            &alice,
            serde_json::from_value(json!({ "recipient_id": bob, "message": "Hola!" })).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(request.status, SwapRequestStatus::Pending);

    let pending = state.swaps.pending_for_user(&bob).await.unwrap();
    assert!(pending.iter().any(|r| r.id == request.id));

    // Only the recipient may accept.
    let err = state
        .swaps
        .respond(&request.id, &alice, SwapRequestAction::Accept)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let outcome = state
        .swaps
        .respond(&request.id, &bob, SwapRequestAction::Accept)
        .await
        .unwrap();
    assert_eq!(outcome.request.status, SwapRequestStatus::Accepted);
    let swap = outcome.swap.expect("accept creates a swap");
    assert_eq!(swap.status, SwapStatus::Confirmed);

    // A second answer is refused.
    let err = state
        .swaps
        .respond(&request.id, &bob, SwapRequestAction::Accept)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Chat
    let conversation_id = outcome
        .request
        .conversation_id
        .clone()
        .expect("accept opens a conversation");
    state
        .chat
        .send_message(
            &conversation_id,
            &alice,
            serde_json::from_value(json!({ "content": "  When works for you?  " })).unwrap(),
        )
        .await
        .unwrap();

    let messages = state.chat.list_messages(&conversation_id, &bob, None).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "When works for you?");

    let conversations = state.chat.list_conversations(&bob).await.unwrap();
    let conversation = conversations
        .iter()
        .find(|c| c.id == conversation_id)
        .unwrap();
    assert!(conversation.unread_by.contains(&bob));

    // Session
    let session = state
        .sessions
        .schedule(
            &alice,
            serde_json::from_value(json!({
                "swap_id": swap.id,
                "skill_topic": "Guitar",
                "scheduled_at": "2030-01-15T10:00:00Z",
                "duration_minutes": 60,
            }))
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(session.status, SessionStatus::Scheduled);

    let session = state.sessions.complete(&session.id, &bob).await.unwrap();
    assert_eq!(session.status, SessionStatus::Completed);

    let swap = state.swaps.get_swap_for(&swap.id, &alice).await.unwrap();
    assert_eq!(swap.status, SwapStatus::Completed);

    for id in [&alice, &bob] {
        let user = state.users.get(id).await.unwrap();
        assert_eq!(user.total_swaps_completed, 1);
        assert_eq!(user.total_skills_taught, 1);
        assert_eq!(user.total_skills_learned, 1);
    }

    // Rating
    let rating = state
        .ratings
        .rate(
            &alice,
            serde_json::from_value(json!({
                "swap_id": swap.id,
                "rated_user_id": bob,
                "rating": 5,
                "review": "Great teacher",
            }))
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(rating.rated_by_id, alice);

    let bob_user = state.users.get(&bob).await.unwrap();
    assert_eq!(bob_user.total_reviews, 1);
    assert!((bob_user.average_rating - 5.0).abs() < f64::EPSILON);

    let err = state
        .ratings
        .rate(
            &alice,
            serde_json::from_value(json!({
                "swap_id": swap.id,
                "rated_user_id": bob,
                "rating": 4,
            }))
            .unwrap(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Notifications reached bob along the way.
    let notifications = state.notifications.list(&bob, 50).await.unwrap();
    let kinds: Vec<_> = notifications.iter().map(|n| n.kind).collect();
    assert!(kinds.contains(&NotificationType::SwapRequest));
    assert!(kinds.contains(&NotificationType::NewMessage));
    assert!(kinds.contains(&NotificationType::RatingReceived));

    let updated = state.notifications.mark_all_read(&bob).await.unwrap();
    assert!(updated > 0);
    assert!(state.notifications.unread(&bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_accepts_create_at_most_one_swap() {
    require_emulator!();

    let state = test_state().await;
    let alice = onboarded_user(&state, "alice", "Violin", "Welsh").await;
    let bob = onboarded_user(&state, "bob", "Welsh", "Violin").await;

    let request = state
        .swaps
        .create_request(
            &alice,
            serde_json::from_value(json!({ "recipient_id": bob })).unwrap(),
        )
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        state.swaps.respond(&request.id, &bob, SwapRequestAction::Accept),
        state.swaps.respond(&request.id, &bob, SwapRequestAction::Accept),
    );
    let accepted = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert!(accepted <= 1, "both concurrent accepts succeeded");

    let swaps = state.swaps.list_swaps(&bob, None).await.unwrap();
    let created = swaps
        .iter()
        .filter(|s| s.swap_request_id == request.id)
        .count();
    assert_eq!(created, accepted);

    // Once accepted, any further accept is refused.
    if accepted == 1 {
        let err = state
            .swaps
            .respond(&request.id, &bob, SwapRequestAction::Accept)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}

#[tokio::test]
async fn test_second_completion_does_not_credit_again() {
    require_emulator!();

    let state = test_state().await;
    let alice = onboarded_user(&state, "alice", "Pottery", "Italian").await;
    let bob = onboarded_user(&state, "bob", "Italian", "Pottery").await;
    let carol = onboarded_user(&state, "carol", "Italian", "Pottery").await;

    let request = state
        .swaps
        .create_request(
            &alice,
            serde_json::from_value(json!({ "recipient_id": bob })).unwrap(),
        )
        .await
        .unwrap();
    let swap = state
        .swaps
        .respond(&request.id, &bob, SwapRequestAction::Accept)
        .await
        .unwrap()
        .swap
        .unwrap();

    let mut sessions = Vec::new();
    for day in ["2030-02-01T10:00:00Z", "2030-02-08T10:00:00Z"] {
        let session = state
            .sessions
            .schedule(
                &alice,
                serde_json::from_value(json!({
                    "swap_id": swap.id,
                    "skill_topic": "Pottery",
                    "scheduled_at": day,
                    "duration_minutes": 90,
                }))
                .unwrap(),
            )
            .await
            .unwrap();
        sessions.push(session);
    }

    state.sessions.complete(&sessions[0].id, &bob).await.unwrap();

    // The same session cannot complete twice.
    let err = state
        .sessions
        .complete(&sessions[0].id, &alice)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Another session of an already completed swap leaves the counters alone.
    let session = state.sessions.complete(&sessions[1].id, &alice).await.unwrap();
    assert_eq!(session.status, SessionStatus::Completed);

    for id in [&alice, &bob] {
        let user = state.users.get(id).await.unwrap();
        assert_eq!(user.total_swaps_completed, 1);
        assert_eq!(user.total_skills_taught, 1);
        assert_eq!(user.total_skills_learned, 1);
    }

    // Completed swaps are listed for both participants, and for nobody else.
    for id in [&alice, &bob] {
        let completed = state
            .swaps
            .list_swaps(id, Some(SwapStatus::Completed))
            .await
            .unwrap();
        assert!(completed.iter().any(|s| s.id == swap.id));
    }
    let open = state
        .swaps
        .list_swaps(&alice, Some(SwapStatus::Confirmed))
        .await
        .unwrap();
    assert!(open.iter().all(|s| s.id != swap.id));
    assert!(state.swaps.list_swaps(&carol, None).await.unwrap().is_empty());

    // The request itself is visible to its participants only.
    let fetched = state.swaps.get_request_for(&request.id, &alice).await.unwrap();
    assert_eq!(fetched.swap_id.as_deref(), Some(swap.id.as_str()));
    let err = state
        .swaps
        .get_request_for(&request.id, &carol)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_rating_requires_completed_swap() {
    require_emulator!();

    let state = test_state().await;
    let alice = onboarded_user(&state, "alice", "Chess", "Go").await;
    let bob = onboarded_user(&state, "bob", "Go", "Chess").await;

    let request = state
        .swaps
        .create_request(
            &alice,
            serde_json::from_value(json!({ "recipient_id": bob })).unwrap(),
        )
        .await
        .unwrap();
    let swap = state
        .swaps
        .respond(&request.id, &bob, SwapRequestAction::Accept)
        .await
        .unwrap()
        .swap
        .unwrap();

    let err = state
        .ratings
        .rate(
            &alice,
            serde_json::from_value(json!({
                "swap_id": swap.id,
                "rated_user_id": bob,
                "rating": 5,
            }))
            .unwrap(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_rejected_request_has_no_swap() {
    require_emulator!();

    let state = test_state().await;
    let alice = onboarded_user(&state, "alice", "Knitting", "Baking").await;
    let bob = onboarded_user(&state, "bob", "Baking", "Knitting").await;

    let request = state
        .swaps
        .create_request(
            &alice,
            serde_json::from_value(json!({ "recipient_id": bob })).unwrap(),
        )
        .await
        .unwrap();

    let outcome = state
        .swaps
        .respond(&request.id, &bob, SwapRequestAction::Reject)
        .await
        .unwrap();
    assert_eq!(outcome.request.status, SwapRequestStatus::Rejected);
    assert!(outcome.swap.is_none());

    let err = state
        .chat
        .start_from_request(&alice, &request.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_admin_ban_blocks_requests() {
    require_emulator!();

    let state = test_state().await;
    let alice = onboarded_user(&state, "alice", "Chess", "Poker").await;
    let bob = onboarded_user(&state, "bob", "Poker", "Chess").await;
    let admin = unique_id("admin");

    let banned = state.admin.ban(&admin, &alice, "spam").await.unwrap();
    assert!(banned.is_banned);

    let err = state
        .swaps
        .create_request(
            &alice,
            serde_json::from_value(json!({ "recipient_id": bob })).unwrap(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let unbanned = state.admin.unban(&admin, &alice).await.unwrap();
    assert!(!unbanned.is_banned);
    assert!(unbanned.banned_reason.is_none());
}
