//! End-to-end coaching flow against a failing bridge (local fallback path).
//!
//! Scenarios:
//! 1. A fresh session is walked from greeting through the slot questions to a
//!    ready plan, with the question order following the policy cascade.
//! 2. Fallback replies always carry a synthesized plan card.
//! 3. A restart request resets nothing in history but is acknowledged first.
//! 4. Long sessions are truncated to the opening turn plus the recent tail.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use runcoach_core::{
    CoachError, CoachOrchestrator, CompletionBridge, ConversationTurn, InMemorySessionStore,
    SessionStore,
};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct OfflineBridge;

#[async_trait]
impl CompletionBridge for OfflineBridge {
    async fn complete(&self, _prompt: &str) -> Result<String, CoachError> {
        Err(CoachError::Bridge {
            status: 503,
            message: "offline".to_string(),
        })
    }
}

fn offline_orchestrator() -> (CoachOrchestrator, Arc<InMemorySessionStore>) {
    let store = Arc::new(InMemorySessionStore::new());
    let orchestrator = CoachOrchestrator::with_rng(
        store.clone(),
        Arc::new(OfflineBridge),
        StdRng::seed_from_u64(42),
    );
    (orchestrator, store)
}

// ---------------------------------------------------------------------------
// 1. Question cascade up to a ready plan
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dialogue_walks_the_question_cascade_to_a_plan() {
    let (coach, _) = offline_orchestrator();
    let session = "flow";

    // With no slots yet, even a greeting routes to the distance question.
    let reply = coach.respond(session, "안녕하세요").await;
    assert!(
        reply.text.contains("거리") || reply.text.contains("km"),
        "distance question, got: {}",
        reply.text
    );

    // Still no distance.
    let reply = coach.respond(session, "러닝 시작하고 싶어요").await;
    assert!(
        reply.text.contains("거리") || reply.text.contains("km"),
        "distance question, got: {}",
        reply.text
    );

    // Distance known, experience asked next.
    let reply = coach.respond(session, "5km 뛰고 싶어요").await;
    assert!(
        reply.text.contains("초보자") || reply.text.contains("경험"),
        "experience question, got: {}",
        reply.text
    );

    // Then the date.
    let reply = coach.respond(session, "초보자예요").await;
    assert!(
        reply.text.contains("언제") || reply.text.contains("날짜") || reply.text.contains("요일"),
        "date question, got: {}",
        reply.text
    );

    // Then intensity.
    let reply = coach.respond(session, "내일 아침에요").await;
    assert!(
        reply.text.contains("강도") || reply.text.contains("가볍"),
        "intensity question, got: {}",
        reply.text
    );

    // Then the time or pace goal.
    let reply = coach.respond(session, "가볍게요").await;
    assert!(
        reply.text.contains("시간") || reply.text.contains("페이스"),
        "time goal question, got: {}",
        reply.text
    );

    // All mandatory slots present: the plan is announced and attached.
    let reply = coach.respond(session, "30분 정도요").await;
    assert!(
        reply.text.contains("플랜") || reply.text.contains("계획"),
        "plan announcement, got: {}",
        reply.text
    );
    let plan = reply.plan_data.expect("plan card");
    assert_eq!(plan.distance, "5km");
    assert_eq!(plan.intensity, "가벼움");
    assert!(plan.title.contains("초보자"));
}

// ---------------------------------------------------------------------------
// 2. Fallback shape
// ---------------------------------------------------------------------------

#[tokio::test]
async fn every_fallback_reply_carries_a_plan_card() {
    let (coach, _) = offline_orchestrator();
    for message in ["안녕", "10km 목표", "중급자입니다"] {
        let reply = coach.respond("shape", message).await;
        assert!(!reply.text.is_empty());
        assert!(reply.id.parse::<i64>().is_ok(), "epoch-millis id");
        assert!(reply.plan_data.is_some(), "plan attached for {message}");
    }
}

// ---------------------------------------------------------------------------
// 3. Restart acknowledgement outranks everything
// ---------------------------------------------------------------------------

#[tokio::test]
async fn restart_request_is_acknowledged_even_when_plan_ready() {
    let (coach, _) = offline_orchestrator();
    let session = "restart";
    coach
        .respond(session, "5km 초보자 내일 아침 가볍게 30분")
        .await;

    let reply = coach.respond(session, "계획을 다시 바꿔 주세요").await;
    assert!(
        reply.text.contains("새로운") || reply.text.contains("변경") || reply.text.contains("새 러닝"),
        "restart acknowledgement, got: {}",
        reply.text
    );
}

// ---------------------------------------------------------------------------
// 4. Session retention
// ---------------------------------------------------------------------------

#[tokio::test]
async fn long_sessions_keep_opening_turn_plus_recent_tail() {
    let (coach, store) = offline_orchestrator();
    let session = "long";

    // Each exchange appends two turns; ten exchanges cross the threshold.
    for i in 0..10 {
        coach.respond(session, &format!("메시지 {i}")).await;
    }

    let history = store.snapshot(session);
    assert_eq!(history.len(), 10);
    assert_eq!(history[0].text, "메시지 0");
    // The tail is the most recent turns, ending with the last coach reply.
    assert_eq!(history.last().map(|t| t.role), Some(runcoach_core::Role::Model));
}

// ---------------------------------------------------------------------------
// 5. Slot extraction sees the whole retained history
// ---------------------------------------------------------------------------

#[tokio::test]
async fn slots_accumulate_across_turns() {
    let (coach, store) = offline_orchestrator();
    let session = "accumulate";
    coach.respond(session, "10km 뛰고 싶어요").await;
    coach.respond(session, "중급자예요").await;

    let slots = runcoach_core::slots::extract(&store.snapshot(session));
    assert_eq!(slots.get(runcoach_core::Slot::TargetDistance), Some("10km"));
    assert_eq!(slots.get(runcoach_core::Slot::ExperienceLevel), Some("중급자"));

    // Plan synthesis honors the accumulated slots.
    let reply = coach.respond(session, "내일 저녁 가볍게 50분").await;
    let plan = reply.plan_data.expect("plan card");
    assert_eq!(plan.title, "10km 중급자 러닝 플랜");
}

// ---------------------------------------------------------------------------
// 6. History builder sanity for direct store use
// ---------------------------------------------------------------------------

#[tokio::test]
async fn store_snapshot_preserves_turn_order() {
    let store = InMemorySessionStore::new();
    store.append("s", ConversationTurn::user("하나"));
    store.append("s", ConversationTurn::model("둘"));
    let history = store.snapshot("s");
    assert_eq!(history[0].text, "하나");
    assert_eq!(history[1].text, "둘");
}
