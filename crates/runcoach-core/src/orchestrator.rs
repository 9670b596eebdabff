//! Orchestrator: per-session history, prompt fusion, the bridge call, and
//! the local fallback path.
//!
//! The contract to the caller is uniform: every request yields a
//! [`ChatReply`] of the same shape whether the text came from Gemini or from
//! the local policy + synthesizer. Bridge failures are logged and absorbed —
//! they never surface to the end user.

use crate::gemini::CompletionBridge;
use crate::history::{ConversationTurn, Role, SessionStore};
use crate::plan::{self, RunPlan};
use crate::policy;
use crate::prompts::RUNNING_COACH_SYSTEM;
use crate::slots::{self, SlotSet};
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::SeedableRng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Number of most-recent history turns included in the outbound prompt.
const PROMPT_HISTORY_WINDOW: usize = 8;

/// Last-resort user message when the history somehow holds no user turn.
const DEFAULT_USER_MESSAGE: &str = "러닝 계획에 대해 알려주세요";

/// Fenced ```json block in the LLM reply; the capture is the object literal.
static PLAN_JSON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("plan json regex"));

/// One chat exchange's result. Identical shape for LLM and fallback replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub text: String,
    pub id: String,
    #[serde(rename = "planData", skip_serializing_if = "Option::is_none")]
    pub plan_data: Option<RunPlan>,
}

/// Session-aware coach front: fuses persona + history + slots into a prompt,
/// calls the completion bridge, and synthesizes locally when the bridge fails.
pub struct CoachOrchestrator {
    store: Arc<dyn SessionStore>,
    bridge: Arc<dyn CompletionBridge>,
    rng: Mutex<StdRng>,
}

impl CoachOrchestrator {
    pub fn new(store: Arc<dyn SessionStore>, bridge: Arc<dyn CompletionBridge>) -> Self {
        Self::with_rng(store, bridge, StdRng::from_entropy())
    }

    /// Inject a seeded RNG so template selection and plan jitter are
    /// reproducible in tests.
    pub fn with_rng(store: Arc<dyn SessionStore>, bridge: Arc<dyn CompletionBridge>, rng: StdRng) -> Self {
        Self {
            store,
            bridge,
            rng: Mutex::new(rng),
        }
    }

    /// Handle one inbound user message for the session. Never fails: bridge
    /// and parsing problems degrade to the local fallback reply.
    pub async fn respond(&self, session_id: &str, message: &str) -> ChatReply {
        self.store.append(session_id, ConversationTurn::user(message));
        let history = self.store.snapshot(session_id);
        let slot_set = slots::extract(&history);
        let prompt = build_prompt(&history, &slot_set);

        let (text, plan_data) = match self.bridge.complete(&prompt).await {
            Ok(raw) => {
                debug!(session_id, chars = raw.len(), "completion received");
                let plan = extract_fenced_plan(&raw);
                (raw, plan)
            }
            Err(e) => {
                // Recovered locally; the caller sees the same reply shape.
                warn!(session_id, error = %e, "bridge failed, falling back to local synthesis");
                self.fallback(&history, &slot_set)
            }
        };

        self.store.append(session_id, ConversationTurn::model(text.clone()));

        ChatReply {
            text,
            id: reply_id(),
            plan_data,
        }
    }

    /// Local synthesis: policy reply + run plan from the same slot set.
    fn fallback(&self, history: &[ConversationTurn], slot_set: &SlotSet) -> (String, Option<RunPlan>) {
        let last_user = last_user_message(history);
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let text = policy::respond(slot_set, last_user, &mut *rng);
        let plan = plan::synthesize(slot_set, &mut *rng);
        (text, Some(plan))
    }
}

/// Millisecond-epoch reply id; unique enough for chat-turn identity.
fn reply_id() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

/// Most recent user-authored turn, scanning newest to oldest.
fn last_user_message(history: &[ConversationTurn]) -> &str {
    history
        .iter()
        .rev()
        .find(|t| t.role == Role::User)
        .map(|t| t.text.as_str())
        .unwrap_or(DEFAULT_USER_MESSAGE)
}

/// Fuse persona + recent history + slot block + latest user message.
fn build_prompt(history: &[ConversationTurn], slot_set: &SlotSet) -> String {
    let mut chat_context = String::new();

    let window_start = history.len().saturating_sub(PROMPT_HISTORY_WINDOW);
    let recent = &history[window_start..];
    if recent.len() > 1 {
        chat_context.push_str("이전 대화 내용:\n\n");
        for turn in recent {
            let speaker = match turn.role {
                Role::User => "사용자",
                Role::Model => "코치",
            };
            chat_context.push_str(speaker);
            chat_context.push_str(": ");
            chat_context.push_str(&turn.text);
            chat_context.push_str("\n\n");
        }
    }

    if !slot_set.is_empty() {
        chat_context.push_str("\n사용자 정보:\n");
        chat_context.push_str(&slot_set.prompt_block());
        chat_context.push('\n');
    }

    format!(
        "{RUNNING_COACH_SYSTEM}\n\n{chat_context}\n\n사용자의 메시지: {}",
        last_user_message(history)
    )
}

/// Best-effort plan lift from a fenced ```json block. A malformed block is
/// not an error — the raw text is still the reply.
fn extract_fenced_plan(text: &str) -> Option<RunPlan> {
    let caps = PLAN_JSON_RE.captures(text)?;
    match serde_json::from_str::<RunPlan>(&caps[1]) {
        Ok(plan) => Some(plan),
        Err(e) => {
            debug!(error = %e, "fenced json block did not parse as a plan");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoachError;
    use crate::history::InMemorySessionStore;
    use async_trait::async_trait;

    struct ScriptedBridge {
        reply: Result<String, ()>,
    }

    #[async_trait]
    impl CompletionBridge for ScriptedBridge {
        async fn complete(&self, _prompt: &str) -> Result<String, CoachError> {
            self.reply.clone().map_err(|_| CoachError::Bridge {
                status: 503,
                message: "unavailable".to_string(),
            })
        }
    }

    fn orchestrator(reply: Result<String, ()>) -> (CoachOrchestrator, Arc<InMemorySessionStore>) {
        let store = Arc::new(InMemorySessionStore::new());
        let orchestrator = CoachOrchestrator::with_rng(
            store.clone(),
            Arc::new(ScriptedBridge { reply }),
            StdRng::seed_from_u64(123),
        );
        (orchestrator, store)
    }

    #[tokio::test]
    async fn success_returns_raw_text_and_lifted_plan() {
        let raw = "플랜이 준비됐어요!\n```json\n{\"title\":\"5km 초보자 러닝 플랜\",\"date\":\"2024년 3월 10일 (일) 오전 7:00\",\"distance\":\"5km\",\"duration\":\"약 40분\",\"intensity\":\"가벼움\",\"details\":\"준비운동 5분\"}\n```";
        let (orchestrator, _) = orchestrator(Ok(raw.to_string()));
        let reply = orchestrator.respond("s1", "5km 초보자").await;
        assert_eq!(reply.text, raw);
        let plan = reply.plan_data.expect("plan lifted from fenced block");
        assert_eq!(plan.title, "5km 초보자 러닝 플랜");
        assert_eq!(plan.intensity, "가벼움");
    }

    #[tokio::test]
    async fn malformed_fenced_block_keeps_text_without_plan() {
        let raw = "설명입니다 ```json\n{not valid}\n```";
        let (orchestrator, _) = orchestrator(Ok(raw.to_string()));
        let reply = orchestrator.respond("s1", "안녕하세요").await;
        assert_eq!(reply.text, raw);
        assert!(reply.plan_data.is_none());
    }

    #[tokio::test]
    async fn bridge_failure_is_indistinguishable_in_shape() {
        let (orchestrator, _) = orchestrator(Err(()));
        let reply = orchestrator.respond("s1", "5km 뛰고 싶어요").await;
        assert!(!reply.text.is_empty());
        assert!(!reply.id.is_empty());
        // Fallback always attaches a synthesized plan.
        assert!(reply.plan_data.is_some());
    }

    #[tokio::test]
    async fn fallback_reply_follows_the_policy_cascade() {
        let (orchestrator, _) = orchestrator(Err(()));
        // Distance known, experience missing → the experience question.
        let reply = orchestrator.respond("s1", "5km 뛰고 싶어요").await;
        assert!(reply.text.contains("5km"), "got: {}", reply.text);
        assert!(
            reply.text.contains("초보자") || reply.text.contains("경험"),
            "got: {}",
            reply.text
        );
    }

    #[tokio::test]
    async fn restart_request_wins_in_fallback() {
        let (orchestrator, _) = orchestrator(Err(()));
        orchestrator.respond("s1", "5km 초보자 내일 가볍게 30분").await;
        let reply = orchestrator.respond("s1", "취소하고 싶어요").await;
        assert!(
            reply.text.contains("새로운") || reply.text.contains("변경") || reply.text.contains("새 러닝"),
            "got: {}",
            reply.text
        );
    }

    #[tokio::test]
    async fn both_turns_are_appended_to_the_session() {
        let (orchestrator, store) = orchestrator(Err(()));
        orchestrator.respond("s1", "안녕하세요").await;
        let history = store.snapshot("s1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::Model);
    }

    #[test]
    fn prompt_contains_persona_history_window_and_slot_block() {
        let mut history = Vec::new();
        for i in 0..12 {
            history.push(ConversationTurn::user(format!("메시지 {i}")));
            history.push(ConversationTurn::model(format!("답변 {i}")));
        }
        history.push(ConversationTurn::user("5km 초보자"));
        let slot_set = slots::extract(&history);
        let prompt = build_prompt(&history, &slot_set);

        assert!(prompt.contains("뉴런 러닝 코치"));
        assert!(prompt.contains("사용자 정보:"));
        assert!(prompt.contains("목표 거리: 5km"));
        assert!(prompt.ends_with("사용자의 메시지: 5km 초보자"));
        // Only the last 8 turns appear.
        assert!(!prompt.contains("메시지 0"));
        assert!(prompt.contains("답변 11"));
    }

    #[test]
    fn last_user_message_defaults_when_no_user_turn() {
        let history = vec![ConversationTurn::model("안내")];
        assert_eq!(last_user_message(&history), DEFAULT_USER_MESSAGE);
    }
}
