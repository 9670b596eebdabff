//! Response policy: decide what the coach says next from the slot set.
//!
//! The decision is an ordered priority cascade, not independent checks — a
//! restart request beats everything, a complete slot set beats the questions,
//! and the questions follow the collection order (distance → experience →
//! date → intensity → time goal). Each category owns a pool of Korean
//! templates; selection within a pool is uniform-random through the caller's
//! RNG so tests can pin a seed.

use crate::slots::{Slot, SlotSet};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// What kind of reply the coach should produce next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseCategory {
    RestartAcknowledgement,
    PlanReady,
    AskDistance,
    AskExperience,
    AskDate,
    AskIntensity,
    AskTimeGoal,
    Greeting,
    Default,
}

const GREETING_TOKENS: [&str; 3] = ["안녕", "hi", "hello"];

/// True when the four mandatory slots plus one of time/pace are filled.
pub fn plan_ready(slots: &SlotSet) -> bool {
    slots.contains(Slot::ExperienceLevel)
        && slots.contains(Slot::TargetDistance)
        && slots.contains(Slot::DateTime)
        && slots.contains(Slot::Intensity)
        && (slots.contains(Slot::TargetTime) || slots.contains(Slot::TargetPace))
}

/// Priority cascade over the slot set; first matching rule wins.
pub fn decide(slots: &SlotSet, last_user_message: &str) -> ResponseCategory {
    if slots.contains(Slot::RestartRequested) {
        return ResponseCategory::RestartAcknowledgement;
    }
    if plan_ready(slots) {
        return ResponseCategory::PlanReady;
    }
    if !slots.contains(Slot::TargetDistance) {
        return ResponseCategory::AskDistance;
    }
    if !slots.contains(Slot::ExperienceLevel) {
        return ResponseCategory::AskExperience;
    }
    if !slots.contains(Slot::DateTime) {
        return ResponseCategory::AskDate;
    }
    if !slots.contains(Slot::Intensity) {
        return ResponseCategory::AskIntensity;
    }
    if !slots.contains(Slot::TargetTime) && !slots.contains(Slot::TargetPace) {
        return ResponseCategory::AskTimeGoal;
    }
    let lowered = last_user_message.to_lowercase();
    if GREETING_TOKENS.iter().any(|token| lowered.contains(token)) {
        return ResponseCategory::Greeting;
    }
    ResponseCategory::Default
}

// ---------------------------------------------------------------------------
// Template pools. PlanReady interpolates slot values (with defaults for any
// gap) plus a random emoji; the Ask* pools interpolate what is already known
// so the question feels anchored in the conversation.
// ---------------------------------------------------------------------------

const PLAN_EMOJIS: [&str; 7] = ["😊", "👍", "🏃‍♀️", "🏃", "💪", "✨", "🌟"];

/// Render the reply text for a category. Selection within each pool is
/// uniform-random; callers that need determinism pass a seeded RNG.
pub fn render(category: ResponseCategory, slots: &SlotSet, rng: &mut impl Rng) -> String {
    match category {
        ResponseCategory::RestartAcknowledgement => choose(
            rng,
            &[
                "새로운 러닝 계획을 원하시는군요! 😊 어떤 거리와 난이도로 새롭게 만들어드릴까요?",
                "기존 계획을 변경해드릴게요! 어떤 거리로 달리고 싶으신가요? 그리고 언제 달리실 계획인지도 알려주세요~",
                "새 러닝 플랜을 만들어 드릴게요! 목표 거리와 달리고 싶은 날짜를 알려주시면 바로 준비해드릴게요 👍",
            ],
        ),
        ResponseCategory::PlanReady => {
            let experience = slots.get(Slot::ExperienceLevel).unwrap_or("초보자");
            let distance = slots.get(Slot::TargetDistance).unwrap_or("5km");
            let date = slots.get(Slot::DateTime).unwrap_or("내일 아침");
            let time = slots
                .get(Slot::TargetTime)
                .or_else(|| slots.get(Slot::TargetPace))
                .unwrap_or("");
            let intensity = slots.get(Slot::Intensity).unwrap_or("중간");
            let emoji = choose(rng, &PLAN_EMOJIS);
            let time_prefix = if time.is_empty() {
                String::new()
            } else {
                format!("{time} 목표로 ")
            };
            let pool = [
                format!(
                    "{date}에 {distance} 달리기 플랜이 준비됐어요! {emoji} {time_prefix}{intensity} 강도로 시작해보세요. 아래 위젯에서 세부 계획을 확인하실 수 있어요~"
                ),
                format!(
                    "{experience} 수준에 맞는 {distance} 플랜을 만들었어요! {emoji} {date}에 {intensity} 강도로 진행하시면 좋을 것 같아요. 세부 계획은 아래 카드에서 확인하세요!"
                ),
                format!(
                    "{date} {distance} 러닝 계획이 완성됐어요! {emoji} {time}{intensity} 강도로 달리는 맞춤 플랜이니 참고하세요. 즐거운 러닝 되세요~"
                ),
            ];
            choose_owned(rng, &pool)
        }
        ResponseCategory::AskDistance => choose(
            rng,
            &[
                "안녕하세요! 뉴런 러닝 코치예요~ 😊 어떤 거리를 목표로 하고 계신가요? 5km, 10km 등 알려주시면 맞춤 플랜을 만들어 드릴게요!",
                "반가워요! 러닝 플랜을 위해 목표 거리부터 알려주세요~ 5km, 10km 등 달리고 싶은 거리가 있으신가요? 🏃‍♀️",
                "안녕하세요! 뉴런 러닝 코치입니다~ 어떤 거리로 러닝 계획을 세워드릴까요? 목표 거리를 알려주세요! 😊",
            ],
        ),
        ResponseCategory::AskExperience => {
            let distance = slots.get(Slot::TargetDistance).unwrap_or("5km");
            let pool = [
                format!(
                    "{distance} 러닝 플랜이군요! 👍 혹시 달리기 경험은 어느 정도인가요? 초보자, 중급자, 고급자 중에 골라주시면 맞춤 플랜을 만들어 드릴게요~"
                ),
                format!(
                    "{distance} 목표 좋아요! 😊 달리기 경험이 초보자, 중급자, 고급자 중 어디에 가까우신가요? 수준에 맞춰 플랜을 짜드릴게요~"
                ),
            ];
            choose_owned(rng, &pool)
        }
        ResponseCategory::AskDate => {
            let experience = slots.get(Slot::ExperienceLevel).unwrap_or("초보자");
            let distance = slots.get(Slot::TargetDistance).unwrap_or("5km");
            let pool = [
                format!(
                    "{experience}를 위한 {distance} 플랜이군요! 😊 언제 달리실 계획인가요? 내일, 주말 등 알려주시면 더 구체적인 계획을 세워드릴게요~"
                ),
                format!(
                    "{distance} 플랜 준비 중이에요! 🏃 언제 달리실 예정인가요? 내일 아침, 주말 저녁처럼 편한 시간을 알려주세요~"
                ),
            ];
            choose_owned(rng, &pool)
        }
        ResponseCategory::AskIntensity => {
            let distance = slots.get(Slot::TargetDistance).unwrap_or("5km");
            let date = slots.get(Slot::DateTime).unwrap_or("내일");
            let pool = [
                format!(
                    "{date}에 {distance} 달리실 계획이군요! 어느 정도 강도로 달리고 싶으신가요? 가벼움, 중간, 높음 중에 알려주세요~ 💪"
                ),
                format!(
                    "{date} {distance} 러닝, 기대되네요! 😊 강도는 가벼움, 중간, 높음 중 어떤 느낌으로 준비해드릴까요?"
                ),
            ];
            choose_owned(rng, &pool)
        }
        ResponseCategory::AskTimeGoal => {
            let distance = slots.get(Slot::TargetDistance).unwrap_or("5km");
            let pool = [
                format!(
                    "거의 다 왔어요! 👍 {distance}를 완주하는데 목표 시간이나, 페이스가 있으신가요? 예를 들어 \"30분 안에\" 또는 \"킬로당 6분\" 같은 목표요!"
                ),
                format!(
                    "마지막 질문이에요! 😊 {distance} 완주 목표 시간이나 페이스가 있으신가요? \"40분 안에\", \"킬로당 7분\"처럼 알려주세요~"
                ),
            ];
            choose_owned(rng, &pool)
        }
        ResponseCategory::Greeting => choose(
            rng,
            &[
                "안녕하세요! 뉴런 러닝 코치예요~ 😊 오늘은 어떤 달리기 계획을 도와드릴까요?",
                "반가워요! 뉴런 러닝 코치입니다. 어떤 달리기 목표를 갖고 계신가요? 도와드릴게요! 👋",
                "안녕하세요! 달리기 계획을 함께 세워볼까요? 어떤 거리를 목표로 하고 계신지 알려주세요~ 🏃‍♀️",
            ],
        ),
        ResponseCategory::Default => choose(
            rng,
            &[
                "뉴런 러닝 코치예요~ 💪 맞춤 러닝 플랜을 위해 목표 거리와 달리기 경험을 알려주세요!",
                "즐거운 러닝을 위한 맞춤 플랜을 만들어 드릴게요! 😊 목표 거리, 경험 수준, 그리고 언제 달리실 건지 알려주세요~",
                "안녕하세요! 뉴런과 함께 달려볼까요? 🏃‍♀️ 어떤 거리를 목표로 하시는지, 그리고 달리기 경험은 어느 정도인지 알려주세요!",
            ],
        ),
    }
}

/// Decide + render in one step.
pub fn respond(slots: &SlotSet, last_user_message: &str, rng: &mut impl Rng) -> String {
    render(decide(slots, last_user_message), slots, rng)
}

fn choose(rng: &mut impl Rng, pool: &[&'static str]) -> String {
    pool.choose(rng).copied().unwrap_or(pool[0]).to_string()
}

fn choose_owned(rng: &mut impl Rng, pool: &[String]) -> String {
    pool.choose(rng).cloned().unwrap_or_else(|| pool[0].clone())
}
