//! Plan synthesis: build a structured run-plan card from the slot set.
//!
//! The plan's *structure* is deterministic per branch; the numeric details
//! (duration minutes, interval counts, paces, start time) carry bounded
//! random jitter so repeated fallback plans do not read identically. The
//! jitter comes from the caller's RNG, seedable in tests.
//!
//! The `intensity` field is a fixed label per experience branch (beginner →
//! 가벼움, intermediate → 중간, advanced → 높음, generic → 중간) and ignores
//! any extracted `intensity` slot. The chat answer can therefore state a
//! different intensity than the plan card shows; the mismatch is documented
//! behavior, not reconciled here.

use crate::slots::{Slot, SlotSet};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Structured workout summary shown alongside the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPlan {
    pub title: String,
    /// Localized long date string, e.g. "2024년 3월 10일 (일) 오전 7:00".
    pub date: String,
    pub distance: String,
    pub duration: String,
    /// 가벼움 | 중간 | 높음.
    pub intensity: String,
    pub details: String,
}

const DEFAULT_DISTANCE_KM: u32 = 5;

/// Korean single-character weekday names, Sunday first.
fn korean_weekday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "일",
        Weekday::Mon => "월",
        Weekday::Tue => "화",
        Weekday::Wed => "수",
        Weekday::Thu => "목",
        Weekday::Fri => "금",
        Weekday::Sat => "토",
    }
}

/// Leading digits of the distance slot value, defaulting to 5.
fn distance_km(slots: &SlotSet) -> u32 {
    slots
        .get(Slot::TargetDistance)
        .and_then(|value| {
            let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()
        })
        .unwrap_or(DEFAULT_DISTANCE_KM)
}

/// Random morning slot 1–7 days after `today`: 6–9 o'clock, minutes in
/// 10-minute increments, formatted as the localized long date string.
fn random_morning_date(today: NaiveDate, rng: &mut impl Rng) -> String {
    let date = today + Duration::days(rng.gen_range(1..=7));
    let hour = 6 + rng.gen_range(0..4);
    let minute = rng.gen_range(0..6) * 10;
    format!(
        "{}년 {}월 {}일 ({}) 오전 {}:{:02}",
        date.year(),
        date.month(),
        date.day(),
        korean_weekday(date.weekday()),
        hour,
        minute
    )
}

/// Build a run plan from the slots, anchored at today's date.
pub fn synthesize(slots: &SlotSet, rng: &mut impl Rng) -> RunPlan {
    synthesize_at(slots, chrono::Local::now().date_naive(), rng)
}

/// Same as [`synthesize`] with an explicit anchor date, for tests.
pub fn synthesize_at(slots: &SlotSet, today: NaiveDate, rng: &mut impl Rng) -> RunPlan {
    let experience = slots.get(Slot::ExperienceLevel).unwrap_or("초보자");
    let target_distance = slots.get(Slot::TargetDistance).unwrap_or("5km").to_string();
    let frequency = slots.get(Slot::WeeklyFrequency).unwrap_or("주 3회");
    let goal = slots.get(Slot::MotivationalGoal).unwrap_or("");

    let date = random_morning_date(today, rng);
    let d = distance_km(slots);

    if experience.contains("초보") || experience.contains("beginner") {
        let walk = rng.gen_range(0..2) + 2;
        let run = rng.gen_range(0..2) + 1;
        return RunPlan {
            title: format!("{target_distance} 초보자 러닝 플랜"),
            date,
            distance: target_distance,
            duration: format!("약 {}분", d * 7 + rng.gen_range(0..10)),
            intensity: "가벼움".to_string(),
            details: format!(
                "준비운동 5분 → {walk}분 걷기/{run}분 달리기 반복(총 {}분) → 정리운동 5분",
                d * 5
            ),
        };
    }

    if experience.contains("중급") || experience.contains("intermediate") {
        let pace_min = rng.gen_range(0..2) + 5;
        let pace_ten_sec = rng.gen_range(0..6);
        return RunPlan {
            title: format!("{target_distance} 중급자 러닝 플랜"),
            date,
            distance: target_distance.clone(),
            duration: format!("약 {}분", d * 6 + rng.gen_range(0..10)),
            intensity: "중간".to_string(),
            details: format!(
                "준비운동 8분 → {target_distance} 일정 페이스로 달리기({pace_min}:{pace_ten_sec}0/km) → 정리운동 5분"
            ),
        };
    }

    if experience.contains("고급") || experience.contains("advanced") {
        let interval_hundreds = rng.gen_range(0..2) + 3;
        let repeats = rng.gen_range(0..3) + 6;
        return RunPlan {
            title: format!("{target_distance} 고급자 인터벌 훈련"),
            date,
            distance: target_distance,
            duration: format!("약 {}분", d * 5 + rng.gen_range(0..10)),
            intensity: "높음".to_string(),
            details: format!(
                "준비운동 10분 → {interval_hundreds}00m 인터벌 x {repeats}회(빠른 페이스) → 정리운동 8분"
            ),
        };
    }

    // Generic branch: frequency-aware, goal-tagged title.
    let goal_suffix = if goal.is_empty() {
        String::new()
    } else {
        format!(" ({goal})")
    };
    let warmup = 5 + rng.gen_range(0..5);
    let pace_min = rng.gen_range(0..2) + 5;
    let pace_ten_sec = rng.gen_range(0..6);
    let cooldown = 5 + rng.gen_range(0..3);
    RunPlan {
        title: format!("{target_distance} {frequency} 러닝 플랜{goal_suffix}"),
        date,
        distance: target_distance.clone(),
        duration: format!("약 {}분", d * 6 + rng.gen_range(0..15)),
        intensity: "중간".to_string(),
        details: format!(
            "준비운동 {warmup}분 → {pace_min}:{pace_ten_sec}0/km 페이스로 {target_distance} 달리기 → 정리운동 {cooldown}분"
        ),
    }
}
