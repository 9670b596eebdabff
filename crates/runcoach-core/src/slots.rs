//! Slot extraction: turn an unstructured conversation history into a
//! structured slot set (experience level, target distance, frequency,
//! date/time, intensity, pace/time goal, motivational goal, restart intent).
//!
//! The extractor is a pure function of the history: it rebuilds the full slot
//! set on every call, scanning user turns oldest to newest and trying every
//! matcher against every turn. The first turn that matches a slot wins; later
//! turns never overwrite it, even when they correct an earlier value.
//! Vocabulary is Korean-first with the English synonyms users actually type.

use crate::history::{ConversationTurn, Role};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Closed enumeration of the recognized conversational slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    ExperienceLevel,
    TargetDistance,
    WeeklyFrequency,
    TargetTime,
    TargetPace,
    DateTime,
    Intensity,
    MotivationalGoal,
    RestartRequested,
}

impl Slot {
    pub const ALL: [Slot; 9] = [
        Slot::ExperienceLevel,
        Slot::TargetDistance,
        Slot::WeeklyFrequency,
        Slot::TargetTime,
        Slot::TargetPace,
        Slot::DateTime,
        Slot::Intensity,
        Slot::MotivationalGoal,
        Slot::RestartRequested,
    ];

    /// Korean display label, used verbatim in the outbound LLM prompt block.
    pub fn label(&self) -> &'static str {
        match self {
            Slot::ExperienceLevel => "경험 수준",
            Slot::TargetDistance => "목표 거리",
            Slot::WeeklyFrequency => "주간 빈도",
            Slot::TargetTime => "목표 시간",
            Slot::TargetPace => "목표 페이스",
            Slot::DateTime => "날짜 시간",
            Slot::Intensity => "강도",
            Slot::MotivationalGoal => "목표",
            Slot::RestartRequested => "새 계획 요청",
        }
    }
}

/// Slot-to-value mapping for one conversation. At most one value per slot;
/// insertion is first-wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSet(BTreeMap<Slot, String>);

impl SlotSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, slot: Slot) -> Option<&str> {
        self.0.get(&slot).map(String::as_str)
    }

    pub fn contains(&self, slot: Slot) -> bool {
        self.0.contains_key(&slot)
    }

    /// First-occurrence-wins insert: a no-op when the slot already holds a value.
    pub fn set_if_empty(&mut self, slot: Slot, value: impl Into<String>) {
        self.0.entry(slot).or_insert_with(|| value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Renders the `label: value` block appended to the LLM prompt.
    pub fn prompt_block(&self) -> String {
        let mut out = String::new();
        for (slot, value) in self.iter() {
            out.push_str(slot.label());
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Matcher battery. Input is lower-cased before matching, so the patterns
// only carry lowercase English tokens.
// ---------------------------------------------------------------------------

static EXPERIENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new("(초보자|초보|입문자|beginner|중급자|중급|intermediate|고급자|고급|advanced)")
        .expect("experience regex")
});

static DISTANCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(km|킬로미터|kilometer|k|킬로)").expect("distance regex"));

static FREQUENCY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(주|week)\s*(\d+)\s*(회|번|times|time)").expect("frequency regex"));

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(분|시간|hours?|minutes?|mins?)").expect("time regex"));

static PACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(페이스|pace|킬로[당미]|km[당미])\s*(\d+)\s*(분|초|초?)").expect("pace regex")
});

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        "(오늘|내일|모레|다음주|weekend|주말|월요일|화요일|수요일|목요일|금요일|토요일|일요일|아침|점심|저녁|오전|오후|새벽)",
    )
    .expect("date regex")
});

static INTENSITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new("(가볍|낮|쉽|편안|중간|보통|높|강한?|hard|moderate|easy|light|intense)").expect("intensity regex")
});

static GOAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(체중\s*감량|다이어트|대회|마라톤|체력|건강|health|weight|diet|race|competition|marathon)")
        .expect("goal regex")
});

/// Substring cues for "throw the current plan away" intent. Containment test,
/// not a regex: any one of these anywhere in the message flips the flag.
const RESTART_TOKENS: [&str; 9] = [
    "새로운", "새 계획", "다시", "바꿔", "변경", "삭제", "지워", "없애", "취소",
];

/// Canonical intensity labels.
pub const INTENSITY_LIGHT: &str = "가벼움";
pub const INTENSITY_MEDIUM: &str = "중간";
pub const INTENSITY_HIGH: &str = "높음";

const LIGHT_CUES: [&str; 6] = ["가볍", "낮", "쉽", "편안", "easy", "light"];
const MEDIUM_CUES: [&str; 3] = ["중간", "보통", "moderate"];

/// Buckets a matched intensity adjective. Light cues checked first, then
/// medium; everything else classifies as high — a deliberate bias, not a
/// symmetric classifier.
fn bucket_intensity(matched: &str) -> &'static str {
    if LIGHT_CUES.iter().any(|cue| matched.contains(cue)) {
        INTENSITY_LIGHT
    } else if MEDIUM_CUES.iter().any(|cue| matched.contains(cue)) {
        INTENSITY_MEDIUM
    } else {
        INTENSITY_HIGH
    }
}

/// Scan the history (oldest → newest, user turns only) and produce the slot
/// set. Every matcher runs against every user turn — one message may fill
/// several slots at once ("5km 초보자 내일").
pub fn extract(history: &[ConversationTurn]) -> SlotSet {
    let mut slots = SlotSet::new();

    for turn in history {
        if turn.role != Role::User {
            continue;
        }
        let text = turn.text.to_lowercase();

        if let Some(m) = EXPERIENCE_RE.find(&text) {
            slots.set_if_empty(Slot::ExperienceLevel, m.as_str());
        }

        if let Some(caps) = DISTANCE_RE.captures(&text) {
            slots.set_if_empty(Slot::TargetDistance, format!("{}km", &caps[1]));
        }

        if let Some(caps) = FREQUENCY_RE.captures(&text) {
            slots.set_if_empty(Slot::WeeklyFrequency, format!("주 {}회", &caps[2]));
        }

        if let Some(caps) = TIME_RE.captures(&text) {
            let unit = if caps[2].contains('시') || caps[2].contains("hour") {
                "시간"
            } else {
                "분"
            };
            slots.set_if_empty(Slot::TargetTime, format!("{}{}", &caps[1], unit));
        }

        if let Some(caps) = PACE_RE.captures(&text) {
            slots.set_if_empty(Slot::TargetPace, format!("킬로당 {}분", &caps[2]));
        }

        if let Some(m) = DATE_RE.find(&text) {
            slots.set_if_empty(Slot::DateTime, m.as_str());
        }

        if let Some(m) = INTENSITY_RE.find(&text) {
            slots.set_if_empty(Slot::Intensity, bucket_intensity(m.as_str()));
        }

        if let Some(m) = GOAL_RE.find(&text) {
            slots.set_if_empty(Slot::MotivationalGoal, m.as_str());
        }

        if RESTART_TOKENS.iter().any(|token| text.contains(token)) {
            slots.set_if_empty(Slot::RestartRequested, "true");
        }
    }

    slots
}
