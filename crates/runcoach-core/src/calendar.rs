//! Calendar export: turn a plan card into an iCalendar (.ics) document.
//!
//! The plan's `date` field is the localized long form ("2024년 3월 10일 (일)
//! 오전 7:00") and `duration` is free text ("1시간 30분"). Both parsers are
//! lenient: anything unreadable degrades to "now" / 60 minutes rather than
//! failing the export.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use icalendar::{Calendar, Component, Event, EventLike, EventStatus};
use once_cell::sync::Lazy;
use regex::Regex;

const DEFAULT_DURATION_MINUTES: i64 = 60;

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})년").expect("year regex"));
static MONTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2})월").expect("month regex"));
static DAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2})일").expect("day regex"));
static TIME_OF_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(오전|오후)\s*(\d{1,2}):(\d{2})").expect("time regex"));
static HOURS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*시간").expect("hours regex"));
static MINUTES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*분").expect("minutes regex"));

/// Parse the localized long date. 오후 adds 12 to hours below 12; 오전 12
/// wraps to midnight. The clock clause is optional: a date-only string
/// parses to midnight of that day. Falls back to the current local time
/// when the date itself is missing or out of range.
pub fn parse_korean_date(text: &str) -> NaiveDateTime {
    parse_korean_date_or(text, Local::now().naive_local())
}

fn parse_korean_date_or(text: &str, fallback: NaiveDateTime) -> NaiveDateTime {
    let capture_u32 = |re: &Regex| -> Option<u32> { re.captures(text)?[1].parse().ok() };

    let parsed = (|| {
        let year: i32 = YEAR_RE.captures(text)?[1].parse().ok()?;
        let month = capture_u32(&MONTH_RE)?;
        let day = capture_u32(&DAY_RE)?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;

        let (hour, minute) = match TIME_OF_DAY_RE.captures(text) {
            Some(time_caps) => {
                let mut hour: u32 = time_caps[2].parse().ok()?;
                let minute: u32 = time_caps[3].parse().ok()?;
                match &time_caps[1] {
                    "오후" if hour < 12 => hour += 12,
                    "오전" if hour == 12 => hour = 0,
                    _ => {}
                }
                (hour, minute)
            }
            None => (0, 0),
        };
        let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
        Some(date.and_time(time))
    })();

    parsed.unwrap_or(fallback)
}

/// Sum of every "N시간" and "N분" term in the text, defaulting to an hour
/// when neither pattern matches. An explicit "0분" is 0, not the default.
pub fn parse_duration_minutes(text: &str) -> i64 {
    let mut total = 0i64;
    let mut matched = false;
    for caps in HOURS_RE.captures_iter(text) {
        if let Ok(hours) = caps[1].parse::<i64>() {
            total += hours * 60;
            matched = true;
        }
    }
    for caps in MINUTES_RE.captures_iter(text) {
        if let Ok(minutes) = caps[1].parse::<i64>() {
            total += minutes;
            matched = true;
        }
    }
    if matched {
        total
    } else {
        DEFAULT_DURATION_MINUTES
    }
}

/// Serialize a single confirmed run event as an iCalendar document.
pub fn build_ics(title: &str, date: &str, duration: &str, details: &str) -> String {
    let start = parse_korean_date(date);
    let end = start + Duration::minutes(parse_duration_minutes(duration));

    let event = Event::new()
        .summary(title)
        .description(details)
        .starts(start)
        .ends(end)
        .status(EventStatus::Confirmed)
        .add_property("CATEGORIES", "러닝,운동")
        .done();

    let mut calendar = Calendar::new();
    calendar.push(event);
    calendar.to_string()
}
