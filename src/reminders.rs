//! Reminder scheduling
//!
//! Filters and orders daily reminders against the current wall-clock time.
//! A reminder is upcoming when its time-of-day is still ahead of `now`
//! today; time-until wraps to tomorrow so it is never negative.

use chrono::{Duration, NaiveDateTime, NaiveTime};

use crate::models::Reminder;

/// Parse a reminder's "HH:MM" clock time
pub fn parse_clock_time(time: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(time.trim(), "%H:%M").ok()
}

/// The reminder's occurrence today, if its time parses
fn occurrence_today(reminder: &Reminder, now: NaiveDateTime) -> Option<NaiveDateTime> {
    Some(now.date().and_time(parse_clock_time(&reminder.time)?))
}

/// The reminder's next occurrence: today at its clock time, or tomorrow if
/// that instant has already passed (a time equal to `now` wraps too)
pub fn next_occurrence(reminder: &Reminder, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let today = occurrence_today(reminder, now)?;
    if today > now {
        Some(today)
    } else {
        Some(today + Duration::days(1))
    }
}

/// Reminders still ahead of `now` today, ascending by occurrence time.
///
/// Ties keep their original input order (stable sort). Reminders with
/// malformed times are dropped.
pub fn upcoming(reminders: &[Reminder], now: NaiveDateTime) -> Vec<Reminder> {
    let mut ahead: Vec<(NaiveDateTime, Reminder)> = reminders
        .iter()
        .filter_map(|r| {
            let at = occurrence_today(r, now)?;
            (at > now).then(|| (at, r.clone()))
        })
        .collect();

    ahead.sort_by_key(|(at, _)| *at);
    ahead.into_iter().map(|(_, r)| r).collect()
}

/// Time from `now` until the reminder's next occurrence; non-negative by
/// construction
pub fn time_until(reminder: &Reminder, now: NaiveDateTime) -> Option<Duration> {
    Some(next_occurrence(reminder, now)? - now)
}

/// Render a duration the way the dashboard shows it: "In 40 minutes",
/// "In 2h 15m"
pub fn format_time_until(until: Duration) -> String {
    let hours = until.num_hours();
    let minutes = until.num_minutes() % 60;
    if hours == 0 {
        format!("In {} minutes", minutes)
    } else {
        format!("In {}h {}m", hours, minutes)
    }
}
