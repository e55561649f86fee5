use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::models::meeting::SlotTimes;

/// chrono format for slot keys: `YYYY-MM-DD-HH:mm`
pub const SLOT_KEY_FORMAT: &str = "%Y-%m-%d-%H:%M";

// A single slot as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    pub slot_key: String,
    pub attendees: Vec<String>,
}

// All slots sharing one date, in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateGroup {
    pub date: String,
    pub slots: Vec<TimeSlot>,
}

/// Build the slot key for a wall-clock date and time.
pub fn slot_key(at: NaiveDateTime) -> String {
    at.format(SLOT_KEY_FORMAT).to_string()
}

/// Build the slot key for a zoned datetime, normalised to UTC first.
pub fn slot_key_from_utc<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    slot_key(at.with_timezone(&Utc).naive_utc())
}

/// Parse a slot key back into a datetime. Returns `None` for keys that are
/// not in `YYYY-MM-DD-HH:mm` form.
pub fn parse_slot_key(key: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(key, SLOT_KEY_FORMAT).ok()
}

/// The `YYYY-MM-DD` part of a slot key (its first three dash components).
pub fn date_part(key: &str) -> &str {
    match key.match_indices('-').nth(2) {
        Some((idx, _)) => &key[..idx],
        None => key,
    }
}

/// The `HH:mm` part of a slot key (its fourth dash component).
pub fn time_part(key: &str) -> &str {
    key.split('-').nth(3).unwrap_or("")
}

/// Partition slots by date. Dates come out ascending, and slots within a date
/// are ordered by their full key.
pub fn group_by_date(times: &SlotTimes) -> Vec<DateGroup> {
    let mut groups: Vec<DateGroup> = Vec::new();

    for (slot_key, attendees) in times {
        let date = date_part(slot_key);
        let slot = TimeSlot {
            slot_key: slot_key.clone(),
            attendees: attendees.clone(),
        };

        match groups.iter_mut().find(|group| group.date == date) {
            Some(group) => group.slots.push(slot),
            None => groups.push(DateGroup {
                date: date.to_string(),
                slots: vec![slot],
            }),
        }
    }

    groups.sort_by(|a, b| a.date.cmp(&b.date));
    for group in &mut groups {
        group.slots.sort_by(|a, b| a.slot_key.cmp(&b.slot_key));
    }

    debug!("Grouped {} slots into {} dates", times.len(), groups.len());
    groups
}

/// Long date label, e.g. `2024-12-10` -> `Tuesday, December 10, 2024`.
/// Falls back to the raw string when it does not parse.
pub fn format_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%A, %B %-d, %Y").to_string(),
        Err(e) => {
            warn!("Unparseable slot date '{}': {}", date, e);
            date.to_string()
        }
    }
}

/// 12-hour time label, e.g. `14:00` -> `2:00 PM`.
/// Falls back to the raw string when it does not parse.
pub fn format_time(time: &str) -> String {
    match NaiveTime::parse_from_str(time, "%H:%M") {
        Ok(parsed) => parsed.format("%-I:%M %p").to_string(),
        Err(e) => {
            warn!("Unparseable slot time '{}': {}", time, e);
            time.to_string()
        }
    }
}
