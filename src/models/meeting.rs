use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attendee names per slot key (`YYYY-MM-DD-HH:mm`).
///
/// A `BTreeMap` keeps the keys in lexicographic order, which for this key
/// format is also chronological order.
pub type SlotTimes = BTreeMap<String, Vec<String>>;

/// The persisted meeting record.
///
/// Identity is not part of the record: it is the GUID used as the store key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub title: String,
    pub times: SlotTimes,
}

impl Meeting {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            times: SlotTimes::new(),
        }
    }

    /// Builder-style helper, mostly for fixtures.
    pub fn with_slot<I, S>(mut self, slot_key: impl Into<String>, attendees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.times.insert(
            slot_key.into(),
            attendees.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Attendees for a slot, empty if the slot is unknown.
    pub fn attendees(&self, slot_key: &str) -> &[String] {
        self.times.get(slot_key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_attending(&self, slot_key: &str, name: &str) -> bool {
        self.attendees(slot_key).iter().any(|attendee| attendee == name)
    }

    /// Remove `name` from the slot if present, otherwise append it.
    /// Toggling an unknown slot creates it.
    pub fn toggle_attendee(&mut self, slot_key: &str, name: &str) {
        let attendees = self.times.entry(slot_key.to_string()).or_default();
        match attendees.iter().position(|attendee| attendee == name) {
            Some(idx) => {
                attendees.remove(idx);
            }
            None => attendees.push(name.to_string()),
        }
    }

    /// Set the slot to exactly `[creator]`, replacing any existing entry.
    pub fn set_slot(&mut self, slot_key: impl Into<String>, creator: &str) {
        self.times.insert(slot_key.into(), vec![creator.to_string()]);
    }

    /// Drop a slot and all of its attendees. Returns whether it existed.
    pub fn remove_slot(&mut self, slot_key: &str) -> bool {
        self.times.remove(slot_key).is_some()
    }
}

// Error body returned by the API: `{error}` or `{error, details}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// One row of the debug listing
#[derive(Debug, Clone, Serialize)]
pub struct StoredMeeting {
    pub key: String,
    pub value: Option<Meeting>,
}

// Response structure for the debug endpoint
#[derive(Debug, Serialize)]
pub struct DebugResponse {
    pub configured: bool,
    pub backend: String,
    pub keys: Vec<String>,
    pub meetings: Vec<StoredMeeting>,
}
