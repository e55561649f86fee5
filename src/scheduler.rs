//! Client-side scheduler view.
//!
//! Holds the meeting being edited, applies user edits to it and decides when
//! the whole record must be sent back to the server. Every mutator returns
//! the save that the edit triggers (if any); the caller dispatches it, usually
//! with [`SchedulerView::spawn_save`].
//!
//! While a shared meeting is still `Loading` only the user name can be set.
//! Meeting edits are ignored and nothing is saved until [`SchedulerView::load`]
//! has run, so an unloaded view never overwrites the stored record.

use chrono::{DateTime, NaiveDateTime, TimeZone};
use reqwest::Url;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::client::{MeetingApi, SaveMethod};
use crate::models::meeting::Meeting;
use crate::services::time_slots::{group_by_date, slot_key, slot_key_from_utc, DateGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// A shared GUID was supplied and its meeting has not been fetched yet.
    Loading,
    Ready,
}

/// A full-record save, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub method: SaveMethod,
    pub guid: String,
    pub meeting: Meeting,
}

#[derive(Debug, Clone)]
pub struct SchedulerView {
    guid: String,
    shared: bool,
    state: ViewState,
    user_name: String,
    meeting: Meeting,
}

pub fn generate_guid() -> String {
    Uuid::new_v4().to_string()
}

impl SchedulerView {
    /// Open the view. With a shared GUID the view starts in `Loading` and
    /// edits an existing meeting; without one it is immediately `Ready` with
    /// an empty meeting under a fresh GUID.
    pub fn new(shared_guid: Option<String>) -> Self {
        match shared_guid.filter(|guid| !guid.is_empty()) {
            Some(guid) => {
                info!("Opening shared meeting {}", guid);
                Self {
                    guid,
                    shared: true,
                    state: ViewState::Loading,
                    user_name: String::new(),
                    meeting: Meeting::default(),
                }
            }
            None => {
                let guid = generate_guid();
                info!("Starting new meeting {}", guid);
                Self {
                    guid,
                    shared: false,
                    state: ViewState::Ready,
                    user_name: String::new(),
                    meeting: Meeting::default(),
                }
            }
        }
    }

    /// Open the view from a share link; the GUID is the `id` query parameter.
    pub fn from_share_url(url: &str) -> Self {
        Self::new(shared_guid_from_url(url))
    }

    pub fn guid(&self) -> &str {
        &self.guid
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Whether this view edits a meeting opened from a share link.
    pub fn is_shared(&self) -> bool {
        self.shared
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn meeting(&self) -> &Meeting {
        &self.meeting
    }

    pub fn share_url(&self, origin: &str) -> String {
        format!("{}?id={}", origin.trim_end_matches('/'), self.guid)
    }

    /// Fetch the shared meeting. Not-found and transport errors leave the
    /// empty meeting in place; either way the view ends up `Ready`.
    pub async fn load(&mut self, api: &dyn MeetingApi) {
        if self.state != ViewState::Loading {
            return;
        }

        match api.fetch_meeting(&self.guid).await {
            Ok(Some(meeting)) => {
                info!(
                    "Loaded meeting {} with {} time slots",
                    self.guid,
                    meeting.times.len()
                );
                self.meeting = meeting;
            }
            Ok(None) => warn!("Meeting {} not found, starting empty", self.guid),
            Err(e) => error!("Failed to load meeting {}: {}", self.guid, e),
        }

        self.state = ViewState::Ready;
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Option<SaveRequest> {
        let title = title.into();
        if !self.accepts_edits() || self.meeting.title == title {
            return None;
        }
        self.meeting.title = title;
        self.save_request()
    }

    pub fn set_user_name(&mut self, name: impl Into<String>) -> Option<SaveRequest> {
        let name = name.into();
        if self.user_name == name {
            return None;
        }
        self.user_name = name;
        self.save_request()
    }

    /// Flip the current user's availability for a slot. Ignored until the
    /// user has a name.
    pub fn toggle_attendance(&mut self, slot: &str) -> Option<SaveRequest> {
        if !self.accepts_attendance_edits() {
            return None;
        }
        self.meeting.toggle_attendee(slot, &self.user_name);
        self.save_request()
    }

    pub fn is_attending(&self, slot: &str) -> bool {
        self.meeting.is_attending(slot, &self.user_name)
    }

    /// Propose a new slot at a wall-clock time, with the current user as its
    /// only attendee. Ignored until the user has a name.
    pub fn add_slot(&mut self, at: NaiveDateTime) -> Option<SaveRequest> {
        if !self.accepts_attendance_edits() {
            return None;
        }
        let key = slot_key(at);
        debug!("Adding slot {}", key);
        self.meeting.set_slot(key, &self.user_name);
        self.save_request()
    }

    /// Like [`add_slot`](Self::add_slot) for a zoned time, keyed in UTC.
    pub fn add_slot_at<Tz: TimeZone>(&mut self, at: &DateTime<Tz>) -> Option<SaveRequest> {
        if !self.accepts_attendance_edits() {
            return None;
        }
        let key = slot_key_from_utc(at);
        debug!("Adding slot {}", key);
        self.meeting.set_slot(key, &self.user_name);
        self.save_request()
    }

    pub fn remove_slot(&mut self, slot: &str) -> Option<SaveRequest> {
        if !self.accepts_edits() {
            return None;
        }
        if !self.meeting.remove_slot(slot) {
            debug!("Slot {} not present, nothing to remove", slot);
            return None;
        }
        self.save_request()
    }

    pub fn grouped_slots(&self) -> Vec<DateGroup> {
        group_by_date(&self.meeting.times)
    }

    fn accepts_edits(&self) -> bool {
        if self.state == ViewState::Loading {
            debug!("Meeting {} is still loading, ignoring edit", self.guid);
            return false;
        }
        true
    }

    // Slot edits record the user as an attendee, so they need a name
    fn accepts_attendance_edits(&self) -> bool {
        if self.user_name.is_empty() {
            debug!("No user name yet, ignoring attendance edit");
            return false;
        }
        self.accepts_edits()
    }

    /// The save for the current state, or `None` while the shared meeting is
    /// still loading or the user has not entered a name yet.
    pub fn save_request(&self) -> Option<SaveRequest> {
        if self.state == ViewState::Loading || self.user_name.is_empty() {
            return None;
        }

        Some(SaveRequest {
            method: if self.shared {
                SaveMethod::Put
            } else {
                SaveMethod::Post
            },
            guid: self.guid.clone(),
            meeting: self.meeting.clone(),
        })
    }

    /// Send one save. Failures are logged and dropped; there is no retry.
    pub async fn save(api: &dyn MeetingApi, request: SaveRequest) {
        match api
            .save_meeting(request.method, &request.guid, &request.meeting)
            .await
        {
            Ok(()) => debug!("Saved meeting {} via {:?}", request.guid, request.method),
            Err(e) => error!("Failed to save meeting {}: {}", request.guid, e),
        }
    }

    /// Fire-and-forget save on the tokio runtime. Overlapping saves are not
    /// coordinated: whichever lands last on the server wins.
    pub fn spawn_save(api: Arc<dyn MeetingApi>, request: SaveRequest) -> JoinHandle<()> {
        tokio::spawn(async move { Self::save(api.as_ref(), request).await })
    }
}

fn shared_guid_from_url(url: &str) -> Option<String> {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Ignoring unparseable share URL '{}': {}", url, e);
            return None;
        }
    };

    parsed
        .query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
        .filter(|guid| !guid.is_empty())
}
