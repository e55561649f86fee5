use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::models::meeting::{Meeting, StoredMeeting};
use crate::services::store::{KeyValueStore, StoreError};

pub const MEETING_PREFIX: &str = "meeting:";
pub const ACCESS_PREFIX: &str = "access:";

pub fn meeting_key(guid: &str) -> String {
    format!("{}{}", MEETING_PREFIX, guid)
}

pub fn access_key(guid: &str) -> String {
    format!("{}{}", ACCESS_PREFIX, guid)
}

/// Persistence access for meetings, keyed by GUID.
///
/// Reads never fail: a missing record, an unconfigured store and a store
/// error all come back as `None`. Writes propagate store errors.
pub struct MeetingRepository {
    store: Option<Arc<dyn KeyValueStore>>,
    track_access: bool,
}

impl MeetingRepository {
    pub fn new(store: Option<Arc<dyn KeyValueStore>>, track_access: bool) -> Self {
        match &store {
            Some(store) => info!(
                "Meeting repository using {} store (access tracking: {})",
                store.backend(),
                track_access
            ),
            None => warn!("No store configured, meetings will not persist"),
        }

        Self {
            store,
            track_access,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    pub fn backend(&self) -> &'static str {
        self.store.as_ref().map_or("none", |store| store.backend())
    }

    pub async fn get(&self, guid: &str) -> Option<Meeting> {
        let Some(store) = &self.store else {
            warn!("Store is not configured, no meeting {} to return", guid);
            return None;
        };

        debug!("Fetching meeting {}", guid);
        let raw = match store.get(&meeting_key(guid)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("Meeting {} not found", guid);
                return None;
            }
            Err(e) => {
                error!("Error getting meeting {}: {}", guid, e);
                return None;
            }
        };

        match serde_json::from_str::<Meeting>(&raw) {
            Ok(meeting) => {
                self.touch(store.as_ref(), guid).await;
                Some(meeting)
            }
            Err(e) => {
                error!("Stored meeting {} is not valid JSON: {}", guid, e);
                None
            }
        }
    }

    pub async fn create(&self, guid: &str, meeting: &Meeting) -> Result<(), StoreError> {
        info!("Creating meeting {}", guid);
        self.write(guid, meeting).await
    }

    // Same overwrite as create; only the HTTP verb differs
    pub async fn update(&self, guid: &str, meeting: &Meeting) -> Result<(), StoreError> {
        info!("Updating meeting {}", guid);
        self.write(guid, meeting).await
    }

    /// Last access time recorded for a meeting, if tracking is on and the
    /// record exists.
    pub async fn last_access(&self, guid: &str) -> Option<DateTime<Utc>> {
        let store = self.store.as_ref()?;
        let raw = store.get(&access_key(guid)).await.ok()??;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .ok()
    }

    /// Every stored meeting key with its decoded value. Values that fail to
    /// load or decode are reported as `None`.
    pub async fn snapshot(&self) -> Result<Vec<StoredMeeting>, StoreError> {
        let Some(store) = &self.store else {
            return Ok(Vec::new());
        };

        let keys = store.keys(MEETING_PREFIX).await?;
        let reads = keys.iter().map(|key| store.get(key));
        let values = futures::future::join_all(reads).await;

        Ok(keys
            .into_iter()
            .zip(values)
            .map(|(key, value)| {
                let value = match value {
                    Ok(Some(raw)) => serde_json::from_str(&raw).ok(),
                    Ok(None) => None,
                    Err(e) => {
                        warn!("Failed to read {}: {}", key, e);
                        None
                    }
                };
                StoredMeeting { key, value }
            })
            .collect())
    }

    async fn write(&self, guid: &str, meeting: &Meeting) -> Result<(), StoreError> {
        let Some(store) = &self.store else {
            warn!("Store is not configured, meeting {} will not persist", guid);
            return Ok(());
        };

        let json = serde_json::to_string(meeting)?;
        debug!("Writing meeting {}: {}", guid, json);

        store.set(&meeting_key(guid), &json).await.map_err(|e| {
            error!("Error writing meeting {}: {}", guid, e);
            e
        })?;

        self.touch(store.as_ref(), guid).await;
        Ok(())
    }

    // Best effort: an access record failure never fails the caller
    async fn touch(&self, store: &dyn KeyValueStore, guid: &str) {
        if !self.track_access {
            return;
        }

        let now = Utc::now().to_rfc3339();
        if let Err(e) = store.set(&access_key(guid), &now).await {
            warn!("Failed to record access time for {}: {}", guid, e);
        }
    }
}
