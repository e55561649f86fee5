use chrono::NaiveDate;
use std::sync::Arc;

use crate::client::{MeetingApi, MeetingClient};
use crate::scheduler::{SchedulerView, ViewState};
use crate::services::repository::access_key;
use crate::services::store::KeyValueStore;
use crate::tests::common::test_utils::spawn_memory_app;

/// Organiser creates a meeting, a participant opens the share link and marks
/// availability, and the organiser reloads to see it.
#[tokio::test]
async fn test_create_share_and_respond() {
    let (base_url, store) = spawn_memory_app().await;
    let api: Arc<dyn MeetingApi> = Arc::new(MeetingClient::new(base_url.clone()));

    // Organiser: new meeting, POSTed on each change once the name is known
    let mut organiser = SchedulerView::new(None);
    assert!(organiser.set_title("Team lunch").is_none());

    let request = organiser.set_user_name("Alice").expect("save after name");
    SchedulerView::spawn_save(api.clone(), request).await.unwrap();

    let day = NaiveDate::from_ymd_opt(2024, 12, 10).unwrap();
    for hour in [15, 9] {
        let at = day.and_hms_opt(hour, 0, 0).unwrap();
        let request = organiser.add_slot(at).expect("save");
        SchedulerView::save(api.as_ref(), request).await;
    }

    let share_url = organiser.share_url(&base_url);

    // Participant: opens the link, loads, toggles one slot, PUTs
    let mut participant = SchedulerView::from_share_url(&share_url);
    assert_eq!(participant.state(), ViewState::Loading);
    participant.load(api.as_ref()).await;
    assert_eq!(participant.state(), ViewState::Ready);
    assert_eq!(participant.meeting().title, "Team lunch");

    participant.set_user_name("Bob");
    let request = participant
        .toggle_attendance("2024-12-10-09:00")
        .expect("save");
    SchedulerView::save(api.as_ref(), request).await;

    // Organiser reloads through a fresh view of the same link
    let mut reloaded = SchedulerView::from_share_url(&share_url);
    reloaded.load(api.as_ref()).await;

    let groups = reloaded.grouped_slots();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].date, "2024-12-10");
    assert_eq!(groups[0].slots[0].slot_key, "2024-12-10-09:00");
    assert_eq!(groups[0].slots[0].attendees, vec!["Alice", "Bob"]);
    assert_eq!(groups[0].slots[1].slot_key, "2024-12-10-15:00");
    assert_eq!(groups[0].slots[1].attendees, vec!["Alice"]);

    // Reads and writes both refreshed the access record
    assert!(store
        .get(&access_key(organiser.guid()))
        .await
        .unwrap()
        .is_some());
}

/// Opening a link to a meeting that was never saved leaves an empty view
/// whose first save creates the record with PUT.
#[tokio::test]
async fn test_dangling_share_link() {
    let (base_url, _) = spawn_memory_app().await;
    let api = MeetingClient::new(base_url.clone());

    let mut view = SchedulerView::from_share_url(&format!("{}?id=ghost", base_url));
    view.load(&api).await;
    assert_eq!(view.state(), ViewState::Ready);
    assert!(view.meeting().times.is_empty());

    view.set_user_name("Carol");
    let request = view.set_title("Rescued").expect("save");
    SchedulerView::save(&api, request).await;

    let fetched = api.fetch_meeting("ghost").await.unwrap().unwrap();
    assert_eq!(fetched.title, "Rescued");
}

/// A participant who types their name before the shared meeting has loaded
/// must not overwrite it with an empty record.
#[tokio::test]
async fn test_name_entered_before_load_keeps_meeting() {
    let (base_url, _) = spawn_memory_app().await;
    let api = MeetingClient::new(base_url.clone());

    let mut organiser = SchedulerView::new(None);
    organiser.set_user_name("Alice");
    organiser.set_title("Team lunch");
    let at = NaiveDate::from_ymd_opt(2024, 12, 10)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let request = organiser.add_slot(at).expect("save");
    SchedulerView::save(&api, request).await;

    let mut participant = SchedulerView::from_share_url(&organiser.share_url(&base_url));
    assert!(participant.set_user_name("Bob").is_none());

    let stored = api.fetch_meeting(organiser.guid()).await.unwrap().unwrap();
    assert_eq!(stored.title, "Team lunch");

    participant.load(&api).await;
    let request = participant
        .toggle_attendance("2024-12-10-12:00")
        .expect("save");
    SchedulerView::save(&api, request).await;

    let stored = api.fetch_meeting(organiser.guid()).await.unwrap().unwrap();
    assert_eq!(stored.title, "Team lunch");
    assert_eq!(stored.attendees("2024-12-10-12:00"), ["Alice", "Bob"]);
}
