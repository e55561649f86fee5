use crate::client::{ClientError, MeetingApi, MeetingClient, SaveMethod};
use crate::models::meeting::Meeting;
use crate::services::repository::meeting_key;
use crate::services::store::KeyValueStore;
use crate::tests::common::fixtures::{standup, STANDUP_SLOT};
use crate::tests::common::test_utils::{spawn_app, spawn_memory_app};

#[test]
fn test_base_url_trailing_slash_trimmed() {
    let client = MeetingClient::new("http://localhost:3000/");
    assert_eq!(client.base_url(), "http://localhost:3000");
}

#[test]
fn test_base_url_from_lookup() {
    let client = MeetingClient::from_lookup(|name| match name {
        "MEETING_API_BASE_URL" => Some("https://meet.example.com/".to_string()),
        _ => None,
    });
    assert_eq!(client.base_url(), "https://meet.example.com");

    let client = MeetingClient::from_lookup(|_| None);
    assert_eq!(client.base_url(), "http://localhost:3000");

    let client = MeetingClient::from_lookup(|_| Some("  ".to_string()));
    assert_eq!(client.base_url(), "http://localhost:3000");
}

#[test]
fn test_from_env_yields_usable_base_url() {
    let client = MeetingClient::from_env();
    assert!(client.base_url().starts_with("http"));
    assert!(!client.base_url().ends_with('/'));
}

#[tokio::test]
async fn test_fetch_missing_meeting_is_none() {
    let (base_url, _) = spawn_memory_app().await;
    let client = MeetingClient::new(base_url);

    let result = client.fetch_meeting("missing").await;
    assert!(matches!(result, Ok(None)));
}

#[tokio::test]
async fn test_post_then_fetch() {
    let (base_url, store) = spawn_memory_app().await;
    let client = MeetingClient::new(base_url);

    client
        .save_meeting(SaveMethod::Post, "abc", &standup())
        .await
        .unwrap();

    assert!(store.get(&meeting_key("abc")).await.unwrap().is_some());
    assert_eq!(client.fetch_meeting("abc").await.unwrap(), Some(standup()));
}

#[tokio::test]
async fn test_put_replaces_meeting() {
    let (base_url, _) = spawn_memory_app().await;
    let client = MeetingClient::new(base_url);

    client
        .save_meeting(SaveMethod::Post, "abc", &standup())
        .await
        .unwrap();

    let updated = Meeting::new("Standup").with_slot(STANDUP_SLOT, ["Alice", "Bob"]);
    client
        .save_meeting(SaveMethod::Put, "abc", &updated)
        .await
        .unwrap();

    let fetched = client.fetch_meeting("abc").await.unwrap().unwrap();
    assert_eq!(fetched.attendees(STANDUP_SLOT), ["Alice", "Bob"]);
}

#[tokio::test]
async fn test_unconfigured_server_reports_absent() {
    let base_url = spawn_app(None).await;
    let client = MeetingClient::new(base_url);

    // The write is accepted but does not persist
    client
        .save_meeting(SaveMethod::Post, "abc", &standup())
        .await
        .unwrap();
    assert!(matches!(client.fetch_meeting("abc").await, Ok(None)));
}

#[tokio::test]
async fn test_unreachable_server_is_http_error() {
    // Bind then drop to get a port with nothing listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = MeetingClient::new(format!("http://{}", addr));
    let result = client.fetch_meeting("abc").await;
    assert!(matches!(result, Err(ClientError::Http(_))));
}
