use axum::{
    extract::{rejection::JsonRejection, Json as ExtractJson, Path, State},
    response::Json,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::handlers::error::ApiError;
use crate::models::meeting::{DebugResponse, Meeting};
use crate::services::repository::MeetingRepository;

// AppState struct containing shared resources
pub struct AppState {
    pub repository: Arc<MeetingRepository>,
}

impl AppState {
    pub fn new(repository: MeetingRepository) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }
}

fn parse_body(
    payload: Result<ExtractJson<Meeting>, JsonRejection>,
) -> Result<Meeting, ApiError> {
    payload
        .map(|ExtractJson(meeting)| meeting)
        .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))
}

// Get meeting endpoint
pub async fn get_meeting(
    State(state): State<Arc<AppState>>,
    Path(guid): Path<String>,
) -> Result<Json<Meeting>, ApiError> {
    info!("Received request to get meeting: {}", guid);

    match state.repository.get(&guid).await {
        Some(meeting) => {
            info!(
                "Returning meeting {} with {} time slots",
                guid,
                meeting.times.len()
            );
            Ok(Json(meeting))
        }
        None => {
            info!("Meeting {} not found", guid);
            Err(ApiError::NotFound)
        }
    }
}

// Create meeting endpoint
pub async fn create_meeting(
    State(state): State<Arc<AppState>>,
    Path(guid): Path<String>,
    payload: Result<ExtractJson<Meeting>, JsonRejection>,
) -> Result<Json<Meeting>, ApiError> {
    let meeting = parse_body(payload)?;
    info!("Received request to create meeting {}: {}", guid, meeting.title);

    state.repository.create(&guid, &meeting).await.map_err(|err| {
        error!("Failed to create meeting {}: {}", guid, err);
        ApiError::from(err)
    })?;

    Ok(Json(meeting))
}

// Update meeting endpoint
pub async fn update_meeting(
    State(state): State<Arc<AppState>>,
    Path(guid): Path<String>,
    payload: Result<ExtractJson<Meeting>, JsonRejection>,
) -> Result<Json<Meeting>, ApiError> {
    let meeting = parse_body(payload)?;
    info!("Received request to update meeting {}: {}", guid, meeting.title);

    state.repository.update(&guid, &meeting).await.map_err(|err| {
        error!("Failed to update meeting {}: {}", guid, err);
        ApiError::from(err)
    })?;

    Ok(Json(meeting))
}

// Store inspection endpoint, development mode only
pub async fn debug_store(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DebugResponse>, ApiError> {
    let meetings = state.repository.snapshot().await?;
    info!("Debug listing of {} stored meetings", meetings.len());

    Ok(Json(DebugResponse {
        configured: state.repository.is_configured(),
        backend: state.repository.backend().to_string(),
        keys: meetings.iter().map(|row| row.key.clone()).collect(),
        meetings,
    }))
}
