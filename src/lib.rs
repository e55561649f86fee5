//! Group Scheduler Service
//!
//! A meeting is a title plus a set of candidate time slots, each with the
//! names of the people who can attend. Meetings are stored under a
//! client-generated GUID and shared as a link carrying that GUID.
//!
//! # Modules
//!
//! - `services`: key-value store backends, the meeting repository and slot
//!   key helpers
//! - `handlers` / `routes`: the axum HTTP API (`/api/meeting/{id}`)
//! - `client`: reqwest client for that API
//! - `scheduler`: the client-side view that edits a meeting and saves it
//!
//! # Storage
//!
//! Meetings live at `meeting:{guid}` as JSON. Every successful read or write
//! may also refresh `access:{guid}` with a timestamp for external cleanup.

pub mod client;
pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod scheduler;
pub mod services;


// Re-export the main API types for ease of use
pub use client::{MeetingApi, MeetingClient, SaveMethod};
pub use config::{AppConfig, StoreBackend};
pub use handlers::api::AppState;
pub use models::meeting::Meeting;
pub use routes::create_router;
pub use scheduler::{SaveRequest, SchedulerView, ViewState};
pub use services::repository::MeetingRepository;
