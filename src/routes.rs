use axum::{routing::get, Router};
use std::sync::Arc;
use tracing::info;

use crate::handlers::api::{create_meeting, debug_store, get_meeting, update_meeting, AppState};
use crate::handlers::health::health_check;

pub fn create_router(app_state: Arc<AppState>, is_production: bool) -> Router {
    let mut router = Router::new();

    // Health check is always available
    let health_route = Router::new().route("/health", get(health_check));
    router = router.merge(health_route);

    // Meeting API is always available
    let meeting_routes = Router::new().route(
        "/api/meeting/:id",
        get(get_meeting).post(create_meeting).put(update_meeting),
    );
    router = router.merge(meeting_routes);

    // Only expose store inspection outside production
    if !is_production {
        let debug_routes = Router::new().route("/api/debug", get(debug_store));
        router = router.merge(debug_routes);

        info!("Debug routes enabled - server running in development mode");
    } else {
        info!("Running in production mode - debug routes hidden");
    }

    router.with_state(app_state)
}
