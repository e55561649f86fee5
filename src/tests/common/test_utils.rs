use std::sync::Arc;
use tokio::net::TcpListener;

use crate::handlers::api::AppState;
use crate::routes::create_router;
use crate::services::repository::MeetingRepository;
use crate::services::store::{KeyValueStore, MemoryStore};

/// Serve the full router on an ephemeral local port and return its base URL.
///
/// The server task lives as long as the test runtime.
pub async fn spawn_app(store: Option<Arc<dyn KeyValueStore>>) -> String {
    let repository = MeetingRepository::new(store, true);
    let app = create_router(Arc::new(AppState::new(repository)), false);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("Test server failed");
    });

    format!("http://{}", addr)
}

/// Local server backed by a fresh memory store, plus a handle to that store
pub async fn spawn_memory_app() -> (String, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let shared: Arc<dyn KeyValueStore> = store.clone();
    (spawn_app(Some(shared)).await, store)
}
