use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use axum::{error_handling::HandleErrorLayer, http::StatusCode};
use tower::{BoxError, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use group_scheduler_service::{create_router, AppConfig, AppState, MeetingRepository};

// Error handler
async fn handle_error(error: BoxError) -> (StatusCode, String) {
    if error.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            "Request took too long".to_string(),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled internal error: {}", error),
        )
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received interrupt signal, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    #[cfg(feature = "sentry-monitoring")]
    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        info!("Sentry error tracking enabled");
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let config = AppConfig::from_env();

    // Open the configured store; a broken store file is fatal at startup
    let store = match config.store.open() {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open store {:?}: {}", config.store, e);
            return ExitCode::FAILURE;
        }
    };

    let repository = MeetingRepository::new(store, config.track_access);
    let app_state = Arc::new(AppState::new(repository));
    info!("Meeting repository initialized");

    if config.is_production {
        info!("Running in PRODUCTION mode - restricting available endpoints");
    } else {
        info!("Running in DEVELOPMENT mode - all endpoints will be available");
    }

    // Create router with appropriate routes based on environment
    let app = create_router(app_state, config.is_production).layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_error))
            .load_shed()
            .concurrency_limit(64)
            .timeout(Duration::from_secs(10))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::new().allow_origin(Any)),
    );

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", config.bind_addr, e);
            return ExitCode::FAILURE;
        }
    };
    info!("Server listening on {}", config.bind_addr);

    // Start server with graceful shutdown
    info!("Server is ready to accept connections");
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server has been gracefully shut down");
    ExitCode::SUCCESS
}
