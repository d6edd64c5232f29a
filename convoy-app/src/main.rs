//! Convoy sample service
//!
//! The minimal web service the pipeline builds and deploys. Serves a
//! greeting on "/" and the load balancer health check on "/_health", and
//! shuts down gracefully on SIGINT, SIGTERM, or SIGHUP so in-flight
//! requests finish within the deregistration window.

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn create_router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/_health", get(health))
        .layer(TraceLayer::new_for_http())
}

async fn root() -> &'static str {
    "Hello World"
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// Resolves when a termination signal arrives
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
    let mut sighup = signal(SignalKind::hangup()).expect("Failed to install SIGHUP handler");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigterm.recv() => {},
        _ = sighup.recv() => {},
    }

    tracing::info!("Termination signal received, draining connections");
}

/// Resolves when a termination signal arrives
#[cfg(not(unix))]
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl-C handler");

    tracing::info!("Termination signal received, draining connections");
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "convoy_app=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = create_router();

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}
