mod configuration;
mod errors;
mod features;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::{StatusCode, Uri};
use axum::routing::get;
use axum::{Json, Router};
use sites::SiteService;
use tokio::signal;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use crate::configuration::{
    get_configuration, Configuration, ServerSettings, DEFAULT_CONFIG_FILE,
};
use crate::errors::StatusBody;

// The state passed to the router is shared by every request it receives.
// Request scoped data belongs in extensions instead.
#[derive(Clone)]
pub struct AppState {
    pub sites: Arc<SiteService>,
}

pub fn app(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(features::sites::get_routes())
        .fallback(not_found)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(configuration: Configuration) -> Result<()> {
    let service = configuration
        .sites
        .build_service()
        .context("unable to set up site service")?;
    let state = AppState {
        sites: Arc::new(service),
    };
    let app = app(
        state,
        Duration::from_secs(configuration.server.request_timeout_secs),
    );

    let addr: SocketAddr = configuration
        .server
        .bind
        .parse()
        .context("invalid bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn health() -> Json<StatusBody> {
    Json(StatusBody {
        status: "ok",
        message: "healthy".to_string(),
    })
}

async fn not_found(uri: Uri) -> (StatusCode, Json<StatusBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(StatusBody::error(format!("No route for {uri}"))),
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutting down");
}
