// src/server/mod.rs
//! HTTP request listener
//!
//! Three routes on a loopback socket:
//! - `GET /open` class lookup
//! - `GET /openResource` resource lookup
//! - `GET /health` readiness report

pub mod handlers;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::DaemonConfig;
use crate::locator::ReferenceLocator;
use crate::resolver::Selector;
use crate::window::{Arbiter, UriOpener};

pub use handlers::{handle_navigation, AppError};

/// Everything a request handler needs, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DaemonConfig>,
    pub locator: Arc<ReferenceLocator>,
    pub selector: Arc<dyn Selector>,
    /// `None` when arbitration is disabled
    pub arbiter: Option<Arc<Arbiter>>,
    pub opener: Arc<dyn UriOpener>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/open", get(handlers::open_handler))
        .route("/openResource", get(handlers::open_resource_handler))
        .route("/health", get(handlers::health_handler))
        .with_state(state)
}

/// Serve until the process is stopped.
pub async fn run(state: AppState) -> Result<()> {
    let bind = state.config.server.bind.clone();
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    serve(listener, state).await
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let addr = listener.local_addr()?;
    if !addr.ip().is_loopback() {
        warn!("Listening on non-loopback address {}; remote callers will be rejected", addr);
    }
    info!("Waypoint listening on http://{}", addr);

    let app = router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
