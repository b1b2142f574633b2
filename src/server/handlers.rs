use axum::extract::{ConnectInfo, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use tracing::{debug, info, warn};

use super::AppState;
use crate::error::NavigationError;
use crate::health::{HealthChecker, HealthReport};
use crate::navigation::{NavigationReference, NavigationRequest, NavigationTarget, RequestKind};
use crate::resolver::{resolve, Outcome};
use crate::workspace::ProjectWorkspace;

/// Error response: status plus a plain-text message.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    fn forbidden() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: "Access denied".to_string(),
        }
    }

    fn internal(err: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<NavigationError> for AppError {
    fn from(err: NavigationError) -> Self {
        Self {
            status: StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

pub(crate) async fn open_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    navigate(state, peer, RequestKind::Class, params).await
}

pub(crate) async fn open_resource_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    navigate(state, peer, RequestKind::Resource, params).await
}

pub(crate) async fn health_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> Result<Json<HealthReport>, AppError> {
    ensure_loopback(peer)?;
    let cycles = state
        .arbiter
        .as_ref()
        .map(|arbiter| arbiter.cycles_completed())
        .unwrap_or(0);
    Ok(Json(HealthChecker::report(state.arbiter.is_some(), cycles)))
}

async fn navigate(
    state: AppState,
    peer: SocketAddr,
    kind: RequestKind,
    params: HashMap<String, String>,
) -> Result<Response, AppError> {
    ensure_loopback(peer)?;
    let request = NavigationRequest::from_query(kind, &params)
        .inspect_err(|e| debug!("Rejected request from {}: {}", peer, e))?;

    let reference = handle_navigation(&state, request).await?;
    Ok(close_tab_page(&reference))
}

/// Only the local machine may drive the IDE.
pub fn ensure_loopback(peer: SocketAddr) -> Result<(), AppError> {
    let ip: IpAddr = peer.ip().to_canonical();
    if ip.is_loopback() {
        Ok(())
    } else {
        warn!("Access denied from {}", peer);
        Err(AppError::forbidden())
    }
}

/// Locate, resolve and dispatch one request. Returns as soon as the
/// navigation reference is known; window arbitration continues detached.
pub async fn handle_navigation(
    state: &AppState,
    request: NavigationRequest,
) -> Result<NavigationReference, AppError> {
    let workspace = ProjectWorkspace::resolve(&request.project, &state.config.workspace)?;
    let kind = request.kind();

    let locator = state.locator.clone();
    let selector = state.selector.clone();
    let root = workspace.root.clone();
    let target = request.target.clone();
    let test_priority = request.test_priority;

    // Filesystem walks and the selection prompt both block
    let outcome = tokio::task::spawn_blocking(move || {
        let matches = match &target {
            NavigationTarget::Class(reference) => locator.locate_class(reference, &root),
            NavigationTarget::Resource(selector_expr) => {
                locator.locate_resource(selector_expr, &root, test_priority)
            }
        };
        resolve(matches, selector.as_ref())
    })
    .await
    .map_err(AppError::internal)?;

    let found = match outcome {
        Outcome::Resolved(found) => found,
        Outcome::NotFound => return Err(kind.not_found().into()),
        Outcome::Cancelled => return Err(NavigationError::Cancelled.into()),
    };

    let reference = NavigationReference::new(
        &state.config.ide.scheme,
        &workspace.name,
        found.relative_path(),
        request.line,
    );
    info!(
        "{} resolved to {} ({})",
        request.project,
        found.relative_path(),
        found.provenance()
    );

    dispatch(state, workspace.name, reference.clone());
    Ok(reference)
}

/// Hand the reference to the arbiter, or straight to the opener when
/// arbitration is disabled. Never waits for either.
fn dispatch(state: &AppState, project: String, reference: NavigationReference) {
    match state.arbiter.clone() {
        Some(arbiter) => {
            tokio::task::spawn_blocking(move || {
                arbiter.run_cycle(&project, reference.as_str());
            });
        }
        None => {
            let opener = state.opener.clone();
            tokio::task::spawn_blocking(move || {
                if let Err(e) = opener.open(reference.as_str()) {
                    warn!("Failed to open {}: {}", reference, e);
                }
            });
        }
    }
}

/// Page that forwards the browser tab to the IDE URI and closes itself.
pub fn close_tab_page(reference: &NavigationReference) -> Response {
    let body = format!(
        "<html><body><script type='text/javascript'>window.open('{}', '_self'); window.close();</script></body></html>",
        reference
    );
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        body,
    )
        .into_response()
}
