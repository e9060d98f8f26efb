// Copyright (c) 2025 - Cowboy AI, Inc.

//! Plaintext liveness endpoint for orchestration

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::errors::TaskResult;
use crate::nats::NatsClient;

/// Something whose connectivity the endpoint reports
pub trait Probe: Send + Sync {
    fn is_connected(&self) -> bool;
}

impl Probe for NatsClient {
    fn is_connected(&self) -> bool {
        NatsClient::is_connected(self)
    }
}

/// Shared state of the health endpoint
#[derive(Clone)]
pub struct HealthState {
    version: Arc<str>,
    probe: Arc<dyn Probe>,
}

impl HealthState {
    pub fn new(version: impl Into<Arc<str>>, probe: Arc<dyn Probe>) -> Self {
        Self {
            version: version.into(),
            probe,
        }
    }
}

pub fn router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(healthcheck))
        .route("/health", get(healthcheck))
        .with_state(state)
}

/// Report bus connectivity and the running version
pub async fn healthcheck(State(state): State<HealthState>) -> impl IntoResponse {
    let (status, body) = if state.probe.is_connected() {
        (StatusCode::OK, format!("version: {}", state.version))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("version: {}\nnats: disconnected", state.version),
        )
    };
    (status, [(header::CONTENT_TYPE, "text/plain")], body)
}

/// Bind the endpoint's listener, resolving `host` if it is a name
pub async fn bind(host: &str, port: u16) -> TaskResult<TcpListener> {
    let listener = TcpListener::bind((host, port)).await?;
    info!(addr = %listener.local_addr()?, "healthcheck server listening");
    Ok(listener)
}

/// Serve the endpoint on a bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: HealthState, shutdown: F) -> TaskResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
