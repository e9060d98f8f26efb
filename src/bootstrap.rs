// Copyright (c) 2025 - Cowboy AI, Inc.

//! Process start-up and shutdown
//!
//! connect → resolve → bind → serve health → wait for a signal → unsubscribe

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use crate::bus;
use crate::config::Settings;
use crate::health::{self, HealthState};
use crate::nats::NatsClient;
use crate::registry::HandlerTree;
use crate::resolver;

/// Run the task runtime until the process is asked to stop
pub async fn run(settings: Settings, tree: HandlerTree) -> Result<()> {
    info!(version = %settings.version, "starting tasks");

    let client = NatsClient::connect(&settings.nats)
        .await
        .context("failed to connect to NATS")?;

    let resolution = resolver::resolve(&tree);
    info!(
        events = resolution.handlers.len(),
        handlers = resolution.handler_count(),
        rejected = resolution.rejected.len(),
        "registered handlers"
    );
    for rejected in &resolution.rejected {
        warn!(unit = %rejected.unit, error = %rejected.error, "handler not registered");
    }

    let subscriptions = bus::bind(client.jetstream(), &resolution.handlers, &settings.streams)
        .await
        .context("failed to bind handlers")?;

    let listener = health::bind(&settings.healthcheck_host, settings.healthcheck_port)
        .await
        .with_context(|| {
            format!(
                "failed to bind healthcheck server on {}:{}",
                settings.healthcheck_host, settings.healthcheck_port
            )
        })?;
    let state = HealthState::new(settings.version.as_str(), Arc::new(client.clone()));
    let (stop_health, health_stopped) = oneshot::channel::<()>();
    let health = tokio::spawn(health::serve(listener, state, async move {
        let _ = health_stopped.await;
    }));

    info!("🚀 tasks running, waiting for messages");
    shutdown_signal().await;
    info!("shutdown signal received");

    bus::unsubscribe_all(subscriptions, settings.shutdown_grace).await;

    let _ = stop_health.send(());
    match health.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "healthcheck server failed"),
        Err(e) => error!(error = %e, "healthcheck server panicked"),
    }

    if let Err(e) = client.inner().flush().await {
        warn!(error = %e, "failed to flush NATS connection");
    }

    info!("shutdown successfully, bye");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
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
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
