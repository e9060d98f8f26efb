// Copyright (c) 2025 - Cowboy AI, Inc.
//! Task runtime
//!
//! Subscribes the built-in handlers to their JetStream subjects and serves a
//! health endpoint until SIGINT or SIGTERM.
//!
//! Run with: cargo run --bin tasks
//!
//! Prerequisites:
//! 1. NATS server with JetStream enabled (default: localhost:4222)
//! 2. Optional `.env` file with overrides (see `Settings::from_env`)

use anyhow::Result;
use hackathon_tasks::{bootstrap, handlers, Settings};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::from_env()?;

    // RUST_LOG wins over LOG_LEVEL
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    bootstrap::run(settings, handlers::tree()).await
}
