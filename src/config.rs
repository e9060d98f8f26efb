// Copyright (c) 2025 - Cowboy AI, Inc.

//! Process settings loaded from the environment

use std::str::FromStr;
use std::time::Duration;

use crate::errors::{TaskError, TaskResult};
use crate::jetstream::StreamSettings;
use crate::nats::NatsConfig;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Everything the process needs at start-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub nats: NatsConfig,
    pub streams: StreamSettings,
    pub healthcheck_host: String,
    pub healthcheck_port: u16,
    /// How long to wait for message loops after unsubscribing
    pub shutdown_grace: Duration,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Version reported by the health endpoint
    pub version: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            nats: NatsConfig::default(),
            streams: StreamSettings::default(),
            healthcheck_host: "0.0.0.0".to_string(),
            healthcheck_port: 8000,
            shutdown_grace: Duration::from_secs(5),
            log_level: "info".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `.env` (if present) and the process environment
    pub fn from_env() -> TaskResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> TaskResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let servers = lookup("NATS_URL")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|servers| !servers.is_empty())
            .unwrap_or(defaults.nats.servers);

        let nats = NatsConfig {
            servers,
            name: lookup("NATS_CLIENT_NAME").unwrap_or(defaults.nats.name),
            connect_timeout: parse_or(&lookup, "NATS_CONNECT_TIMEOUT_SECS", 10)
                .map(Duration::from_secs)?,
            request_timeout: defaults.nats.request_timeout,
        };

        let streams = StreamSettings {
            max_age: parse_or(&lookup, "STREAM_MAX_AGE_DAYS", 180u64).and_then(|days| {
                days.checked_mul(SECS_PER_DAY)
                    .map(Duration::from_secs)
                    .ok_or_else(|| {
                        TaskError::Configuration(format!("STREAM_MAX_AGE_DAYS = {} is too large", days))
                    })
            })?,
            replicas: parse_or(&lookup, "STREAM_REPLICAS", defaults.streams.replicas)?,
            storage: defaults.streams.storage,
        };

        Ok(Self {
            nats,
            streams,
            healthcheck_host: lookup("HEALTHCHECK_HOST").unwrap_or(defaults.healthcheck_host),
            healthcheck_port: parse_or(&lookup, "HEALTHCHECK_PORT", defaults.healthcheck_port)?,
            shutdown_grace: parse_or(&lookup, "SHUTDOWN_GRACE_SECS", 5).map(Duration::from_secs)?,
            log_level: lookup("LOG_LEVEL")
                .map(|level| level.to_lowercase())
                .unwrap_or(defaults.log_level),
            version: lookup("COMMIT").unwrap_or(defaults.version),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> TaskResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| TaskError::Configuration(format!("{} = {:?}: {}", key, raw, e))),
        None => Ok(default),
    }
}
