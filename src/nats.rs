//! NATS client and event publisher

use async_nats::jetstream;
use async_nats::{Client, ConnectOptions, HeaderMap};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::{TaskError, TaskResult};
use crate::events::AutomatedEvent;
use crate::subjects::{self, Kind};
use crate::trace_context::{TraceContext, TRACEPARENT};

/// Configuration for NATS connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NatsConfig {
    /// NATS server URLs
    pub servers: Vec<String>,
    /// Client name
    pub name: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://localhost:4222".to_string()],
            name: "tasks".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// Bus client shared by the bus adapter, the publisher and the health check
///
/// Constructed once at start-up and passed by reference.
#[derive(Clone)]
pub struct NatsClient {
    client: Client,
    jetstream: jetstream::Context,
}

impl NatsClient {
    /// Connect with the given configuration
    pub async fn connect(config: &NatsConfig) -> TaskResult<Self> {
        let connect_options = ConnectOptions::new()
            .name(&config.name)
            .connection_timeout(config.connect_timeout)
            .request_timeout(Some(config.request_timeout));

        let client = async_nats::connect_with_options(config.servers.join(","), connect_options)
            .await
            .map_err(|e| TaskError::NatsConnection(e.to_string()))?;

        info!(servers = ?config.servers, "connected to NATS");

        Ok(Self::from_client(client))
    }

    /// Wrap an already connected client
    pub fn from_client(client: Client) -> Self {
        let jetstream = jetstream::new(client.clone());
        Self { client, jetstream }
    }

    /// Whether the connection is currently established
    pub fn is_connected(&self) -> bool {
        matches!(
            self.client.connection_state(),
            async_nats::connection::State::Connected
        )
    }

    pub fn jetstream(&self) -> &jetstream::Context {
        &self.jetstream
    }

    /// Get the underlying NATS client for advanced operations
    pub fn inner(&self) -> &Client {
        &self.client
    }

    pub fn publisher(&self) -> Publisher {
        Publisher {
            jetstream: self.jetstream.clone(),
        }
    }
}

/// Publishes events and commands onto the task streams
#[derive(Clone)]
pub struct Publisher {
    jetstream: jetstream::Context,
}

impl Publisher {
    /// Fire an automated event
    pub async fn publish<T>(
        &self,
        event: AutomatedEvent,
        payload: &T,
        trace: Option<&TraceContext>,
    ) -> TaskResult<()>
    where
        T: Serialize,
    {
        self.send(event.subject(), payload, trace).await
    }

    /// Invoke a manual command by its owner and method
    pub async fn invoke<T>(
        &self,
        belongs_to: &str,
        method: &str,
        payload: &T,
        trace: Option<&TraceContext>,
    ) -> TaskResult<()>
    where
        T: Serialize,
    {
        self.send(subjects::subject(belongs_to, Kind::Manual, method), payload, trace)
            .await
    }

    async fn send<T>(
        &self,
        subject: String,
        payload: &T,
        trace: Option<&TraceContext>,
    ) -> TaskResult<()>
    where
        T: Serialize,
    {
        let payload = serde_json::to_vec(payload)?;
        let trace = trace.map_or_else(TraceContext::generate, TraceContext::child);

        let mut headers = HeaderMap::new();
        headers.insert(TRACEPARENT, trace.to_header().as_str());

        self.jetstream
            .publish_with_headers(subject.clone(), headers, payload.into())
            .await
            .map_err(|e| TaskError::Publish(e.to_string()))?
            .await
            .map_err(|e| TaskError::Publish(e.to_string()))?;

        debug!(subject = %subject, trace_id = %trace.trace_id(), "published message");
        Ok(())
    }
}
