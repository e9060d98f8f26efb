// Copyright (c) 2025 - Cowboy AI, Inc.

//! JetStream stream and consumer setup for task events
//!
//! Every service namespace gets one durable work-queue stream capturing both
//! its automated events and its manual commands. Every subject gets one
//! durable push consumer delivering to a queue group, so replicas share the
//! work instead of each receiving every message.
//!
//! # Example
//!
//! ```rust,no_run
//! use hackathon_tasks::jetstream::{ensure_stream, StreamSettings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = async_nats::connect("nats://localhost:4222").await?;
//!     let jetstream = async_nats::jetstream::new(client);
//!
//!     let stream = ensure_stream(&jetstream, "registration", &StreamSettings::default()).await?;
//!
//!     Ok(())
//! }
//! ```

use async_nats::jetstream::{self, consumer, stream::Stream};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::{TaskError, TaskResult};
use crate::events::Event;
use crate::subjects;

/// Settings shared by every task stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSettings {
    /// Maximum age of messages (default: 180 days)
    pub max_age: Duration,

    /// Number of replicas (for clustered NATS)
    pub replicas: usize,

    /// Storage type (File or Memory)
    pub storage: StorageType,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(180 * 24 * 60 * 60), // 6 months
            replicas: 1,
            storage: StorageType::File,
        }
    }
}

/// Storage type for JetStream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// File-based storage (persistent across restarts)
    File,
    /// Memory-based storage (faster, but lost on restart)
    Memory,
}

/// Stream configuration for a service namespace
pub fn stream_config(name: &str, settings: &StreamSettings) -> jetstream::stream::Config {
    let storage = match settings.storage {
        StorageType::File => jetstream::stream::StorageType::File,
        StorageType::Memory => jetstream::stream::StorageType::Memory,
    };

    jetstream::stream::Config {
        name: name.to_string(),
        description: Some(format!("for the {} service", name)),
        subjects: subjects::stream_subjects(name),
        max_age: settings.max_age,
        storage,
        num_replicas: settings.replicas,
        retention: jetstream::stream::RetentionPolicy::WorkQueue,
        ..Default::default()
    }
}

/// Create the stream of a namespace unless it already exists
pub async fn ensure_stream(
    jetstream: &jetstream::Context,
    name: &str,
    settings: &StreamSettings,
) -> TaskResult<Stream> {
    jetstream
        .get_or_create_stream(stream_config(name, settings))
        .await
        .map_err(|e| TaskError::Stream(format!("{}: {}", name, e)))
}

/// Distinct streams referenced by a set of events
pub fn streams_for<'a>(events: impl IntoIterator<Item = &'a Event>) -> BTreeSet<String> {
    events
        .into_iter()
        .map(|event| event.stream().to_string())
        .collect()
}

/// Ensure the stream of every event exists, returning the stream names
pub async fn ensure_streams<'a>(
    jetstream: &jetstream::Context,
    events: impl IntoIterator<Item = &'a Event>,
    settings: &StreamSettings,
) -> TaskResult<BTreeSet<String>> {
    let streams = streams_for(events);
    for name in &streams {
        ensure_stream(jetstream, name, settings).await?;
        debug!(stream = %name, "stream ready");
    }
    info!(count = streams.len(), "created streams (if not existed)");
    Ok(streams)
}

/// Durable push consumer shared by every replica bound to a subject
pub fn consumer_config(subject: &str) -> consumer::push::Config {
    let queue = subjects::queue_group(subject);
    consumer::push::Config {
        durable_name: Some(queue.clone()),
        deliver_subject: subjects::deliver_subject(&queue),
        deliver_group: Some(queue),
        filter_subject: subject.to_string(),
        ack_policy: consumer::AckPolicy::Explicit,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{AutomatedEvent, ManualEvent, Schema};

    #[test]
    fn test_default_settings() {
        let settings = StreamSettings::default();
        assert_eq!(settings.max_age, Duration::from_secs(15_552_000));
        assert_eq!(settings.replicas, 1);
        assert_eq!(settings.storage, StorageType::File);
    }

    #[test]
    fn test_stream_config() {
        let config = stream_config("communication", &StreamSettings::default());
        assert_eq!(config.name, "communication");
        assert_eq!(
            config.subjects,
            vec!["communication.automated.*", "communication.manual.*"]
        );
        assert_eq!(config.description.as_deref(), Some("for the communication service"));
        assert_eq!(config.retention, jetstream::stream::RetentionPolicy::WorkQueue);
        assert_eq!(config.storage, jetstream::stream::StorageType::File);
    }

    #[test]
    fn test_streams_are_deduplicated() {
        let events: Vec<Event> = vec![
            AutomatedEvent::parse("registration.accepted").unwrap().into(),
            AutomatedEvent::parse("registration.rejected").unwrap().into(),
            ManualEvent::new("communication", "send", Schema::new("send")).into(),
        ];
        let streams: Vec<_> = streams_for(&events).into_iter().collect();
        assert_eq!(streams, vec!["communication", "registration"]);
    }

    #[test]
    fn test_consumer_config() {
        let config = consumer_config("communication.manual.send");
        assert_eq!(config.durable_name.as_deref(), Some("communication-manual-send"));
        assert_eq!(config.deliver_group.as_deref(), Some("communication-manual-send"));
        assert_eq!(config.deliver_subject, "_tasks.deliver.communication-manual-send");
        assert_eq!(config.filter_subject, "communication.manual.send");
        assert_eq!(config.ack_policy, consumer::AckPolicy::Explicit);
    }
}
