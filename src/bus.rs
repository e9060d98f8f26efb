// Copyright (c) 2025 - Cowboy AI, Inc.

//! Binding dispatchers to JetStream subscriptions
//!
//! Each `(event, handlers)` pair becomes one subscription running on its own
//! task. Messages within a subscription are processed one at a time; separate
//! subscriptions run concurrently.

use async_nats::jetstream::{self, AckKind};
use async_trait::async_trait;
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::dispatch::{Delivery, Dispatcher};
use crate::errors::{TaskError, TaskResult};
use crate::jetstream::{consumer_config, ensure_streams, StreamSettings};
use crate::resolver::HandlerMap;
use crate::response::Disposition;
use crate::subjects;

#[async_trait]
impl Delivery for jetstream::Message {
    fn payload(&self) -> &[u8] {
        &self.message.payload
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.message
            .headers
            .as_ref()
            .and_then(|headers| headers.get(name))
            .map(|value| value.as_str())
    }

    async fn settle(&self, disposition: Disposition) -> TaskResult<()> {
        let kind = match disposition {
            Disposition::Acknowledge => AckKind::Ack,
            Disposition::Release { delay } => AckKind::Nak(delay),
            Disposition::Terminate => AckKind::Term,
        };
        self.ack_with(kind)
            .await
            .map_err(|e| TaskError::Acknowledge(e.to_string()))
    }
}

/// Handle to a running subscription
#[derive(Debug)]
pub struct Subscription {
    subject: String,
    queue: String,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Stop taking new messages
    ///
    /// The message being processed, if any, runs to completion. The returned
    /// handle resolves once the loop has exited.
    pub fn unsubscribe(self) -> JoinHandle<()> {
        debug!(queue = %self.queue, "unsubscribing from queue");
        let _ = self.shutdown.send(true);
        self.task
    }
}

/// Subscribe a dispatcher to its event's subject within its queue group
pub async fn subscribe(
    jetstream: &jetstream::Context,
    dispatcher: Dispatcher,
) -> TaskResult<Subscription> {
    let subject = dispatcher.subject().to_string();
    let queue = subjects::queue_group(&subject);

    let stream = jetstream
        .get_stream(dispatcher.event().stream())
        .await
        .map_err(|e| TaskError::Stream(e.to_string()))?;

    let consumer = stream
        .get_or_create_consumer(&queue, consumer_config(&subject))
        .await
        .map_err(|e| TaskError::Subscribe(format!("{}: {}", subject, e)))?;

    let mut messages = consumer
        .messages()
        .await
        .map_err(|e| TaskError::Subscribe(format!("{}: {}", subject, e)))?;

    let (shutdown, mut stopped) = watch::channel(false);
    let loop_subject = subject.clone();

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = stopped.changed() => break,
                next = messages.next() => match next {
                    Some(Ok(message)) => {
                        dispatcher.dispatch(&message).await;
                    }
                    Some(Err(e)) => {
                        warn!(subject = %loop_subject, error = %e, "error receiving message");
                    }
                    None => {
                        warn!(subject = %loop_subject, "subscription ended");
                        break;
                    }
                },
            }
        }
        debug!(subject = %loop_subject, "message loop stopped");
    });

    Ok(Subscription {
        subject,
        queue,
        shutdown,
        task,
    })
}

/// Make the resolved handlers durable and routable
///
/// Creates the streams of every event, then subscribes one dispatcher per
/// event. Any failure is returned immediately; the process should not serve
/// without its subscriptions.
pub async fn bind(
    jetstream: &jetstream::Context,
    handlers: &HandlerMap,
    settings: &StreamSettings,
) -> TaskResult<Vec<Subscription>> {
    ensure_streams(jetstream, handlers.keys(), settings).await?;

    let mut subscriptions = Vec::with_capacity(handlers.len());
    for (event, bound) in handlers {
        let dispatcher = Dispatcher::new(event.clone(), bound.clone());
        let subscription = subscribe(jetstream, dispatcher).await?;
        info!(
            event = %event,
            subject = %subscription.subject(),
            queue = %subscription.queue(),
            handlers = bound.len(),
            "subscribed handlers"
        );
        subscriptions.push(subscription);
    }

    Ok(subscriptions)
}

/// Unsubscribe everything, waiting up to `grace` for the loops to drain
pub async fn unsubscribe_all(subscriptions: Vec<Subscription>, grace: Duration) {
    let count = subscriptions.len();
    let tasks: Vec<_> = subscriptions
        .into_iter()
        .map(Subscription::unsubscribe)
        .collect();
    info!(count, "unsubscribed event consumers");

    let drained = tokio::time::timeout(grace, futures::future::join_all(tasks)).await;
    if drained.is_err() {
        warn!(grace = ?grace, "message loops still running after grace period");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unsubscribe_stops_idle_loop() {
        let (shutdown, mut stopped) = watch::channel(false);
        let task = tokio::spawn(async move {
            let _ = stopped.changed().await;
        });
        let subscription = Subscription {
            subject: "communication.manual.send".to_string(),
            queue: "communication-manual-send".to_string(),
            shutdown,
            task,
        };

        unsubscribe_all(vec![subscription], Duration::from_secs(1)).await;
    }
}
