// Copyright (c) 2025 - Cowboy AI, Inc.

//! Message dispatch onto bound handlers
//!
//! A [`Dispatcher`] is built for every `(event, handlers)` pair the resolver
//! produced and is invoked once per delivered message:
//!
//! 1. open a root span for the event, linked to the publisher's trace
//! 2. validate the payload against the event schema, terminating messages that
//!    can never become valid
//! 3. run the handlers under the strategy of the event kind
//! 4. settle the message and record the failure count on the span
//!
//! Automated events use the batch strategy: every handler runs, failures are
//! counted but never stop the others, and the message is always acknowledged.
//! Manual events use the single strategy: the handler's [`Response`] decides
//! between acknowledge, release and terminate. A handler error is logged and
//! acknowledged so it cannot poison the queue.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::field::{display, Empty};
use tracing::{error, info, info_span, warn, Instrument, Span};

use crate::errors::TaskResult;
use crate::events::{Event, Kwargs, Schema};
use crate::handler::{Handler, Returned};
use crate::response::{Disposition, Response};
use crate::subjects::Kind;
use crate::trace_context::{TraceContext, TRACEPARENT};

/// A message delivered by the bus, awaiting settlement
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Raw message body
    fn payload(&self) -> &[u8];

    /// Transport header value
    fn header(&self, name: &str) -> Option<&str>;

    /// Tell the bus what to do with the message
    async fn settle(&self, disposition: Disposition) -> TaskResult<()>;
}

/// How handlers bound to an event are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Every handler in turn, best effort, always acknowledged
    Batch,
    /// The one handler, its response decides the outcome
    Single,
}

impl Strategy {
    pub fn for_kind(kind: Kind) -> Self {
        match kind {
            Kind::Automated => Strategy::Batch,
            Kind::Manual => Strategy::Single,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Batch => write!(f, "batch"),
            Strategy::Single => write!(f, "single"),
        }
    }
}

/// Outcome of dispatching one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    pub disposition: Disposition,
    /// Handlers that failed
    pub failed: usize,
    /// Why the message was not processed cleanly, if it wasn't
    pub reason: Option<String>,
    /// Trace id logged for this message
    pub trace_id: String,
}

/// The consumer callback for one event
#[derive(Clone)]
pub struct Dispatcher {
    event: Arc<Event>,
    subject: Arc<str>,
    schema: Arc<Schema>,
    handlers: Arc<[Handler]>,
    strategy: Strategy,
}

impl Dispatcher {
    pub fn new(event: Event, handlers: Vec<Handler>) -> Self {
        Self {
            subject: event.subject().into(),
            schema: event.input_validator(),
            strategy: Strategy::for_kind(event.kind()),
            event: Arc::new(event),
            handlers: handlers.into(),
        }
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Process one delivered message and settle it
    pub async fn dispatch<D>(&self, message: &D) -> Dispatched
    where
        D: Delivery + ?Sized,
    {
        let trace = TraceContext::generate();
        let span = info_span!(
            parent: None,
            "task",
            otel.name = %self.subject,
            otel.kind = "consumer",
            trace_id = %trace.trace_id(),
            link.trace_id = Empty,
            link.span_id = Empty,
            task.event = %self.event,
            task.kind = %self.event.kind(),
            task.stream = %self.event.stream(),
            task.subject = %self.subject,
            task.args.size = message.payload().len(),
            task.handlers.total = self.handlers.len(),
            task.handlers.failed = Empty,
            task.status = Empty,
            task.reason = Empty,
            error = Empty,
        );

        if let Some(link) = message.header(TRACEPARENT).and_then(TraceContext::parse) {
            span.record("link.trace_id", link.trace_id());
            span.record("link.span_id", link.span_id());
        }

        self.process(message, trace.trace_id().to_string())
            .instrument(span)
            .await
    }

    async fn process<D>(&self, message: &D, trace_id: String) -> Dispatched
    where
        D: Delivery + ?Sized,
    {
        let current = Span::current();

        let kwargs = match info_span!("parse").in_scope(|| self.schema.validate(message.payload()))
        {
            Ok(kwargs) => kwargs,
            Err(e) => {
                error!(
                    trace_id = %trace_id,
                    event = %self.event,
                    error = %e,
                    "invalid payload, terminating message"
                );
                current.record("error", true);
                current.record("task.reason", display(&e));
                settle(message, Disposition::Terminate, &trace_id).await;
                return Dispatched {
                    disposition: Disposition::Terminate,
                    failed: 0,
                    reason: Some(e.to_string()),
                    trace_id,
                };
            }
        };

        let (disposition, failed, reason) = match self.strategy {
            Strategy::Batch => {
                let failed = self.run_batch(kwargs, &trace_id).await;
                (Disposition::Acknowledge, failed, None)
            }
            Strategy::Single => self.run_single(kwargs, &trace_id).await,
        };

        current.record("task.handlers.failed", failed);
        settle(message, disposition, &trace_id).await;

        Dispatched {
            disposition,
            failed,
            reason,
            trace_id,
        }
    }

    async fn run_batch(&self, kwargs: Kwargs, trace_id: &str) -> usize {
        let mut failed = 0;
        for handler in self.handlers.iter() {
            let span = info_span!("handler", otel.name = %handler.name(), handler = %handler.name());
            if let Err(e) = handler.call(kwargs.clone()).instrument(span).await {
                failed += 1;
                error!(
                    trace_id = %trace_id,
                    handler = %handler.name(),
                    error = ?e,
                    "handler failed"
                );
            }
        }
        failed
    }

    async fn run_single(
        &self,
        kwargs: Kwargs,
        trace_id: &str,
    ) -> (Disposition, usize, Option<String>) {
        let Some(handler) = self.handlers.first() else {
            warn!(trace_id = %trace_id, event = %self.event, "no handler bound to command");
            return (Disposition::Acknowledge, 0, None);
        };

        let current = Span::current();
        let span = info_span!("handler", otel.name = %handler.name(), handler = %handler.name());

        match handler.call(kwargs).instrument(span).await {
            Ok(Returned::Response(response)) => {
                current.record("task.status", display(response.status()));
                let failed = match &response {
                    Response::Success { delay: None } => 0,
                    Response::Success { delay: Some(delay) } => {
                        info!(
                            trace_id = %trace_id,
                            handler = %handler.name(),
                            delay = ?delay,
                            "deferring command"
                        );
                        0
                    }
                    Response::TransientFailure {
                        reason,
                        retry_after,
                    } => {
                        current.record("error", true);
                        current.record("task.reason", reason.as_str());
                        warn!(
                            trace_id = %trace_id,
                            handler = %handler.name(),
                            reason = %reason,
                            retry_after = ?retry_after,
                            "handler failed transiently, releasing message"
                        );
                        1
                    }
                    Response::Failure { reason } => {
                        current.record("error", true);
                        current.record("task.reason", reason.as_str());
                        error!(
                            trace_id = %trace_id,
                            handler = %handler.name(),
                            reason = %reason,
                            "handler failed, terminating message"
                        );
                        1
                    }
                };
                let reason = response.reason().map(str::to_string);
                (response.disposition(), failed, reason)
            }
            Ok(_) => (Disposition::Acknowledge, 0, None),
            Err(e) => {
                current.record("error", true);
                current.record("task.reason", display(&e));
                error!(
                    trace_id = %trace_id,
                    handler = %handler.name(),
                    error = ?e,
                    "handler raised, acknowledging message"
                );
                (Disposition::Acknowledge, 1, Some(e.to_string()))
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("event", &self.event)
            .field("strategy", &self.strategy)
            .field("handlers", &self.handlers)
            .finish()
    }
}

async fn settle<D>(message: &D, disposition: Disposition, trace_id: &str)
where
    D: Delivery + ?Sized,
{
    if let Err(e) = message.settle(disposition).await {
        error!(
            trace_id = %trace_id,
            disposition = %disposition,
            error = %e,
            "failed to settle message"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_follows_kind() {
        assert_eq!(Strategy::for_kind(Kind::Automated), Strategy::Batch);
        assert_eq!(Strategy::for_kind(Kind::Manual), Strategy::Single);
    }
}
