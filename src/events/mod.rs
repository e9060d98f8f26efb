// Copyright (c) 2025 - Cowboy AI, Inc.

//! Event taxonomy
//!
//! Events describe what a message on the bus means and where it is routed:
//!
//! ```text
//! {service}.automated.{action}     broadcast, zero or more handlers
//! {belongs_to}.manual.{method}     command, exactly one handler
//! ```
//!
//! The stream of an event is its first subject token.

pub mod automated;
pub mod manual;
pub mod schema;

use std::fmt;
use std::sync::Arc;

pub use automated::{Action, AutomatedEvent, ParseError, Service};
pub use manual::ManualEvent;
pub use schema::{ExtraFields, Field, FieldType, Kwargs, Schema, SchemaError};

use crate::subjects::Kind;

/// Any event a handler can be bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Event {
    Automated(AutomatedEvent),
    Manual(ManualEvent),
}

impl Event {
    pub fn kind(&self) -> Kind {
        match self {
            Event::Automated(_) => Kind::Automated,
            Event::Manual(_) => Kind::Manual,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Event::Automated(event) => event.name(),
            Event::Manual(event) => event.name(),
        }
    }

    pub fn stream(&self) -> &str {
        match self {
            Event::Automated(event) => event.stream(),
            Event::Manual(event) => event.stream(),
        }
    }

    pub fn subject(&self) -> String {
        match self {
            Event::Automated(event) => event.subject(),
            Event::Manual(event) => event.subject(),
        }
    }

    pub fn input_validator(&self) -> Arc<Schema> {
        match self {
            Event::Automated(event) => Arc::new(event.input_validator()),
            Event::Manual(event) => event.input_validator(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Automated(event) => fmt::Display::fmt(event, f),
            Event::Manual(event) => fmt::Display::fmt(event, f),
        }
    }
}

impl From<AutomatedEvent> for Event {
    fn from(event: AutomatedEvent) -> Self {
        Event::Automated(event)
    }
}

impl From<ManualEvent> for Event {
    fn from(event: ManualEvent) -> Self {
        Event::Manual(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_routing() {
        let automated: Event = AutomatedEvent::parse("registration.accepted").unwrap().into();
        assert_eq!(automated.kind(), Kind::Automated);
        assert_eq!(automated.subject(), "registration.automated.accepted");

        let manual: Event = ManualEvent::new("communication", "send", Schema::new("send")).into();
        assert_eq!(manual.kind(), Kind::Manual);
        assert_eq!(manual.stream(), "communication");
        assert_eq!(manual.to_string(), "communication.send");
    }

    #[test]
    fn test_automated_orders_before_manual() {
        let automated: Event = AutomatedEvent::parse("workshops.deleted").unwrap().into();
        let manual: Event = ManualEvent::new("communication", "send", Schema::new("send")).into();
        assert!(automated < manual);
    }
}
