// Copyright (c) 2025 - Cowboy AI, Inc.

//! NATS subject hierarchy for task events
//!
//! # Subject Pattern
//!
//! ```text
//! {namespace}.{kind}.{name}
//! ```
//!
//! where `namespace` is the owning service (also the stream name), `kind` is
//! `automated` or `manual`, and `name` is the action or method.
//!
//! # Examples
//!
//! ```rust
//! use hackathon_tasks::subjects::{self, Kind};
//!
//! let subject = subjects::subject("registration", Kind::Automated, "accepted");
//! assert_eq!(subject, "registration.automated.accepted");
//! assert_eq!(subjects::queue_group(&subject), "registration-automated-accepted");
//! assert_eq!(
//!     subjects::stream_subjects("registration"),
//!     vec!["registration.automated.*", "registration.manual.*"],
//! );
//! ```

use std::fmt;

/// Prefix for push consumer delivery subjects
pub const DELIVER_PREFIX: &str = "_tasks.deliver";

/// Whether a subject carries broadcast events or commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    /// Broadcast notifications fired by domain code
    Automated,
    /// Commands invoked by name
    Manual,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Automated => "automated",
            Kind::Manual => "manual",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "automated" => Some(Kind::Automated),
            "manual" => Some(Kind::Manual),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the subject for an event
pub fn subject(namespace: &str, kind: Kind, name: &str) -> String {
    format!("{}.{}.{}", namespace, kind, name)
}

/// Subjects captured by the stream of a namespace
pub fn stream_subjects(stream: &str) -> Vec<String> {
    vec![
        format!("{}.{}.*", stream, Kind::Automated),
        format!("{}.{}.*", stream, Kind::Manual),
    ]
}

/// Queue group shared by every replica consuming a subject
///
/// Also used as the durable consumer name, which may not contain `.`.
pub fn queue_group(subject: &str) -> String {
    subject.replace('.', "-")
}

/// Delivery subject of the push consumer behind a queue group
pub fn deliver_subject(queue: &str) -> String {
    format!("{}.{}", DELIVER_PREFIX, queue)
}

/// The three tokens of a task subject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parts<'a> {
    pub namespace: &'a str,
    pub kind: Kind,
    pub name: &'a str,
}

impl<'a> Parts<'a> {
    /// Split a subject into its tokens, `None` if it is not a task subject
    pub fn parse(subject: &'a str) -> Option<Self> {
        let mut tokens = subject.splitn(3, '.');
        let namespace = tokens.next().filter(|t| !t.is_empty())?;
        let kind = Kind::from_token(tokens.next()?)?;
        let name = tokens.next().filter(|t| !t.is_empty() && !t.contains('.'))?;
        Some(Self {
            namespace,
            kind,
            name,
        })
    }

    /// `namespace.name`, the form automated events are declared with
    pub fn declaration(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject() {
        assert_eq!(
            subject("communication", Kind::Manual, "send"),
            "communication.manual.send"
        );
    }

    #[test]
    fn test_queue_group_is_dot_free() {
        let queue = queue_group("workshops.automated.updated");
        assert_eq!(queue, "workshops-automated-updated");
        assert!(!queue.contains('.'));
    }

    #[test]
    fn test_deliver_subject() {
        assert_eq!(
            deliver_subject("communication-manual-send"),
            "_tasks.deliver.communication-manual-send"
        );
    }

    #[test]
    fn test_parts() {
        let parts = Parts::parse("registration.automated.accepted").unwrap();
        assert_eq!(parts.namespace, "registration");
        assert_eq!(parts.kind, Kind::Automated);
        assert_eq!(parts.name, "accepted");
        assert_eq!(parts.declaration(), "registration.accepted");
    }

    #[test]
    fn test_parts_rejects_foreign_subjects() {
        assert_eq!(Parts::parse("registration.accepted"), None);
        assert_eq!(Parts::parse("registration.other.accepted"), None);
        assert_eq!(Parts::parse("a.manual.b.c"), None);
        assert_eq!(Parts::parse(".manual.b"), None);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(Kind::Automated.to_string(), "automated");
        assert_eq!(Kind::Manual.to_string(), "manual");
    }
}
