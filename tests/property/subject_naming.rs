// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Subject Naming
//!
//! Events, subjects, streams and queue groups are derived from each other
//! deterministically. These tests check the derivations stay consistent.

use hackathon_tasks::events::{AutomatedEvent, ManualEvent, Schema};
use hackathon_tasks::subjects::{self, Kind, Parts};
use proptest::prelude::*;

fn automated_event() -> impl Strategy<Value = AutomatedEvent> {
    let all: Vec<_> = AutomatedEvent::all().collect();
    proptest::sample::select(all)
}

fn identifier() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,15}"
}

proptest! {
    /// Property: an automated event survives subject encoding
    #[test]
    fn prop_automated_subject_round_trip(event in automated_event()) {
        let subject = event.subject();
        prop_assert_eq!(AutomatedEvent::from_subject(&subject).unwrap(), event);
        prop_assert_eq!(AutomatedEvent::parse(&event.name()).unwrap(), event);
        prop_assert!(subject.starts_with(event.stream()));
    }

    /// Property: subjects split back into their parts
    #[test]
    fn prop_subject_parts(namespace in identifier(), name in identifier(), manual in any::<bool>()) {
        let kind = if manual { Kind::Manual } else { Kind::Automated };
        let subject = subjects::subject(&namespace, kind, &name);
        let parts = Parts::parse(&subject).unwrap();
        prop_assert_eq!(parts.namespace, namespace.as_str());
        prop_assert_eq!(parts.kind, kind);
        prop_assert_eq!(parts.name, name.as_str());
    }

    /// Property: queue groups never contain subject separators
    #[test]
    fn prop_queue_group_has_no_dots(belongs_to in identifier(), method in identifier()) {
        let event = ManualEvent::new(belongs_to.clone(), method, Schema::new("args"));
        let queue = subjects::queue_group(&event.subject());
        prop_assert!(!queue.contains('.'));
        prop_assert!(queue.starts_with(&belongs_to));
        prop_assert_eq!(event.stream(), belongs_to.as_str());
    }

    /// Property: every subject is captured by its stream's subjects
    #[test]
    fn prop_stream_captures_subject(event in automated_event()) {
        let patterns = subjects::stream_subjects(event.stream());
        let prefix = format!("{}.automated.", event.stream());
        let wildcard = format!("{}*", prefix);
        prop_assert!(patterns.contains(&wildcard));
        prop_assert!(event.subject().starts_with(&prefix));
    }
}
