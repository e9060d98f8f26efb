// Copyright (c) 2025 - Cowboy AI, Inc.

//! Built-in handler units
//!
//! The bodies only log; mail delivery, webhooks and exports live in the
//! services that own them. What matters here is the input each unit declares
//! and the response it returns.

use crate::registry::HandlerTree;

pub mod communication;
pub mod integrations;

/// The handler tree registered by the `tasks` binary
pub fn tree() -> HandlerTree {
    HandlerTree::new("handlers")
        .service("communication", communication::units())
        .service("integrations", integrations::units())
}

crate::arguments! {
    /// Input of handlers reacting to participant events
    #[derive(Debug, Clone)]
    pub struct ParticipantEvent {
        pub participant_id: i64,
    }
}

crate::arguments! {
    /// Input of handlers reacting to workshop events
    #[derive(Debug, Clone)]
    pub struct WorkshopEvent {
        pub event_id: i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{AutomatedEvent, Event};
    use crate::resolver::resolve;

    #[test]
    fn test_builtin_tree_resolves_cleanly() {
        let resolution = resolve(&tree());
        assert!(resolution.rejected.is_empty(), "{:?}", resolution.rejected);

        let accepted: Event = AutomatedEvent::parse("registration.accepted").unwrap().into();
        let handlers: Vec<_> = resolution
            .get(&accepted)
            .unwrap()
            .iter()
            .map(|h| h.name().to_string())
            .collect();
        assert_eq!(handlers, vec!["integrations.on_application_accepted"]);

        let rejected: Event = AutomatedEvent::parse("registration.rejected").unwrap().into();
        assert_eq!(resolution.get(&rejected).unwrap().len(), 2);
    }

    #[test]
    fn test_builtin_commands() {
        let resolution = resolve(&tree());
        let mut commands: Vec<_> = resolution
            .handlers
            .keys()
            .filter_map(|event| match event {
                Event::Manual(manual) => Some(manual.name()),
                Event::Automated(_) => None,
            })
            .collect();
        commands.sort();
        assert_eq!(
            commands,
            vec![
                "communication.send",
                "communication.send_incomplete_reminder",
                "communication.send_test",
                "integrations.export",
                "integrations.process_judging",
            ]
        );
    }
}
