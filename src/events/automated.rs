// Copyright (c) 2025 - Cowboy AI, Inc.

//! Automated domain events
//!
//! An automated event is broadcast by domain code when something happens in a
//! service. Each service owns a closed set of actions, and every action carries
//! the schema of the keyword arguments it delivers.
//!
//! ```rust
//! use hackathon_tasks::events::{Action, AutomatedEvent, Service};
//!
//! let event = AutomatedEvent::parse("registration.accepted").unwrap();
//! assert_eq!(event.service(), Service::Registration);
//! assert_eq!(event.action(), Action::Accepted);
//! assert_eq!(event.subject(), "registration.automated.accepted");
//! assert_eq!(event.stream(), "registration");
//! ```

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::schema::{FieldType, Schema};
use crate::subjects::{self, Kind};

/// Errors raised while parsing an event declaration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The declaration has no `service.action` separator
    #[error("malformed event {0:?}, expected 'service.action'")]
    MalformedEvent(String),

    /// The service token is not a known service
    #[error("unknown service {service:?} in {raw:?}")]
    UnknownService { service: String, raw: String },

    /// The action token is not an action of that service
    #[error("unknown action {action:?} in {raw:?}")]
    UnknownAction { action: String, raw: String },
}

/// Domain services that emit automated events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Service {
    Authentication,
    Communication,
    Integrations,
    Registration,
    Workshops,
}

impl Service {
    pub const ALL: [Service; 5] = [
        Service::Authentication,
        Service::Communication,
        Service::Integrations,
        Service::Registration,
        Service::Workshops,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Service::Authentication => "authentication",
            Service::Communication => "communication",
            Service::Integrations => "integrations",
            Service::Registration => "registration",
            Service::Workshops => "workshops",
        }
    }

    /// The closed set of actions this service can emit
    pub fn actions(self) -> &'static [Action] {
        match self {
            Service::Authentication => &[Action::SignUp],
            Service::Communication | Service::Integrations => &[],
            Service::Registration => &[Action::NewApplication, Action::Accepted, Action::Rejected],
            Service::Workshops => &[Action::Updated, Action::Deleted],
        }
    }

    /// Resolve an action token within this service
    pub fn action(self, token: &str) -> Option<Action> {
        self.actions()
            .iter()
            .copied()
            .find(|action| action.as_str() == token)
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Service::ALL
            .iter()
            .copied()
            .find(|service| service.as_str() == s)
            .ok_or(())
    }
}

/// Actions emitted by services
///
/// Membership of an action in a service is defined by [`Service::actions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    // Authentication
    SignUp,

    // Registration
    NewApplication,
    Accepted,
    Rejected,

    // Workshops
    Updated,
    Deleted,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::SignUp => "sign_up",
            Action::NewApplication => "new_application",
            Action::Accepted => "accepted",
            Action::Rejected => "rejected",
            Action::Updated => "updated",
            Action::Deleted => "deleted",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default payload for most actions: the participant the event concerns
pub fn with_participant_id() -> Schema {
    Schema::new("WithParticipantId").field("participant_id", FieldType::Integer)
}

/// Payload for workshop actions: the workshop event that changed
pub fn with_event_id() -> Schema {
    Schema::new("WithEventId").field("event_id", FieldType::Integer)
}

/// A broadcast notification fired by a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AutomatedEvent {
    service: Service,
    action: Action,
}

impl AutomatedEvent {
    /// Build an event, checking that the action belongs to the service
    pub fn new(service: Service, action: Action) -> Result<Self, ParseError> {
        if !service.actions().contains(&action) {
            return Err(ParseError::UnknownAction {
                action: action.to_string(),
                raw: format!("{}.{}", service, action),
            });
        }
        Ok(Self { service, action })
    }

    /// Parse a `service.action` declaration
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let (service_token, action_token) = raw
            .split_once('.')
            .ok_or_else(|| ParseError::MalformedEvent(raw.to_string()))?;

        let service: Service = service_token
            .parse()
            .map_err(|_| ParseError::UnknownService {
                service: service_token.to_string(),
                raw: raw.to_string(),
            })?;

        let action = service
            .action(action_token)
            .ok_or_else(|| ParseError::UnknownAction {
                action: action_token.to_string(),
                raw: raw.to_string(),
            })?;

        Ok(Self { service, action })
    }

    /// Recover an event from its automated subject
    pub fn from_subject(subject: &str) -> Result<Self, ParseError> {
        match subjects::Parts::parse(subject) {
            Some(parts) if parts.kind == Kind::Automated => Self::parse(&parts.declaration()),
            _ => Err(ParseError::MalformedEvent(subject.to_string())),
        }
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// `service.action`, the form handlers declare
    pub fn name(&self) -> String {
        format!("{}.{}", self.service, self.action)
    }

    pub fn stream(&self) -> &'static str {
        self.service.as_str()
    }

    pub fn subject(&self) -> String {
        subjects::subject(self.service.as_str(), Kind::Automated, self.action.as_str())
    }

    /// The schema of the keyword arguments this event delivers
    pub fn input_validator(&self) -> Schema {
        match self.service {
            Service::Workshops => with_event_id(),
            _ => with_participant_id(),
        }
    }

    /// Every valid service/action pair
    pub fn all() -> impl Iterator<Item = AutomatedEvent> {
        Service::ALL.into_iter().flat_map(|service| {
            service
                .actions()
                .iter()
                .map(move |&action| AutomatedEvent { service, action })
        })
    }
}

impl fmt::Display for AutomatedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.service, self.action)
    }
}

impl FromStr for AutomatedEvent {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
