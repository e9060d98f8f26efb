// Copyright (c) 2025 - Cowboy AI, Inc.

//! Participant messaging

use chrono::{DateTime, Duration as TimeDelta, Utc};
use tracing::info;

use super::ParticipantEvent;
use crate::registry::{HandlerUnit, Node};
use crate::response::Response;

/// Reminders scheduled less than this far ahead are sent straight away
const JITTER_SECS: i64 = 5;

pub fn units() -> Vec<Node> {
    vec![
        Node::unit("shared", HandlerUnit::shared),
        Node::unit("send", || HandlerUnit::manual().handler(send)),
        Node::unit("send_test", || HandlerUnit::manual().handler(send_test)),
        Node::unit("send_incomplete_reminder", || {
            HandlerUnit::manual().handler(send_incomplete_reminder)
        }),
        Node::unit("on_sign_up", || {
            HandlerUnit::automated("authentication.sign_up").handler(on_sign_up)
        }),
        Node::unit("on_application_rejected", || {
            HandlerUnit::automated("registration.rejected").handler(on_application_rejected)
        }),
    ]
}

crate::arguments! {
    #[derive(Debug)]
    pub struct SendMessage {
        pub message_id: i64,
    }
}

/// Send a composed message to its recipients
pub async fn send(args: SendMessage) -> anyhow::Result<()> {
    info!(message_id = args.message_id, "sending message");
    Ok(())
}

crate::arguments! {
    #[derive(Debug)]
    pub struct SendTest {
        pub message_id: i64,
        pub user_id: i64,
    }
}

/// Send a draft message to a single organizer
pub async fn send_test(args: SendTest) -> anyhow::Result<()> {
    info!(
        message_id = args.message_id,
        user_id = args.user_id,
        "sending test message"
    );
    Ok(())
}

/// Which incomplete-application reminder to send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    Day,
    Week,
}

impl ReminderKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "24h" => Some(ReminderKind::Day),
            "7d" => Some(ReminderKind::Week),
            _ => None,
        }
    }
}

crate::arguments! {
    #[derive(Debug)]
    pub struct IncompleteReminder {
        pub participant_id: i64,
        pub kind: String,
        pub at: DateTime<Utc>,
    }
}

/// Remind a participant of an unfinished application once `at` has passed
pub async fn send_incomplete_reminder(args: IncompleteReminder) -> anyhow::Result<Response> {
    Ok(remind(&args, Utc::now()))
}

/// Decide what to do with a reminder at time `now`
pub fn remind(args: &IncompleteReminder, now: DateTime<Utc>) -> Response {
    let remaining = args.at - now;
    if remaining > TimeDelta::seconds(JITTER_SECS) {
        if let Ok(delay) = remaining.to_std() {
            return Response::delay_for(delay);
        }
    }

    let Some(kind) = ReminderKind::parse(&args.kind) else {
        return Response::failure(format!("unknown incomplete kind {:?}", args.kind));
    };

    info!(
        participant_id = args.participant_id,
        kind = ?kind,
        "sending incomplete application reminder"
    );
    Response::success()
}

/// Welcome a new participant
pub async fn on_sign_up(args: ParticipantEvent) -> anyhow::Result<()> {
    info!(participant_id = args.participant_id, "sending sign up message");
    Ok(())
}

pub async fn on_application_rejected(args: ParticipantEvent) -> anyhow::Result<()> {
    info!(participant_id = args.participant_id, "sending rejection message");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use test_case::test_case;

    fn reminder(kind: &str, at: DateTime<Utc>) -> IncompleteReminder {
        IncompleteReminder {
            participant_id: 42,
            kind: kind.to_string(),
            at,
        }
    }

    #[test]
    fn test_future_reminder_is_deferred() {
        let now = Utc::now();
        let response = remind(&reminder("24h", now + TimeDelta::hours(1)), now);
        assert_eq!(response, Response::delay_for(Duration::from_secs(3600)));
    }

    #[test_case("24h")]
    #[test_case("7d")]
    fn test_due_reminder_is_sent(kind: &str) {
        let now = Utc::now();
        assert_eq!(
            remind(&reminder(kind, now - TimeDelta::minutes(1)), now),
            Response::success()
        );
    }

    #[test]
    fn test_reminder_within_jitter_is_sent() {
        let now = Utc::now();
        assert_eq!(
            remind(&reminder("7d", now + TimeDelta::seconds(3)), now),
            Response::success()
        );
    }

    #[test]
    fn test_unknown_kind_fails() {
        let now = Utc::now();
        assert_eq!(
            remind(&reminder("1y", now), now),
            Response::failure("unknown incomplete kind \"1y\"")
        );
    }
}
