// Copyright (c) 2025 - Cowboy AI, Inc.

//! Outcomes a manual handler may return to control acknowledgment

use std::fmt;
use std::time::Duration;

/// Coarse status of a [`Response`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    TransientFailure,
    Failure,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => write!(f, "success"),
            Status::TransientFailure => write!(f, "transient_failure"),
            Status::Failure => write!(f, "failure"),
        }
    }
}

/// Result of a manual handler
///
/// Constructed per message and consumed by the dispatcher straight after the
/// handler returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Processed. With a delay, the message is redelivered once it elapses.
    Success { delay: Option<Duration> },
    /// Recoverable failure, the message is redelivered
    TransientFailure {
        reason: String,
        retry_after: Option<Duration>,
    },
    /// Fatal failure, the message is discarded
    Failure { reason: String },
}

impl Response {
    pub fn success() -> Self {
        Response::Success { delay: None }
    }

    /// Run the command again once `duration` has passed
    pub fn delay_for(duration: Duration) -> Self {
        Response::Success {
            delay: Some(duration),
        }
    }

    pub fn transient_failure(reason: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Response::TransientFailure {
            reason: reason.into(),
            retry_after,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Response::Failure {
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Response::Success { .. } => Status::Success,
            Response::TransientFailure { .. } => Status::TransientFailure,
            Response::Failure { .. } => Status::Failure,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Response::Success { .. } => None,
            Response::TransientFailure { reason, .. } | Response::Failure { reason } => {
                Some(reason)
            }
        }
    }

    /// How the delivered message must be settled
    pub fn disposition(&self) -> Disposition {
        match self {
            Response::Success { delay: None } => Disposition::Acknowledge,
            Response::Success { delay } => Disposition::Release { delay: *delay },
            Response::TransientFailure { retry_after, .. } => Disposition::Release {
                delay: *retry_after,
            },
            Response::Failure { .. } => Disposition::Terminate,
        }
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::success()
    }
}

/// What the consumer signals to the bus for a delivered message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Processed, remove it
    Acknowledge,
    /// Redeliver, optionally not before `delay`
    Release { delay: Option<Duration> },
    /// Discard without redelivery
    Terminate,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::Acknowledge => write!(f, "ack"),
            Disposition::Release { delay: None } => write!(f, "nak"),
            Disposition::Release { delay: Some(delay) } => write!(f, "nak({:?})", delay),
            Disposition::Terminate => write!(f, "term"),
        }
    }
}
