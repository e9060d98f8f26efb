// Copyright (c) 2025 - Cowboy AI, Inc.

//! Manually invoked commands
//!
//! A manual event is named after the directory and unit it was registered
//! under. It always has exactly one handler, and its payload schema is the one
//! synthesized from that handler's parameters.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::schema::Schema;
use crate::subjects::{self, Kind};

/// A point-to-point command owned by one handler
///
/// Identity is `(belongs_to, method)`; the attached schema does not take
/// part in equality, ordering or hashing.
#[derive(Debug, Clone)]
pub struct ManualEvent {
    belongs_to: String,
    method: String,
    schema: Arc<Schema>,
}

impl ManualEvent {
    pub fn new(belongs_to: impl Into<String>, method: impl Into<String>, schema: Schema) -> Self {
        Self {
            belongs_to: belongs_to.into(),
            method: method.into(),
            schema: Arc::new(schema),
        }
    }

    pub fn belongs_to(&self) -> &str {
        &self.belongs_to
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn name(&self) -> String {
        format!("{}.{}", self.belongs_to, self.method)
    }

    pub fn stream(&self) -> &str {
        &self.belongs_to
    }

    pub fn subject(&self) -> String {
        subjects::subject(&self.belongs_to, Kind::Manual, &self.method)
    }

    pub fn input_validator(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    fn key(&self) -> (&str, &str) {
        (&self.belongs_to, &self.method)
    }
}

impl PartialEq for ManualEvent {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ManualEvent {}

impl Hash for ManualEvent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for ManualEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ManualEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for ManualEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.belongs_to, self.method)
    }
}
