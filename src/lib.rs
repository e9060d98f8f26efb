//! Event dispatch runtime for background tasks
//!
//! Services announce what happened through automated events and ask for work
//! through manual commands, both carried on NATS JetStream. This crate
//! discovers the handlers registered for each, checks their signatures
//! against the declared payload schemas, and runs them as messages arrive.
//!
//! - [`events`]: the event taxonomy and payload schemas
//! - [`registry`] and [`resolver`]: handler registration and validation
//! - [`dispatch`]: batch and single execution strategies
//! - [`bus`]: JetStream subscriptions
//! - [`bootstrap`]: process start-up, health and shutdown

pub mod bootstrap;
pub mod bus;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod events;
pub mod handler;
pub mod handlers;
pub mod health;
pub mod jetstream;
pub mod nats;
pub mod registry;
pub mod resolver;
pub mod response;
pub mod subjects;
pub mod trace_context;

// Re-export commonly used types
pub use config::Settings;
pub use dispatch::{Delivery, Dispatched, Dispatcher, Strategy};
pub use errors::{TaskError, TaskResult};
pub use events::{AutomatedEvent, Event, ManualEvent, Schema};
pub use handler::{Arguments, EntryPoint, Handler, NoArguments, Parameter};
pub use nats::{NatsClient, NatsConfig, Publisher};
pub use registry::{HandlerTree, HandlerUnit, Node};
pub use resolver::{resolve, HandlerMap, Resolution, ResolveError};
pub use response::{Disposition, Response};
