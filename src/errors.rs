//! Error types for bus and runtime operations

use thiserror::Error;

/// Errors that can occur while talking to the message bus or running the process
#[derive(Debug, Error)]
pub enum TaskError {
    /// NATS connection error
    #[error("NATS connection error: {0}")]
    NatsConnection(String),

    /// Stream lookup or creation error
    #[error("JetStream stream error: {0}")]
    Stream(String),

    /// Consumer creation or subscription error
    #[error("NATS subscribe error: {0}")]
    Subscribe(String),

    /// NATS publish error
    #[error("NATS publish error: {0}")]
    Publish(String),

    /// Settling a delivered message failed
    #[error("Acknowledgment error: {0}")]
    Acknowledge(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Health endpoint I/O error
    #[error("Health endpoint error: {0}")]
    Health(#[from] std::io::Error),
}

/// Result type for bus and runtime operations
pub type TaskResult<T> = Result<T, TaskError>;

impl From<async_nats::Error> for TaskError {
    fn from(err: async_nats::Error) -> Self {
        TaskError::NatsConnection(err.to_string())
    }
}

impl From<serde_json::Error> for TaskError {
    fn from(err: serde_json::Error) -> Self {
        TaskError::Serialization(err.to_string())
    }
}
