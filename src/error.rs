//! Error types for the apply funnel.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Key-value storage errors.
///
/// These never leave the persistence adapter; callers see a cache miss.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to write key {key}: {reason}")]
    WriteFailed { key: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outbound delivery errors for a single sink.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Request to {sink} failed: {reason}")]
    RequestFailed { sink: String, reason: String },

    #[error("Sink {sink} responded with status {status}: {body}")]
    Status {
        sink: String,
        status: u16,
        body: String,
    },

    #[error("Sink {sink} rejected the lead: {message}")]
    Rejected { sink: String, message: String },

    #[error("Sink {sink} is not configured")]
    NotConfigured { sink: String },

    #[error("Sink {sink} did not answer within {after_ms}ms")]
    TimedOut { sink: String, after_ms: u64 },
}

/// Blocking validation failures at submit time.
///
/// The only errors that reach the UI layer as user-visible messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("A valid email address is required to continue")]
    InvalidEmail,

    #[error("Please answer at least one question")]
    NoAnswers,

    #[error("The form is not ready to submit yet")]
    Incomplete,
}
