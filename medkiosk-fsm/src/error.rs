//! Core error types.

use thiserror::Error;

/// Configuration errors raised while wiring up a state machine.
///
/// All of these are setup-time faults: they surface from the `add_*`
/// registration calls, never from the run loop.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("engine already started: cannot {operation}")]
    AlreadyStarted { operation: &'static str },

    #[error("duplicate transition from '{state}' on event '{event}'")]
    DuplicateTransition { state: String, event: String },

    #[error("event source already registered: '{event}'")]
    DuplicateEventSource { event: String },

    #[error("unknown event '{event}': register a button, timer or custom event first")]
    UnknownEvent { event: String },

    #[error("transition from '{state}' has no trigger events")]
    EmptyTriggers { state: String },

    #[error("event name must not be empty")]
    EmptyEventName,
}

impl CoreError {
    /// Returns an error code suitable for logs and diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::AlreadyStarted { .. } => "ALREADY_STARTED",
            CoreError::DuplicateTransition { .. } => "DUPLICATE_TRANSITION",
            CoreError::DuplicateEventSource { .. } => "DUPLICATE_EVENT_SOURCE",
            CoreError::UnknownEvent { .. } => "UNKNOWN_EVENT",
            CoreError::EmptyTriggers { .. } => "EMPTY_TRIGGERS",
            CoreError::EmptyEventName => "EMPTY_EVENT_NAME",
        }
    }
}
