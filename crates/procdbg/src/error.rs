//! Error types for execution control, variable fetches and configuration.

use thiserror::Error;

use crate::thread::ExecutionState;

/// Failure reported by the transport that talks to the database-side debugger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Execution-control action that could not be carried out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    /// The action is not allowed in the current execution state.
    #[error("cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: ExecutionState,
    },

    /// The debugger rejected or failed to deliver the command.
    #[error("{action} failed: {source}")]
    Backend {
        action: &'static str,
        #[source]
        source: BackendError,
    },
}

/// Failure to produce a variable snapshot for the suspended frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Variables are only available while the thread is suspended.
    #[error("variables requested while {0}")]
    NotSuspended(ExecutionState),

    /// The debug session has been terminated.
    #[error("debug session terminated")]
    Terminated,

    /// Communication with the debugger failed.
    #[error("variable fetch failed: {0}")]
    Backend(#[from] BackendError),
}

/// Invalid or unreadable session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid config: {0}")]
pub struct ConfigError(pub String);
