//! Error types shared by the solver, the session and the command channel
//!
//! Logic failure is never an error: a goal that fails yields `false` or
//! `None`. The enums here describe conditions that abort an operation. All of
//! them serialize, because errors raised inside a worker travel back to the
//! host inside a response and must arrive as the identical value.

use crate::diagnostic::Diagnostic;
use crate::foreign::CapabilityError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a running solve
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SolveError {
    /// A host procedure reported an error or panicked
    #[error("Host procedure `{name}` failed: {message}")]
    HostProcedure { name: String, message: String },

    /// A host procedure used its capabilities illegally
    #[error("Host procedure `{name}` violated its capabilities: {error}")]
    CapabilityViolation { name: String, error: CapabilityError },

    #[error("Expected a number, got `{term}`")]
    NotANumber { term: String },

    #[error("Insufficiently instantiated variable `{term}`")]
    InsufficientlyInstantiated { term: String },

    #[error("Unsupported operation `{term}`")]
    UnsupportedOperation { term: String },

    #[error("Division by zero in `{term}`")]
    DivisionByZero { term: String },

    #[error("Goal `{term}` is not callable")]
    NotCallable { term: String },
}

/// Commands issued in a state that does not accept them
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleError {
    #[error("Solver is not initialized")]
    NotInitialized,

    #[error("Solver is already initialized")]
    AlreadyInitialized,

    #[error("No active query")]
    NoActiveQuery,
}

/// Failures of the correlation protocol between host and worker
///
/// Raised on the host side only; a worker never sends one.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ProtocolError {
    /// A response carried an id with no pending command
    #[error("Received a response for unknown command id {0}")]
    UnknownResponseId(u64),

    /// The channel lost correlation earlier and rejects every command
    #[error("Command channel is desynchronized")]
    Desynchronized,

    /// The worker went away before answering
    #[error("Worker disconnected")]
    Disconnected,

    /// A response payload could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A request payload was missing or could not be decoded
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// The worker thread could not be started
    #[error("Failed to start worker: {0}")]
    WorkerSpawn(String),
}

/// The single error type of every session and channel operation
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SessionError {
    #[error("{0}")]
    Load(#[from] Diagnostic),

    #[error("{0}")]
    Solve(#[from] SolveError),

    #[error("{0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("{0}")]
    Protocol(#[from] ProtocolError),
}

impl SessionError {
    /// True when the channel can no longer be used
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SessionError::Protocol(
                ProtocolError::UnknownResponseId(_)
                    | ProtocolError::Desynchronized
                    | ProtocolError::Disconnected
                    | ProtocolError::WorkerSpawn(_)
            )
        )
    }
}
