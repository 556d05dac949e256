use thiserror::Error;

use crate::latency::Cancelled;

/// Errors raised by the key-value collaborator and the identity store on top of it.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(String),
    #[error("Corrupt session data: {0}")]
    CorruptSessionData(String),
    #[error("Session encode error: {0}")]
    Encode(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

/// Errors that can occur during session operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("No active session")]
    NoActiveSession,
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Session store error: {0}")]
    Store(#[from] StoreError),
    #[error("Operation cancelled before completion")]
    Cancelled,
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

/// Errors that can occur while creating or transitioning service requests.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RegistryError {
    #[error("Invalid transition: cannot {event} request {id} while {status}")]
    InvalidTransition {
        id: String,
        status: String,
        event: String,
    },
    #[error("Service request not found: {0}")]
    NotFound(String),
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Operation cancelled before completion")]
    Cancelled,
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<Cancelled> for SessionError {
    fn from(_: Cancelled) -> Self {
        SessionError::Cancelled
    }
}

impl From<Cancelled> for RegistryError {
    fn from(_: Cancelled) -> Self {
        RegistryError::Cancelled
    }
}
