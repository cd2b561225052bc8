//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use crate::domain::SessionId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Session lookup failed: {0}")]
    SessionLookup(String),

    #[error("Session creation failed: {0}")]
    SessionCreate(String),

    #[error("Camera error: {0}")]
    Camera(String),

    #[error("Recognition failed: {0}")]
    Recognition(String),

    #[error("Manual attendance failed: {0}")]
    ManualMark(String),

    #[error("Credentials unavailable: {0}")]
    Credentials(String),

    #[error("Roster unavailable: {0}")]
    Roster(String),

    #[error("Terminal UI error: {0}")]
    Ui(String),

    #[error("No attendance session is open")]
    NoOpenSession,

    #[error("A capture is already in progress")]
    CaptureInProgress,

    #[error("Session resolution is already in progress")]
    ResolutionInProgress,

    #[error("Manual attendance is not allowed for session {0}")]
    ManualNotAllowed(SessionId),

    /// Operation not legal in the current lifecycle state.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Error category, used by the UI to phrase the retry hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Lookup/create failed; retry "Start Session".
    Resolution,
    /// Camera or recognition failed; retry capture.
    Capture,
    /// One manual mark failed.
    ManualMark,
    /// Operation invoked in the wrong state.
    Precondition,
    /// Credentials, roster or terminal unavailable.
    Configuration,
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::SessionLookup(_) | DomainError::SessionCreate(_) => ErrorKind::Resolution,
            DomainError::Camera(_) | DomainError::Recognition(_) => ErrorKind::Capture,
            DomainError::ManualMark(_) => ErrorKind::ManualMark,
            DomainError::Credentials(_) | DomainError::Roster(_) | DomainError::Ui(_) => {
                ErrorKind::Configuration
            }
            DomainError::NoOpenSession
            | DomainError::CaptureInProgress
            | DomainError::ResolutionInProgress
            | DomainError::ManualNotAllowed(_)
            | DomainError::InvalidTransition(_) => ErrorKind::Precondition,
        }
    }
}
