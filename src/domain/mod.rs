//! Core domain layer. No external I/O dependencies.
//!
//! Entities, the lifecycle state machine and errors live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod lifecycle;

pub use entities::{
    ClassSubjectRef, EncodedFrame, ManualMarkOutcome, Mode, RecognitionResult, RecognizedStudent,
    RosterEntry, Session, SessionId, StudentId,
};
pub use errors::{DomainError, ErrorKind};
pub use lifecycle::LifecycleState;
