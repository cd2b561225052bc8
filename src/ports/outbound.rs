//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{
    ClassSubjectRef, DomainError, EncodedFrame, Mode, RecognitionResult, RosterEntry, SessionId,
    StudentId,
};
use std::time::Duration;

/// An already-open session as reported by the lookup endpoint.
///
/// The backend may omit title and manual flag; the lifecycle falls back to
/// the operator's confirmed choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenSessionInfo {
    pub id: SessionId,
    pub title: Option<String>,
    pub manual_allowed: Option<bool>,
}

/// Attendance REST API: session lookup/create, recognition, manual marks.
#[async_trait::async_trait]
pub trait AttendanceApi: Send + Sync {
    /// Find the open session for a class/subject. `Ok(None)` when there is none.
    async fn find_open_session(
        &self,
        class_subject: ClassSubjectRef,
    ) -> Result<Option<OpenSessionInfo>, DomainError>;

    /// Create a new session and return its id.
    async fn create_session(
        &self,
        class_subject: ClassSubjectRef,
        title: &str,
        manual_allowed: bool,
    ) -> Result<SessionId, DomainError>;

    /// Submit one burst of frames for recognition.
    async fn recognize(
        &self,
        session_id: SessionId,
        frames: &[EncodedFrame],
        mode: Mode,
    ) -> Result<RecognitionResult, DomainError>;

    /// Record attendance for one student directly. Returns the backend's message.
    async fn mark_manual(
        &self,
        session_id: SessionId,
        student_id: StudentId,
        mode: Mode,
    ) -> Result<String, DomainError>;
}

/// Live camera. Each call yields one still frame.
///
/// The payload may carry a `data:` URL header; the capture loop strips it.
#[async_trait::async_trait]
pub trait FrameSource: Send + Sync {
    async fn grab_frame(&self) -> Result<String, DomainError>;
}

/// Timer used between burst frames. Swapped for a fake in tests.
#[async_trait::async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Anti-forgery token and cookie header attached to every API request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub csrf_token: Option<String>,
    pub cookie: Option<String>,
}

/// Supplies request credentials. Opaque transport concern for the core.
#[async_trait::async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn credentials(&self) -> Result<Credentials, DomainError>;

    /// Drop any cached credentials; the backend rejected them (403).
    async fn invalidate(&self) {}
}

/// Enrolled students for the class/subject assignment.
#[async_trait::async_trait]
pub trait RosterSource: Send + Sync {
    async fn load_roster(&self) -> Result<Vec<RosterEntry>, DomainError>;
}
