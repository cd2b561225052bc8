//! Wire structures for the attendance REST API.

use crate::domain::{EncodedFrame, Mode, RecognizedStudent, SessionId, StudentId};
use serde::{Deserialize, Serialize};

/// `GET /api/attendance/session/open/` response. `session_id` is null when nothing is open.
#[derive(Debug, Deserialize)]
pub struct OpenSessionResponse {
    #[serde(default)]
    pub session_id: Option<SessionId>,
    #[serde(default)]
    pub session_title: Option<String>,
    #[serde(default)]
    pub is_manual_allowed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionRequest<'a> {
    pub class_subject_id: u64,
    pub session_title: &'a str,
    pub is_manual_allowed: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionResponse {
    #[serde(default)]
    pub session_id: Option<SessionId>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Recognition batch. `images` are bare base64 strings.
#[derive(Debug, Serialize)]
pub struct RecognizeRequest<'a> {
    pub session_id: SessionId,
    pub images: &'a [EncodedFrame],
    pub mode: Mode,
}

/// `{recognized}` on success, `{error}` when the backend refuses the batch.
#[derive(Debug, Deserialize)]
pub struct RecognizeResponse {
    #[serde(default)]
    pub recognized: Option<Vec<RecognizedDto>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecognizedDto {
    pub student_id: StudentId,
    pub name: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl RecognizedDto {
    /// Falls back to the submitted mode when the backend omits or garbles it.
    pub fn into_domain(self, submitted: Mode) -> RecognizedStudent {
        RecognizedStudent {
            student_id: self.student_id,
            name: self.name,
            mode: self
                .mode
                .and_then(|m| m.parse().ok())
                .unwrap_or(submitted),
            status: self.status.unwrap_or_else(|| "present".to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ManualMarkRequest {
    pub session_id: SessionId,
    pub student_id: StudentId,
    pub mode: Mode,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Error payloads: `{"error": ...}` from the attendance views, `{"detail": ...}` from auth/permission checks.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CsrfResponse {
    #[serde(rename = "csrfToken")]
    pub csrf_token: String,
}
