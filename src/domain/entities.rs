//! Domain entities. Pure data structures for the attendance-capture core.
//!
//! No HTTP/camera types here — adapters map into these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier binding one class to one subject (a teaching assignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassSubjectRef(pub u64);

impl fmt::Display for ClassSubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Backend id of an attendance session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Backend id of a student user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub u64);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An open attendance session adopted or created for a class/subject pair.
///
/// Never mutated after the lifecycle manager hands it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub class_subject: ClassSubjectRef,
    pub title: String,
    pub manual_allowed: bool,
    pub opened_at: DateTime<Utc>,
}

/// How marks are recorded: arrival or departure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Entry,
    Exit,
}

impl Mode {
    /// Wire form used by the attendance API.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Entry => "entry",
            Mode::Exit => "exit",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Mode::Entry => Mode::Exit,
            Mode::Exit => Mode::Entry,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "entry" => Ok(Mode::Entry),
            "exit" => Ok(Mode::Exit),
            other => Err(format!("unknown mode '{}' (expected entry or exit)", other)),
        }
    }
}

/// One student recognized in a capture burst.
///
/// `status` is passed through from the backend (e.g. "present", "manual-present").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedStudent {
    pub student_id: StudentId,
    pub name: String,
    pub mode: Mode,
    pub status: String,
}

/// Who was seen in the latest burst. Replaced wholesale per burst, never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecognitionResult(pub Vec<RecognizedStudent>);

impl RecognitionResult {
    pub fn students(&self) -> &[RecognizedStudent] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Enrolled student shown in the manual-marking list. Read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(alias = "id")]
    pub student_id: StudentId,
    pub name: String,
    #[serde(default, alias = "avatar")]
    pub avatar_ref: Option<String>,
    #[serde(default)]
    pub roll_number: Option<String>,
}

/// One camera frame as opaque base64 image data, transport framing removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedFrame(String);

impl EncodedFrame {
    /// Wrap a raw frame payload, stripping a `data:<mime>;base64,` prefix if present.
    pub fn from_payload(payload: impl Into<String>) -> Self {
        let payload = payload.into();
        match strip_data_url_prefix(&payload) {
            Some(stripped) => Self(stripped.to_string()),
            None => Self(payload),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Returns the payload after a `data:...;base64,` header, or None if there is no such header.
fn strip_data_url_prefix(payload: &str) -> Option<&str> {
    let rest = payload.strip_prefix("data:")?;
    let comma = rest.find(',')?;
    let header = &rest[..comma];
    if header.ends_with(";base64") {
        Some(&rest[comma + 1..])
    } else {
        None
    }
}

/// Backend's human-readable result of a manual mark, reported verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualMarkOutcome {
    pub student_id: StudentId,
    pub mode: Mode,
    pub message: String,
}
