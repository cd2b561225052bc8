//! Implements RosterSource using a JSON file.
//!
//! The file holds the enrolled students of the class/subject assignment, as the
//! host page would pass them in: `[{"id": 9, "name": "...", "avatar": "..."}]`.
//! `student_id`/`avatar_ref` are accepted as field names too.

use crate::domain::{DomainError, RosterEntry};
use crate::ports::RosterSource;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Either a bare array or `{"students": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RosterFile {
    List(Vec<RosterEntry>),
    Wrapped { students: Vec<RosterEntry> },
}

/// JSON file-based roster.
pub struct RosterJson {
    path: PathBuf,
}

impl RosterJson {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl RosterSource for RosterJson {
    async fn load_roster(&self) -> Result<Vec<RosterEntry>, DomainError> {
        let raw = fs::read_to_string(&self.path)
            .await
            .map_err(|e| DomainError::Roster(format!("read {}: {}", self.path.display(), e)))?;
        let file: RosterFile = serde_json::from_str(&raw)
            .map_err(|e| DomainError::Roster(format!("parse {}: {}", self.path.display(), e)))?;
        let students = match file {
            RosterFile::List(s) | RosterFile::Wrapped { students: s } => s,
        };
        info!(path = %self.path.display(), students = students.len(), "roster loaded");
        Ok(students)
    }
}

/// No roster configured; the manual list shows "No students found."
pub struct EmptyRoster;

#[async_trait::async_trait]
impl RosterSource for EmptyRoster {
    async fn load_roster(&self) -> Result<Vec<RosterEntry>, DomainError> {
        Ok(Vec::new())
    }
}
