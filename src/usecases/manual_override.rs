//! Manual attendance for one roster student, bypassing recognition.
//!
//! Shares no lock with the capture loop. The backend decides duplicates; we report its message.

use crate::domain::{DomainError, ManualMarkOutcome, Mode, Session, StudentId};
use crate::ports::AttendanceApi;
use std::sync::Arc;
use tracing::{info, warn};

pub struct ManualOverride {
    api: Arc<dyn AttendanceApi>,
}

impl ManualOverride {
    pub fn new(api: Arc<dyn AttendanceApi>) -> Self {
        Self { api }
    }

    pub async fn mark(
        &self,
        session: &Session,
        student_id: StudentId,
        mode: Mode,
    ) -> Result<ManualMarkOutcome, DomainError> {
        if !session.manual_allowed {
            return Err(DomainError::ManualNotAllowed(session.id));
        }

        let message = self
            .api
            .mark_manual(session.id, student_id, mode)
            .await
            .inspect_err(|e| {
                warn!(session_id = %session.id, student_id = %student_id, mode = %mode, error = %e, "manual mark failed");
            })?;

        info!(
            session_id = %session.id,
            student_id = %student_id,
            mode = %mode,
            "manual mark recorded"
        );
        Ok(ManualMarkOutcome {
            student_id,
            mode,
            message,
        })
    }
}
