//! Session lifecycle: confirm intent, then adopt an open session or create one.
//!
//! - Looks up an open session for the class/subject first (no duplicate sessions on reload)
//! - Creates only when the lookup finds none
//! - On any failure drops back to `NoSession`; nothing half-resolved is kept
//! - Once open, never calls the API again

use crate::domain::{ClassSubjectRef, DomainError, LifecycleState, Session};
use crate::ports::AttendanceApi;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Lifecycle manager for one class/subject. A new instance is needed to target another pair.
pub struct SessionLifecycle {
    api: Arc<dyn AttendanceApi>,
    class_subject: ClassSubjectRef,
    title: String,
    state: RwLock<LifecycleState>,
}

impl SessionLifecycle {
    pub fn new(
        api: Arc<dyn AttendanceApi>,
        class_subject: ClassSubjectRef,
        title: impl Into<String>,
    ) -> Self {
        Self {
            api,
            class_subject,
            title: title.into(),
            state: RwLock::new(LifecycleState::NoSession),
        }
    }

    pub fn class_subject(&self) -> ClassSubjectRef {
        self.class_subject
    }

    pub async fn state(&self) -> LifecycleState {
        self.state.read().await.clone()
    }

    pub async fn session(&self) -> Option<Session> {
        self.state.read().await.session().cloned()
    }

    /// Operator pressed "Start Session". No network call.
    pub async fn request_start(&self) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        state.request_start()?;
        info!(class_subject_id = %self.class_subject, state = state.name(), "session start requested");
        Ok(())
    }

    pub async fn set_manual_allowed(&self, allowed: bool) -> Result<(), DomainError> {
        self.state.write().await.set_manual_allowed(allowed)
    }

    pub async fn cancel_start(&self) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        state.cancel()?;
        info!(class_subject_id = %self.class_subject, "session start cancelled");
        Ok(())
    }

    /// Operator confirmed. Resolves the session; returns the known one if already open.
    pub async fn confirm_start(&self) -> Result<Session, DomainError> {
        let manual_allowed = {
            let mut state = self.state.write().await;
            if let Some(session) = state.session() {
                return Ok(session.clone());
            }
            state.begin_resolving()?
        };

        match self.resolve_or_create(manual_allowed).await {
            Ok(session) => {
                self.state.write().await.resolved(session.clone())?;
                info!(
                    class_subject_id = %self.class_subject,
                    session_id = %session.id,
                    manual_allowed = session.manual_allowed,
                    "attendance session open"
                );
                Ok(session)
            }
            Err(e) => {
                self.state.write().await.resolution_failed();
                warn!(class_subject_id = %self.class_subject, error = %e, "session resolution failed");
                Err(e)
            }
        }
    }

    /// Request, set the manual flag, and confirm in one go.
    pub async fn start(&self, manual_allowed: bool) -> Result<Session, DomainError> {
        if let Some(session) = self.session().await {
            return Ok(session);
        }
        self.request_start().await?;
        self.set_manual_allowed(manual_allowed).await?;
        self.confirm_start().await
    }

    /// Adopt the open session for this class/subject, or create one. Does not touch state.
    pub async fn resolve_or_create(&self, manual_allowed: bool) -> Result<Session, DomainError> {
        if let Some(open) = self.api.find_open_session(self.class_subject).await? {
            info!(
                class_subject_id = %self.class_subject,
                session_id = %open.id,
                "adopting already-open session"
            );
            return Ok(Session {
                id: open.id,
                class_subject: self.class_subject,
                title: open.title.unwrap_or_else(|| self.title.clone()),
                manual_allowed: open.manual_allowed.unwrap_or(manual_allowed),
                opened_at: Utc::now(),
            });
        }

        let id = self
            .api
            .create_session(self.class_subject, &self.title, manual_allowed)
            .await?;
        info!(class_subject_id = %self.class_subject, session_id = %id, "created session");
        Ok(Session {
            id,
            class_subject: self.class_subject,
            title: self.title.clone(),
            manual_allowed,
            opened_at: Utc::now(),
        })
    }
}
