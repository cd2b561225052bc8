//! Session lifecycle state machine.
//!
//! `NoSession -> AwaitingConfirmation -> Resolving -> SessionOpen`.
//! Transitions are pure; network calls happen in the lifecycle use case
//! between `begin_resolving` and `resolved`/`resolution_failed`.

use crate::domain::{DomainError, Session};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LifecycleState {
    #[default]
    NoSession,
    /// Operator asked to start; waiting for explicit confirmation.
    AwaitingConfirmation { manual_allowed: bool },
    /// Lookup/create in flight.
    Resolving { manual_allowed: bool },
    /// Terminal.
    SessionOpen(Session),
}

impl LifecycleState {
    /// Manual marking is pre-checked in the confirmation prompt, as in the web client.
    pub const DEFAULT_MANUAL_ALLOWED: bool = true;

    pub fn name(&self) -> &'static str {
        match self {
            LifecycleState::NoSession => "no-session",
            LifecycleState::AwaitingConfirmation { .. } => "awaiting-confirmation",
            LifecycleState::Resolving { .. } => "resolving",
            LifecycleState::SessionOpen(_) => "session-open",
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            LifecycleState::SessionOpen(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, LifecycleState::SessionOpen(_))
    }

    /// NoSession -> AwaitingConfirmation. Idempotent while already awaiting.
    pub fn request_start(&mut self) -> Result<(), DomainError> {
        match self {
            LifecycleState::NoSession => {
                *self = LifecycleState::AwaitingConfirmation {
                    manual_allowed: Self::DEFAULT_MANUAL_ALLOWED,
                };
                Ok(())
            }
            LifecycleState::AwaitingConfirmation { .. } | LifecycleState::SessionOpen(_) => Ok(()),
            LifecycleState::Resolving { .. } => Err(DomainError::ResolutionInProgress),
        }
    }

    pub fn set_manual_allowed(&mut self, allowed: bool) -> Result<(), DomainError> {
        match self {
            LifecycleState::AwaitingConfirmation { manual_allowed } => {
                *manual_allowed = allowed;
                Ok(())
            }
            other => Err(DomainError::InvalidTransition(format!(
                "manual-allowed can only be changed while awaiting confirmation (state: {})",
                other.name()
            ))),
        }
    }

    /// AwaitingConfirmation -> NoSession. No-op elsewhere except while resolving.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        match self {
            LifecycleState::AwaitingConfirmation { .. } => {
                *self = LifecycleState::NoSession;
                Ok(())
            }
            LifecycleState::NoSession | LifecycleState::SessionOpen(_) => Ok(()),
            LifecycleState::Resolving { .. } => Err(DomainError::ResolutionInProgress),
        }
    }

    /// AwaitingConfirmation -> Resolving. Returns the confirmed manual-allowed flag.
    pub fn begin_resolving(&mut self) -> Result<bool, DomainError> {
        match *self {
            LifecycleState::AwaitingConfirmation { manual_allowed } => {
                *self = LifecycleState::Resolving { manual_allowed };
                Ok(manual_allowed)
            }
            LifecycleState::Resolving { .. } => Err(DomainError::ResolutionInProgress),
            ref other => Err(DomainError::InvalidTransition(format!(
                "cannot confirm from state {}",
                other.name()
            ))),
        }
    }

    /// Resolving -> SessionOpen.
    pub fn resolved(&mut self, session: Session) -> Result<(), DomainError> {
        match self {
            LifecycleState::Resolving { .. } => {
                *self = LifecycleState::SessionOpen(session);
                Ok(())
            }
            other => Err(DomainError::InvalidTransition(format!(
                "resolution completed in state {}",
                other.name()
            ))),
        }
    }

    /// Resolving -> NoSession. Nothing from the failed attempt is kept.
    pub fn resolution_failed(&mut self) {
        if matches!(self, LifecycleState::Resolving { .. }) {
            *self = LifecycleState::NoSession;
        }
    }
}
