//! Session coordinator. Single entry point for the host UI.
//!
//! Composes lifecycle, capture loop, manual override and mode switch. Shared as
//! `Arc<SessionCoordinator>` so manual marks can run while a burst is in flight.

use crate::domain::{
    ClassSubjectRef, DomainError, LifecycleState, ManualMarkOutcome, Mode, RecognitionResult,
    RosterEntry, Session, StudentId,
};
use crate::ports::{AttendanceApi, Clock, FrameSource};
use crate::usecases::capture_loop::{BurstSettings, CaptureLoop};
use crate::usecases::manual_override::ManualOverride;
use crate::usecases::mode_switch::ModeSwitch;
use crate::usecases::session_lifecycle::SessionLifecycle;
use std::sync::Arc;

/// Which class/subject this coordinator targets and how bursts are taken.
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub class_subject: ClassSubjectRef,
    pub session_title: String,
    pub burst: BurstSettings,
}

/// Snapshot of everything the host renders.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorView {
    pub state: LifecycleState,
    pub mode: Mode,
    pub capturing: bool,
    pub manual_enabled: bool,
    pub recognized: RecognitionResult,
    pub roster: Vec<RosterEntry>,
}

pub struct SessionCoordinator {
    lifecycle: SessionLifecycle,
    capture: CaptureLoop,
    manual: ManualOverride,
    mode: ModeSwitch,
    roster: Vec<RosterEntry>,
}

impl SessionCoordinator {
    pub fn new(
        api: Arc<dyn AttendanceApi>,
        frames: Arc<dyn FrameSource>,
        clock: Arc<dyn Clock>,
        settings: CoordinatorSettings,
        roster: Vec<RosterEntry>,
    ) -> Self {
        Self {
            lifecycle: SessionLifecycle::new(
                Arc::clone(&api),
                settings.class_subject,
                settings.session_title,
            ),
            capture: CaptureLoop::new(Arc::clone(&api), frames, clock, settings.burst),
            manual: ManualOverride::new(api),
            mode: ModeSwitch::default(),
            roster,
        }
    }

    // --- Lifecycle ---

    pub async fn request_start(&self) -> Result<(), DomainError> {
        self.lifecycle.request_start().await
    }

    pub async fn set_manual_allowed(&self, allowed: bool) -> Result<(), DomainError> {
        self.lifecycle.set_manual_allowed(allowed).await
    }

    pub async fn cancel_start(&self) -> Result<(), DomainError> {
        self.lifecycle.cancel_start().await
    }

    pub async fn confirm_start(&self) -> Result<Session, DomainError> {
        self.lifecycle.confirm_start().await
    }

    /// Request + confirm with the given manual flag. Returns the known session if already open.
    pub async fn start_session(&self, manual_allowed: bool) -> Result<Session, DomainError> {
        self.lifecycle.start(manual_allowed).await
    }

    pub async fn state(&self) -> LifecycleState {
        self.lifecycle.state().await
    }

    pub async fn session(&self) -> Option<Session> {
        self.lifecycle.session().await
    }

    async fn open_session(&self) -> Result<Session, DomainError> {
        self.lifecycle
            .session()
            .await
            .ok_or(DomainError::NoOpenSession)
    }

    // --- Mode ---

    pub async fn mode(&self) -> Mode {
        self.mode.current().await
    }

    pub async fn set_mode(&self, mode: Mode) -> Result<(), DomainError> {
        self.open_session().await?;
        self.mode.set(mode).await;
        Ok(())
    }

    pub async fn toggle_mode(&self) -> Result<Mode, DomainError> {
        self.open_session().await?;
        Ok(self.mode.toggle().await)
    }

    // --- Capture ---

    /// Capture one burst in the current mode. The mode is read once, here.
    pub async fn capture_and_recognize(&self) -> Result<RecognitionResult, DomainError> {
        let session = self.open_session().await?;
        let mode = self.mode.current().await;
        self.capture.capture_and_recognize(session.id, mode).await
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_capturing()
    }

    pub fn burst_settings(&self) -> BurstSettings {
        self.capture.settings()
    }

    pub async fn latest_result(&self) -> RecognitionResult {
        self.capture.latest().await
    }

    // --- Manual ---

    pub async fn mark_manual(
        &self,
        student_id: StudentId,
        mode: Mode,
    ) -> Result<ManualMarkOutcome, DomainError> {
        let session = self.open_session().await?;
        self.manual.mark(&session, student_id, mode).await
    }

    /// True once a session is open that allows manual marking.
    pub async fn manual_marking_enabled(&self) -> bool {
        self.lifecycle
            .session()
            .await
            .is_some_and(|s| s.manual_allowed)
    }

    // --- View ---

    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    pub async fn view(&self) -> CoordinatorView {
        let state = self.lifecycle.state().await;
        let manual_enabled = state.session().is_some_and(|s| s.manual_allowed);
        CoordinatorView {
            state,
            mode: self.mode.current().await,
            capturing: self.capture.is_capturing(),
            manual_enabled,
            recognized: self.capture.latest().await,
            roster: self.roster.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RecognizedStudent, SessionId};
    use crate::usecases::test_support::{FakeApi, GatedClock, RecordingClock, ScriptedFrames};

    fn settings() -> CoordinatorSettings {
        CoordinatorSettings {
            class_subject: ClassSubjectRef(42),
            session_title: "Physics - Period 3".to_string(),
            burst: BurstSettings::default(),
        }
    }

    fn roster() -> Vec<RosterEntry> {
        vec![
            RosterEntry {
                student_id: StudentId(3),
                name: "A".to_string(),
                avatar_ref: None,
                roll_number: Some("01".to_string()),
            },
            RosterEntry {
                student_id: StudentId(9),
                name: "B".to_string(),
                avatar_ref: Some("avatars/9.png".to_string()),
                roll_number: Some("02".to_string()),
            },
        ]
    }

    fn coordinator(api: &Arc<FakeApi>, clock: Arc<dyn Clock>) -> SessionCoordinator {
        SessionCoordinator::new(
            api.clone(),
            Arc::new(ScriptedFrames::endless()),
            clock,
            settings(),
            roster(),
        )
    }

    fn entry_present(id: u64, name: &str) -> RecognizedStudent {
        RecognizedStudent {
            student_id: StudentId(id),
            name: name.to_string(),
            mode: Mode::Entry,
            status: "present".to_string(),
        }
    }

    #[tokio::test]
    async fn test_scenario_create_then_capture() {
        let api = Arc::new(FakeApi::with_next_session_id(7));
        api.push_recognition(Ok(RecognitionResult(vec![entry_present(3, "A")])));
        let c = coordinator(&api, Arc::new(RecordingClock::default()));

        assert_eq!(c.state().await, LifecycleState::NoSession);
        c.request_start().await.unwrap();
        assert_eq!(
            c.state().await,
            LifecycleState::AwaitingConfirmation {
                manual_allowed: true
            }
        );
        let session = c.confirm_start().await.unwrap();
        assert_eq!(session.id, SessionId(7));
        assert_eq!(api.creates().len(), 1);

        let result = c.capture_and_recognize().await.unwrap();

        let calls = api.recognize_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, SessionId(7));
        assert_eq!(calls[0].1.len(), 5);
        assert_eq!(calls[0].2, Mode::Entry);
        assert_eq!(result, RecognitionResult(vec![entry_present(3, "A")]));
        assert_eq!(c.latest_result().await, result);
    }

    #[tokio::test]
    async fn test_operations_require_open_session() {
        let api = Arc::new(FakeApi::default());
        let c = coordinator(&api, Arc::new(RecordingClock::default()));

        assert_eq!(
            c.capture_and_recognize().await,
            Err(DomainError::NoOpenSession)
        );
        assert_eq!(
            c.mark_manual(StudentId(9), Mode::Entry).await,
            Err(DomainError::NoOpenSession)
        );
        assert_eq!(c.set_mode(Mode::Exit).await, Err(DomainError::NoOpenSession));
        assert_eq!(c.mode().await, Mode::Entry);
        assert!(api.recognize_calls().is_empty());
        assert!(api.manual_calls().is_empty());
    }

    #[tokio::test]
    async fn test_mode_switch_keeps_session() {
        let api = Arc::new(FakeApi::with_next_session_id(7));
        let c = coordinator(&api, Arc::new(RecordingClock::default()));
        let session = c.start_session(true).await.unwrap();

        c.set_mode(Mode::Exit).await.unwrap();
        assert_eq!(c.toggle_mode().await.unwrap(), Mode::Entry);
        c.set_mode(Mode::Exit).await.unwrap();

        assert_eq!(c.session().await, Some(session));
        c.capture_and_recognize().await.unwrap();
        assert_eq!(api.recognize_calls()[0].2, Mode::Exit);
    }

    #[tokio::test]
    async fn test_in_flight_capture_is_exclusive_and_snapshots_mode() {
        let api = Arc::new(FakeApi::with_next_session_id(7));
        let clock = Arc::new(GatedClock::default());
        let c = Arc::new(coordinator(&api, clock.clone()));
        c.start_session(true).await.unwrap();
        assert!(!c.is_capturing());

        let in_flight = {
            let c = Arc::clone(&c);
            tokio::spawn(async move { c.capture_and_recognize().await })
        };
        clock.entered.notified().await;

        assert!(c.is_capturing());
        assert_eq!(
            c.capture_and_recognize().await,
            Err(DomainError::CaptureInProgress)
        );
        c.set_mode(Mode::Exit).await.unwrap();

        // Manual mark resolves while the burst is still waiting.
        let outcome = c.mark_manual(StudentId(9), Mode::Exit).await.unwrap();
        assert_eq!(outcome.student_id, StudentId(9));
        assert_eq!(
            api.manual_calls(),
            vec![(SessionId(7), StudentId(9), Mode::Exit)]
        );
        assert!(api.recognize_calls().is_empty());

        clock.release_all();
        in_flight.await.unwrap().unwrap();

        let calls = api.recognize_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.len(), 5);
        assert_eq!(calls[0].2, Mode::Entry);
        assert!(!c.is_capturing());
        assert_eq!(c.mode().await, Mode::Exit);
    }

    #[tokio::test]
    async fn test_capture_runs_while_manual_marks_in_flight() {
        let api = Arc::new(FakeApi::with_next_session_id(7));
        let c = Arc::new(coordinator(&api, Arc::new(RecordingClock::default())));
        c.start_session(true).await.unwrap();

        let gate = api.hold_manual_marks();
        let marks: Vec<_> = [3u64, 9]
            .into_iter()
            .map(|id| {
                let c = Arc::clone(&c);
                tokio::spawn(async move { c.mark_manual(StudentId(id), Mode::Entry).await })
            })
            .collect();
        tokio::task::yield_now().await;

        c.capture_and_recognize().await.unwrap();
        assert_eq!(api.recognize_calls().len(), 1);

        gate.add_permits(2);
        for mark in marks {
            assert!(mark.await.unwrap().is_ok());
        }
        assert_eq!(api.manual_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_manual_disabled_session() {
        let api = Arc::new(FakeApi::with_next_session_id(7));
        let c = coordinator(&api, Arc::new(RecordingClock::default()));
        c.start_session(false).await.unwrap();

        assert!(!c.manual_marking_enabled().await);
        assert_eq!(
            c.mark_manual(StudentId(9), Mode::Entry).await,
            Err(DomainError::ManualNotAllowed(SessionId(7)))
        );
        assert!(api.manual_calls().is_empty());
    }

    #[tokio::test]
    async fn test_manual_failure_leaves_state_alone() {
        let api = Arc::new(FakeApi::with_next_session_id(7));
        api.fail_manual("Attendance already marked");
        let c = coordinator(&api, Arc::new(RecordingClock::default()));
        c.start_session(true).await.unwrap();
        c.set_mode(Mode::Exit).await.unwrap();
        let before = c.view().await;

        let err = c.mark_manual(StudentId(9), Mode::Exit).await.unwrap_err();

        assert_eq!(err.kind(), crate::domain::ErrorKind::ManualMark);
        assert_eq!(c.view().await, before);
    }

    #[tokio::test]
    async fn test_view_reflects_state() {
        let api = Arc::new(FakeApi::with_next_session_id(7));
        let c = coordinator(&api, Arc::new(RecordingClock::default()));

        let view = c.view().await;
        assert_eq!(view.state, LifecycleState::NoSession);
        assert!(!view.manual_enabled);
        assert!(!view.capturing);
        assert_eq!(view.roster.len(), 2);

        c.start_session(true).await.unwrap();
        let view = c.view().await;
        assert!(view.state.is_open());
        assert!(view.manual_enabled);
        assert!(view.recognized.is_empty());
        assert_eq!(view.mode, Mode::Entry);
    }
}
