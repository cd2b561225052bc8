//! In-memory port fakes shared by the use case tests.

use crate::domain::{
    ClassSubjectRef, DomainError, EncodedFrame, Mode, RecognitionResult, SessionId, StudentId,
};
use crate::ports::{AttendanceApi, Clock, FrameSource, OpenSessionInfo};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};

type RecognizeCall = (SessionId, Vec<EncodedFrame>, Mode);
type CreateCall = (ClassSubjectRef, String, bool);
type ManualCall = (SessionId, StudentId, Mode);

/// Attendance API fake. Remembers created sessions like the backend does.
#[derive(Default)]
pub struct FakeApi {
    next_session_id: u64,
    open_session: Mutex<Option<OpenSessionInfo>>,
    lookup_error: Mutex<Option<String>>,
    create_error: Mutex<Option<String>>,
    manual_error: Mutex<Option<String>>,
    recognitions: Mutex<VecDeque<Result<RecognitionResult, DomainError>>>,
    manual_gate: Mutex<Option<Arc<Semaphore>>>,
    lookups: AtomicUsize,
    creates: Mutex<Vec<CreateCall>>,
    recognize_calls: Mutex<Vec<RecognizeCall>>,
    manual_calls: Mutex<Vec<ManualCall>>,
}

impl FakeApi {
    pub fn with_next_session_id(id: u64) -> Self {
        Self {
            next_session_id: id,
            ..Self::default()
        }
    }

    pub fn set_open_session(&self, info: Option<OpenSessionInfo>) {
        *self.open_session.lock().unwrap() = info;
    }

    pub fn fail_lookup(&self, message: &str) {
        *self.lookup_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_create(&self, message: &str) {
        *self.create_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn clear_create_failure(&self) {
        *self.create_error.lock().unwrap() = None;
    }

    pub fn fail_manual(&self, message: &str) {
        *self.manual_error.lock().unwrap() = Some(message.to_string());
    }

    /// Queue the response for the next recognize call. Empty result when the queue runs dry.
    pub fn push_recognition(&self, response: Result<RecognitionResult, DomainError>) {
        self.recognitions.lock().unwrap().push_back(response);
    }

    /// Manual marks block until a permit is added to the returned semaphore.
    pub fn hold_manual_marks(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.manual_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> Vec<CreateCall> {
        self.creates.lock().unwrap().clone()
    }

    pub fn recognize_calls(&self) -> Vec<RecognizeCall> {
        self.recognize_calls.lock().unwrap().clone()
    }

    pub fn manual_calls(&self) -> Vec<ManualCall> {
        self.manual_calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AttendanceApi for FakeApi {
    async fn find_open_session(
        &self,
        _class_subject: ClassSubjectRef,
    ) -> Result<Option<OpenSessionInfo>, DomainError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.lookup_error.lock().unwrap().clone() {
            return Err(DomainError::SessionLookup(message));
        }
        Ok(self.open_session.lock().unwrap().clone())
    }

    async fn create_session(
        &self,
        class_subject: ClassSubjectRef,
        title: &str,
        manual_allowed: bool,
    ) -> Result<SessionId, DomainError> {
        if let Some(message) = self.create_error.lock().unwrap().clone() {
            return Err(DomainError::SessionCreate(message));
        }
        self.creates
            .lock()
            .unwrap()
            .push((class_subject, title.to_string(), manual_allowed));
        let id = SessionId(self.next_session_id);
        self.set_open_session(Some(OpenSessionInfo {
            id,
            title: Some(title.to_string()),
            manual_allowed: Some(manual_allowed),
        }));
        Ok(id)
    }

    async fn recognize(
        &self,
        session_id: SessionId,
        frames: &[EncodedFrame],
        mode: Mode,
    ) -> Result<RecognitionResult, DomainError> {
        self.recognize_calls
            .lock()
            .unwrap()
            .push((session_id, frames.to_vec(), mode));
        self.recognitions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(RecognitionResult::default()))
    }

    async fn mark_manual(
        &self,
        session_id: SessionId,
        student_id: StudentId,
        mode: Mode,
    ) -> Result<String, DomainError> {
        self.manual_calls
            .lock()
            .unwrap()
            .push((session_id, student_id, mode));
        let gate = self.manual_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
        if let Some(message) = self.manual_error.lock().unwrap().clone() {
            return Err(DomainError::ManualMark(message));
        }
        Ok(format!("Manual {} marked for student {}", mode, student_id))
    }
}

/// Frame source yielding `data:` URLs of "frame1", "frame2", ...
pub struct ScriptedFrames {
    grabbed: AtomicUsize,
    fail_at: Mutex<Option<usize>>,
    blank: bool,
}

impl ScriptedFrames {
    pub fn endless() -> Self {
        Self {
            grabbed: AtomicUsize::new(0),
            fail_at: Mutex::new(None),
            blank: false,
        }
    }

    /// The `n`th grab (1-based) fails with a camera error.
    pub fn failing_at(n: usize) -> Self {
        let frames = Self::endless();
        *frames.fail_at.lock().unwrap() = Some(n);
        frames
    }

    /// Every grab returns an empty payload, like a camera that is not ready.
    pub fn blank() -> Self {
        Self {
            blank: true,
            ..Self::endless()
        }
    }

    pub fn heal(&self) {
        *self.fail_at.lock().unwrap() = None;
    }

    pub fn grabbed(&self) -> usize {
        self.grabbed.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl FrameSource for ScriptedFrames {
    async fn grab_frame(&self) -> Result<String, DomainError> {
        let n = self.grabbed.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.fail_at.lock().unwrap() == Some(n) {
            return Err(DomainError::Camera("device disconnected".to_string()));
        }
        if self.blank {
            return Ok(String::new());
        }
        Ok(format!(
            "data:image/jpeg;base64,{}",
            STANDARD.encode(format!("frame{}", n))
        ))
    }
}

/// Returns immediately and records each requested delay.
#[derive(Default)]
pub struct RecordingClock {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingClock {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Clock for RecordingClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Holds every sleep until `release_all`. Signals `entered` on each sleep.
pub struct GatedClock {
    pub entered: Notify,
    release: Semaphore,
    released: AtomicBool,
}

impl Default for GatedClock {
    fn default() -> Self {
        Self {
            entered: Notify::new(),
            release: Semaphore::new(0),
            released: AtomicBool::new(false),
        }
    }
}

impl GatedClock {
    pub fn release_all(&self) {
        self.released.store(true, Ordering::SeqCst);
        self.release.add_permits(1);
    }
}

#[async_trait::async_trait]
impl Clock for GatedClock {
    async fn sleep(&self, _duration: Duration) {
        self.entered.notify_one();
        if self.released.load(Ordering::SeqCst) {
            return;
        }
        // Hand the permit back so later sleeps pass too.
        let _permit = self.release.acquire().await;
    }
}
