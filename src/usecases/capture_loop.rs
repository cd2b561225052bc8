//! Capture loop: burst of camera frames -> one recognition request -> replace result.
//!
//! - Exactly `frames` frames per burst, spaced by `interval`, strictly in sequence
//! - Nothing is submitted if any frame fails
//! - Single-slot lock on the capturing flag: a second capture is rejected, not queued
//! - Latest result is replaced on success and left alone on failure

use crate::domain::{DomainError, EncodedFrame, Mode, RecognitionResult, SessionId};
use crate::ports::{AttendanceApi, Clock, FrameSource};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Frames per burst used by the web client.
pub const DEFAULT_BURST_FRAMES: usize = 5;
/// Spacing between burst frames, for varied pose and lighting.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstSettings {
    pub frames: usize,
    pub interval: Duration,
}

impl BurstSettings {
    /// At least one frame per burst.
    pub fn new(frames: usize, interval: Duration) -> Self {
        Self {
            frames: frames.max(1),
            interval,
        }
    }
}

impl Default for BurstSettings {
    fn default() -> Self {
        Self::new(DEFAULT_BURST_FRAMES, DEFAULT_FRAME_INTERVAL)
    }
}

/// Finite, non-restartable frame producer for one capture invocation.
///
/// Each frame is followed by the fixed interval, so the last delay elapses
/// before the batch is handed to the caller. `collect` consumes the burst.
pub struct FrameBurst<'a> {
    source: &'a dyn FrameSource,
    clock: &'a dyn Clock,
    interval: Duration,
    remaining: usize,
    taken: usize,
}

impl<'a> FrameBurst<'a> {
    pub fn new(source: &'a dyn FrameSource, clock: &'a dyn Clock, settings: BurstSettings) -> Self {
        Self {
            source,
            clock,
            interval: settings.interval,
            remaining: settings.frames,
            taken: 0,
        }
    }

    pub fn taken(&self) -> usize {
        self.taken
    }

    /// Next frame, or None once the burst is exhausted. A failed frame ends the burst.
    pub async fn next_frame(&mut self) -> Option<Result<EncodedFrame, DomainError>> {
        if self.remaining == 0 {
            return None;
        }

        let payload = match self.source.grab_frame().await {
            Ok(p) if p.trim().is_empty() => {
                self.remaining = 0;
                return Some(Err(DomainError::Camera(
                    "camera returned an empty frame".to_string(),
                )));
            }
            Ok(p) => p,
            Err(e) => {
                self.remaining = 0;
                return Some(Err(e));
            }
        };

        self.remaining -= 1;
        self.taken += 1;
        debug!(frame = self.taken, bytes = payload.len(), "frame captured");

        self.clock.sleep(self.interval).await;
        Some(Ok(EncodedFrame::from_payload(payload)))
    }

    /// Drain the burst. All frames or an error; never a partial batch.
    pub async fn collect(mut self) -> Result<Vec<EncodedFrame>, DomainError> {
        let mut frames = Vec::with_capacity(self.remaining);
        while let Some(frame) = self.next_frame().await {
            frames.push(frame?);
        }
        Ok(frames)
    }
}

/// Releases the capturing flag on drop, whatever the outcome.
struct CaptureGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> CaptureGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for CaptureGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Capture loop. Owns the capturing flag and the latest recognition result.
pub struct CaptureLoop {
    api: Arc<dyn AttendanceApi>,
    source: Arc<dyn FrameSource>,
    clock: Arc<dyn Clock>,
    settings: BurstSettings,
    capturing: AtomicBool,
    latest: RwLock<RecognitionResult>,
}

impl CaptureLoop {
    pub fn new(
        api: Arc<dyn AttendanceApi>,
        source: Arc<dyn FrameSource>,
        clock: Arc<dyn Clock>,
        settings: BurstSettings,
    ) -> Self {
        Self {
            api,
            source,
            clock,
            settings,
            capturing: AtomicBool::new(false),
            latest: RwLock::new(RecognitionResult::default()),
        }
    }

    pub fn settings(&self) -> BurstSettings {
        self.settings
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::Acquire)
    }

    pub async fn latest(&self) -> RecognitionResult {
        self.latest.read().await.clone()
    }

    /// Capture one burst and submit it tagged with `mode`.
    ///
    /// `mode` is the caller's snapshot; later mode switches do not affect this burst.
    pub async fn capture_and_recognize(
        &self,
        session_id: SessionId,
        mode: Mode,
    ) -> Result<RecognitionResult, DomainError> {
        let _guard = CaptureGuard::acquire(&self.capturing).ok_or_else(|| {
            debug!(session_id = %session_id, "capture rejected: already running");
            DomainError::CaptureInProgress
        })?;

        info!(
            session_id = %session_id,
            mode = %mode,
            frames = self.settings.frames,
            "capture started"
        );

        let burst = FrameBurst::new(self.source.as_ref(), self.clock.as_ref(), self.settings);
        let frames = burst.collect().await.inspect_err(|e| {
            warn!(session_id = %session_id, error = %e, "frame acquisition failed; nothing submitted");
        })?;

        let result = self
            .api
            .recognize(session_id, &frames, mode)
            .await
            .inspect_err(|e| {
                warn!(session_id = %session_id, error = %e, "recognition failed; keeping previous result");
            })?;

        *self.latest.write().await = result.clone();
        info!(
            session_id = %session_id,
            mode = %mode,
            recognized = result.len(),
            "recognition complete"
        );
        Ok(result)
    }
}
