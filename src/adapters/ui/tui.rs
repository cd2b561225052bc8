//! Implements InputPort. Inquire-based operator loop over the session coordinator.
//!
//! Before a session: "Create attendance session" with confirmation and the
//! manual-allowed toggle. After: recognize, switch mode, manual marks.

use crate::adapters::ui::progress::spinner;
use crate::domain::{DomainError, ErrorKind, Mode, RecognitionResult, RosterEntry};
use crate::ports::InputPort;
use crate::usecases::SessionCoordinator;
use async_trait::async_trait;
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::{Confirm, InquireError, Select};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

const CREATE_SESSION: &str = "Create attendance session";
const RECOGNIZE: &str = "Recognize students";
const SWITCH_MODE: &str = "Switch mode";
const MANUAL: &str = "Manual attendance";
const SHOW_RECOGNIZED: &str = "Show recognized students";
const QUIT: &str = "Quit";

/// Applies the prompt theme globally.
pub fn apply_theme() {
    let config = RenderConfig::default_colored()
        .with_prompt_prefix(Styled::new("›").with_fg(Color::LightCyan))
        .with_highlighted_option_prefix(Styled::new("▸").with_fg(Color::LightYellow));
    inquire::set_global_render_config(config);
}

/// What the operator's answer to a prompt means for the loop.
enum Answer<T> {
    Value(T),
    /// Esc: back to the menu.
    Back,
    /// Ctrl-C: leave.
    Quit,
}

fn answer<T>(result: Result<T, InquireError>) -> Result<Answer<T>, DomainError> {
    match result {
        Ok(v) => Ok(Answer::Value(v)),
        Err(InquireError::OperationCanceled) => Ok(Answer::Back),
        Err(InquireError::OperationInterrupted) => Ok(Answer::Quit),
        Err(e) => Err(DomainError::Ui(e.to_string())),
    }
}

fn report(err: &DomainError) {
    let hint = match err.kind() {
        ErrorKind::Resolution => " Try starting the session again.",
        ErrorKind::Capture => " Previous results kept; try recognizing again.",
        ErrorKind::ManualMark => "",
        ErrorKind::Precondition => "",
        ErrorKind::Configuration => " Check your configuration.",
    };
    println!("✗ {}.{}", err, hint);
}

fn print_recognized(result: &RecognitionResult) {
    if result.is_empty() {
        println!("No students recognized.");
        return;
    }
    println!("Recognized Students:");
    for s in result.students() {
        println!("  - {} ({}) - {}", s.name, s.mode, s.status);
    }
}

fn roster_label(entry: &RosterEntry) -> String {
    match &entry.roll_number {
        Some(roll) => format!("{} (roll {}) [{}]", entry.name, roll, entry.student_id),
        None => format!("{} [{}]", entry.name, entry.student_id),
    }
}

/// One recognition burst running off the menu loop.
///
/// The operator keeps the menu (manual marks, mode switch) while the burst
/// is in flight; the outcome is collected on the next pass through the menu.
#[derive(Default)]
struct BackgroundCapture {
    task: Mutex<Option<JoinHandle<Result<RecognitionResult, DomainError>>>>,
}

impl BackgroundCapture {
    /// Returns false when a burst is already running.
    async fn start(&self, coordinator: &Arc<SessionCoordinator>) -> bool {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return false;
        }
        let coordinator = Arc::clone(coordinator);
        *task = Some(tokio::spawn(async move {
            coordinator.capture_and_recognize().await
        }));
        true
    }

    /// Outcome of a finished burst, once.
    async fn take_finished(&self) -> Option<Result<RecognitionResult, DomainError>> {
        let handle = {
            let mut task = self.task.lock().await;
            if !task.as_ref().is_some_and(|t| t.is_finished()) {
                return None;
            }
            task.take()?
        };
        Some(
            handle
                .await
                .unwrap_or_else(|e| Err(DomainError::Recognition(format!("capture task: {}", e)))),
        )
    }
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    coordinator: Arc<SessionCoordinator>,
    capture: BackgroundCapture,
}

impl TuiInputPort {
    pub fn new(coordinator: Arc<SessionCoordinator>) -> Self {
        Self {
            coordinator,
            capture: BackgroundCapture::default(),
        }
    }

    /// Returns false when the operator quits.
    async fn no_session_menu(&self) -> Result<bool, DomainError> {
        let choice = match answer(Select::new("No session open", vec![CREATE_SESSION, QUIT]).prompt())? {
            Answer::Value(c) => c,
            Answer::Back => return Ok(true),
            Answer::Quit => return Ok(false),
        };
        if choice == QUIT {
            return Ok(false);
        }

        self.coordinator.request_start().await?;
        let confirmed = Confirm::new("Are you sure to create attendance session for this class?")
            .with_default(false)
            .prompt();
        match answer(confirmed)? {
            Answer::Value(true) => {}
            Answer::Value(false) | Answer::Back => {
                self.coordinator.cancel_start().await?;
                return Ok(true);
            }
            Answer::Quit => {
                self.coordinator.cancel_start().await?;
                return Ok(false);
            }
        }

        let manual = Confirm::new("Allow manual attendance?")
            .with_default(true)
            .prompt();
        match answer(manual)? {
            Answer::Value(allowed) => self.coordinator.set_manual_allowed(allowed).await?,
            Answer::Back => {
                self.coordinator.cancel_start().await?;
                return Ok(true);
            }
            Answer::Quit => {
                self.coordinator.cancel_start().await?;
                return Ok(false);
            }
        }

        let pb = spinner("Opening attendance session...");
        let outcome = self.coordinator.confirm_start().await;
        pb.finish_and_clear();
        match outcome {
            Ok(session) => println!("✓ Attendance Session #{} ({})", session.id, session.title),
            Err(e) => report(&e),
        }
        Ok(true)
    }

    /// Returns false when the operator quits.
    async fn session_menu(&self) -> Result<bool, DomainError> {
        match self.capture.take_finished().await {
            Some(Ok(result)) => print_recognized(&result),
            Some(Err(e)) => report(&e),
            None => {}
        }

        let view = self.coordinator.view().await;
        let Some(session) = view.state.session() else {
            return Ok(true);
        };

        let switch_label = format!("{} (now: {})", SWITCH_MODE, view.mode);
        let mut options = vec![RECOGNIZE.to_string(), switch_label.clone()];
        if view.manual_enabled {
            options.push(MANUAL.to_string());
        }
        options.push(SHOW_RECOGNIZED.to_string());
        options.push(QUIT.to_string());

        let busy = if view.capturing { " | recognizing..." } else { "" };
        let title = format!(
            "Attendance Session #{} | mode: {}{}",
            session.id, view.mode, busy
        );
        let choice = match answer(Select::new(&title, options).prompt())? {
            Answer::Value(c) => c,
            Answer::Back => return Ok(true),
            Answer::Quit => return Ok(false),
        };

        match choice.as_str() {
            RECOGNIZE => self.recognize().await,
            MANUAL => return self.manual().await,
            SHOW_RECOGNIZED => print_recognized(&view.recognized),
            QUIT => return Ok(false),
            _ if choice == switch_label => match self.coordinator.toggle_mode().await {
                Ok(mode) => println!("Mode: {}", mode),
                Err(e) => report(&e),
            },
            _ => {}
        }
        Ok(true)
    }

    async fn recognize(&self) {
        let burst = self.coordinator.burst_settings();
        if self.capture.start(&self.coordinator).await {
            println!(
                "Recognizing ({} frames); results show on the next menu.",
                burst.frames
            );
        } else {
            report(&DomainError::CaptureInProgress);
        }
    }

    async fn manual(&self) -> Result<bool, DomainError> {
        let roster = self.coordinator.roster();
        if roster.is_empty() {
            println!("No students found.");
            return Ok(true);
        }

        let labels: Vec<String> = roster.iter().map(roster_label).collect();
        let picked = match answer(Select::new("Student", labels.clone()).prompt())? {
            Answer::Value(p) => p,
            Answer::Back => return Ok(true),
            Answer::Quit => return Ok(false),
        };
        let Some(student) = labels
            .iter()
            .position(|l| *l == picked)
            .map(|i| &roster[i])
        else {
            return Ok(true);
        };

        let modes = vec!["Manual Entry", "Manual Exit"];
        let mode = match answer(Select::new("Mark as", modes).prompt())? {
            Answer::Value("Manual Exit") => Mode::Exit,
            Answer::Value(_) => Mode::Entry,
            Answer::Back => return Ok(true),
            Answer::Quit => return Ok(false),
        };

        match self.coordinator.mark_manual(student.student_id, mode).await {
            Ok(outcome) => println!("✓ {}", outcome.message),
            Err(e) => report(&e),
        }
        Ok(true)
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let keep_going = if self.coordinator.state().await.is_open() {
                self.session_menu().await?
            } else {
                self.no_session_menu().await?
            };
            if !keep_going {
                return Ok(());
            }
        }
    }
}
