//! Application configuration. Backend URL, class/subject, capture tuning, credentials.

use crate::domain::ClassSubjectRef;
use crate::usecases::capture_loop::{DEFAULT_BURST_FRAMES, DEFAULT_FRAME_INTERVAL};
use crate::usecases::BurstSettings;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_SESSION_TITLE: &str = "Attendance";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_FRAMES_DIR: &str = "./frames";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Attendance backend root. Read from HAJIRI_API_BASE_URL.
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Class/subject assignment this client takes attendance for. Read from HAJIRI_CLASS_SUBJECT_ID.
    #[serde(default)]
    pub class_subject_id: Option<u64>,

    /// Title used when a new session is created. Read from HAJIRI_SESSION_TITLE.
    #[serde(default)]
    pub session_title: Option<String>,

    /// JSON roster file for manual marking. Read from HAJIRI_ROSTER_PATH.
    #[serde(default)]
    pub roster_path: Option<String>,

    /// Directory the frame source reads images from. Read from HAJIRI_FRAMES_DIR.
    #[serde(default)]
    pub frames_dir: Option<String>,

    /// Frames per recognition burst (default 5). Read from HAJIRI_BURST_SIZE.
    #[serde(default)]
    pub burst_size: Option<usize>,

    /// Delay between frames of a burst in ms (default 500). Read from HAJIRI_FRAME_INTERVAL_MS.
    #[serde(default)]
    pub frame_interval_ms: Option<u64>,

    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    // ─────────────────────────────────────────────────────────────────────────
    // Credentials
    // ─────────────────────────────────────────────────────────────────────────
    /// Fixed anti-forgery token. When unset the token is fetched from the backend.
    #[serde(default)]
    pub csrf_token: Option<String>,

    /// Logged-in session cookie (bare `sessionid` value or full cookie string).
    #[serde(default)]
    pub session_cookie: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("HAJIRI").try_parsing(true));
        if let Ok(path) = std::env::var("HAJIRI_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Returns the class/subject reference, if configured.
    pub fn class_subject(&self) -> Option<ClassSubjectRef> {
        self.class_subject_id.map(ClassSubjectRef)
    }

    pub fn api_base_url_or_default(&self) -> String {
        self.api_base_url
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    pub fn session_title_or_default(&self) -> String {
        self.session_title
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_TITLE.to_string())
    }

    pub fn frames_dir_or_default(&self) -> String {
        self.frames_dir
            .clone()
            .unwrap_or_else(|| DEFAULT_FRAMES_DIR.to_string())
    }

    /// Returns burst frame count and interval. Zero frames is raised to one.
    pub fn burst_or_default(&self) -> BurstSettings {
        BurstSettings::new(
            self.burst_size.unwrap_or(DEFAULT_BURST_FRAMES),
            self.frame_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_FRAME_INTERVAL),
        )
    }

    pub fn request_timeout_or_default(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}
