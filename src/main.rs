//! Wiring & DI. Entry point: bootstrap adapters, inject into the coordinator, run UI.
//! No business logic here; session lifecycle lives in SessionCoordinator.

use dotenv::dotenv;
use hajiri_capture::adapters::camera::DirectoryFrameSource;
use hajiri_capture::adapters::clock::TokioClock;
use hajiri_capture::adapters::http::{CsrfEndpointCredentials, HttpAttendanceApi, StaticCredentials};
use hajiri_capture::adapters::persistence::{EmptyRoster, RosterJson};
use hajiri_capture::adapters::ui::tui::TuiInputPort;
use hajiri_capture::ports::{
    AttendanceApi, Clock, CredentialProvider, FrameSource, InputPort, RosterSource,
};
use hajiri_capture::shared::config::AppConfig;
use hajiri_capture::usecases::{CoordinatorSettings, SessionCoordinator};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().map_err(|e| anyhow::anyhow!("config: {}", e))?;
    let Some(class_subject) = cfg.class_subject() else {
        anyhow::bail!("Set HAJIRI_CLASS_SUBJECT_ID (env or .env) to the class/subject to take attendance for");
    };
    let base_url = cfg.api_base_url_or_default();
    info!(%base_url, class_subject_id = %class_subject, "attendance backend");

    // --- Credentials: fixed token from config, otherwise fetched from the backend ---
    let credentials: Arc<dyn CredentialProvider> = match cfg.csrf_token.clone() {
        Some(token) => {
            info!("using configured CSRF token");
            Arc::new(StaticCredentials::new(Some(token), cfg.session_cookie.clone()))
        }
        None => Arc::new(
            CsrfEndpointCredentials::new(
                base_url.clone(),
                cfg.session_cookie.clone(),
                cfg.request_timeout_or_default(),
            )
            .map_err(|e| anyhow::anyhow!("{}", e))?,
        ),
    };
    if cfg.session_cookie.is_none() {
        warn!("HAJIRI_SESSION_COOKIE not set; backend may reject requests as unauthenticated");
    }

    let api: Arc<dyn AttendanceApi> = Arc::new(
        HttpAttendanceApi::new(base_url, credentials, cfg.request_timeout_or_default())
            .map_err(|e| anyhow::anyhow!("{}", e))?,
    );

    let frames_dir = cfg.frames_dir_or_default();
    info!(path = %frames_dir, "frame source directory");
    let frames: Arc<dyn FrameSource> = Arc::new(DirectoryFrameSource::new(&frames_dir));
    let clock: Arc<dyn Clock> = Arc::new(TokioClock);

    // --- Roster (manual marking) ---
    let roster_source: Box<dyn RosterSource> = match cfg.roster_path.as_deref() {
        Some(path) => Box::new(RosterJson::new(path)),
        None => {
            warn!("HAJIRI_ROSTER_PATH not set; manual attendance has no students to pick");
            Box::new(EmptyRoster)
        }
    };
    let roster = roster_source
        .load_roster()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    info!(students = roster.len(), "roster loaded");

    let burst = cfg.burst_or_default();
    info!(
        frames = burst.frames,
        interval_ms = burst.interval.as_millis() as u64,
        "capture burst"
    );
    let coordinator = Arc::new(SessionCoordinator::new(
        api,
        frames,
        clock,
        CoordinatorSettings {
            class_subject,
            session_title: cfg.session_title_or_default(),
            burst,
        },
        roster,
    ));

    hajiri_capture::adapters::ui::init_ui(&class_subject.to_string());

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(coordinator));

    // --- Run (create session -> recognize / switch mode / manual) ---
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
