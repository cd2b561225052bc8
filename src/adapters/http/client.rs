//! reqwest implementation of `AttendanceApi`.
//!
//! Attaches anti-forgery credentials from the injected provider to every request
//! and maps transport/status failures into the operation's `DomainError` variant,
//! preferring the backend's own `error` message.

use crate::adapters::http::dto::{
    CreateSessionRequest, CreateSessionResponse, ErrorBody, ManualMarkRequest, MessageResponse,
    OpenSessionResponse, RecognizeRequest, RecognizeResponse,
};
use crate::domain::{
    ClassSubjectRef, DomainError, EncodedFrame, Mode, RecognitionResult, SessionId, StudentId,
};
use crate::ports::{AttendanceApi, CredentialProvider, OpenSessionInfo};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const OPEN_SESSION_PATH: &str = "/api/attendance/session/open/";
const CREATE_SESSION_PATH: &str = "/api/attendance/session/create/";
const RECOGNIZE_PATH: &str = "/api/attendance/recognize/";
const MANUAL_MARK_PATH: &str = "/api/attendance/manual/";

/// Longest slice of an unstructured error body echoed to the operator.
const MAX_ERROR_BODY: usize = 200;

pub struct HttpAttendanceApi {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpAttendanceApi {
    /// # Arguments
    /// * `base_url` - Backend origin (e.g. "http://localhost:8000"); trailing slash optional
    /// * `credentials` - CSRF token / cookie provider
    /// * `timeout` - Per-request timeout
    pub fn new(
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Credentials(format!("HTTP client init failed: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Adds `X-CSRFToken` and `Cookie` headers when the provider has them.
    async fn authorize(&self, req: RequestBuilder) -> Result<RequestBuilder, String> {
        let creds = self
            .credentials
            .credentials()
            .await
            .map_err(|e| e.to_string())?;
        let mut req = req;
        if let Some(token) = creds.csrf_token {
            req = req.header("X-CSRFToken", token);
        }
        if let Some(cookie) = creds.cookie {
            req = req.header(reqwest::header::COOKIE, cookie);
        }
        Ok(req)
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, String> {
        let response = self
            .authorize(req)
            .await?
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {}", e))?;
        if response.status() == StatusCode::FORBIDDEN {
            debug!("403 from backend; credentials will be refetched");
            self.credentials.invalidate().await;
        }
        Ok(response)
    }
}

/// Turn a non-success response into an operator-facing message.
async fn failure_message(response: Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    warn!(status = %status, body = %text.chars().take(MAX_ERROR_BODY).collect::<String>(), "attendance API returned error");
    error_message(status, &text)
}

fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(msg) = parsed.error.or(parsed.detail) {
            return msg;
        }
    }
    let snippet: String = body.chars().take(MAX_ERROR_BODY).collect();
    if snippet.trim().is_empty() {
        format!("API error {}", status)
    } else {
        format!("API error {}: {}", status, snippet)
    }
}

#[async_trait::async_trait]
impl AttendanceApi for HttpAttendanceApi {
    async fn find_open_session(
        &self,
        class_subject: ClassSubjectRef,
    ) -> Result<Option<OpenSessionInfo>, DomainError> {
        let req = self
            .client
            .get(self.url(OPEN_SESSION_PATH))
            .query(&[("class_subject_id", class_subject.0)]);
        let response = self.send(req).await.map_err(DomainError::SessionLookup)?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(class_subject_id = %class_subject, "no open session (404)");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(DomainError::SessionLookup(failure_message(response).await));
        }

        let body: OpenSessionResponse = response.json().await.map_err(|e| {
            DomainError::SessionLookup(format!("Failed to parse lookup response: {}", e))
        })?;
        Ok(body.session_id.map(|id| OpenSessionInfo {
            id,
            title: body.session_title,
            manual_allowed: body.is_manual_allowed,
        }))
    }

    async fn create_session(
        &self,
        class_subject: ClassSubjectRef,
        title: &str,
        manual_allowed: bool,
    ) -> Result<SessionId, DomainError> {
        let req = self
            .client
            .post(self.url(CREATE_SESSION_PATH))
            .json(&CreateSessionRequest {
                class_subject_id: class_subject.0,
                session_title: title,
                is_manual_allowed: manual_allowed,
            });
        let response = self.send(req).await.map_err(DomainError::SessionCreate)?;

        if !response.status().is_success() {
            return Err(DomainError::SessionCreate(failure_message(response).await));
        }

        let body: CreateSessionResponse = response.json().await.map_err(|e| {
            DomainError::SessionCreate(format!("Failed to parse create response: {}", e))
        })?;
        match (body.session_id, body.error) {
            (Some(id), _) => Ok(id),
            (None, Some(error)) => Err(DomainError::SessionCreate(error)),
            (None, None) => Err(DomainError::SessionCreate(
                "Failed to create session".to_string(),
            )),
        }
    }

    async fn recognize(
        &self,
        session_id: SessionId,
        frames: &[EncodedFrame],
        mode: Mode,
    ) -> Result<RecognitionResult, DomainError> {
        debug!(session_id = %session_id, frames = frames.len(), mode = %mode, "submitting burst");
        let req = self
            .client
            .post(self.url(RECOGNIZE_PATH))
            .json(&RecognizeRequest {
                session_id,
                images: frames,
                mode,
            });
        let response = self.send(req).await.map_err(DomainError::Recognition)?;

        if !response.status().is_success() {
            return Err(DomainError::Recognition(failure_message(response).await));
        }

        let body: RecognizeResponse = response.json().await.map_err(|e| {
            DomainError::Recognition(format!("Failed to parse recognition response: {}", e))
        })?;
        match (body.recognized, body.error) {
            (Some(list), _) => Ok(RecognitionResult(
                list.into_iter().map(|r| r.into_domain(mode)).collect(),
            )),
            (None, Some(error)) => Err(DomainError::Recognition(error)),
            (None, None) => Ok(RecognitionResult::default()),
        }
    }

    async fn mark_manual(
        &self,
        session_id: SessionId,
        student_id: StudentId,
        mode: Mode,
    ) -> Result<String, DomainError> {
        let req = self
            .client
            .post(self.url(MANUAL_MARK_PATH))
            .json(&ManualMarkRequest {
                session_id,
                student_id,
                mode,
            });
        let response = self.send(req).await.map_err(DomainError::ManualMark)?;

        if !response.status().is_success() {
            return Err(DomainError::ManualMark(failure_message(response).await));
        }

        let body: MessageResponse = response.json().await.map_err(|e| {
            DomainError::ManualMark(format!("Failed to parse manual-mark response: {}", e))
        })?;
        match (body.message, body.error) {
            (Some(message), _) => Ok(message),
            (None, Some(error)) => Err(DomainError::ManualMark(error)),
            (None, None) => Ok(format!("Manual {} recorded for student {}", mode, student_id)),
        }
    }
}
