//! Credential providers: anti-forgery token and session cookie for API requests.
//!
//! - `StaticCredentials`: token/cookie taken from configuration
//! - `CsrfEndpointCredentials`: fetches the token from `/api/csrf/` once and caches it

use crate::adapters::http::dto::CsrfResponse;
use crate::domain::DomainError;
use crate::ports::{CredentialProvider, Credentials};
use reqwest::Client;
use reqwest::header::SET_COOKIE;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

const CSRF_PATH: &str = "/api/csrf/";
const CSRF_COOKIE: &str = "csrftoken";
const SESSION_COOKIE: &str = "sessionid";

/// Build the `Cookie` header from the CSRF cookie and the login session cookie.
///
/// `session` may be the bare `sessionid` value or a full `name=value; ...` cookie string.
fn cookie_header(csrf: Option<&str>, session: Option<&str>) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(token) = csrf {
        parts.push(format!("{}={}", CSRF_COOKIE, token));
    }
    if let Some(session) = session.map(str::trim).filter(|s| !s.is_empty()) {
        if session.contains('=') {
            parts.push(session.to_string());
        } else {
            parts.push(format!("{}={}", SESSION_COOKIE, session));
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

/// Value of cookie `name` in one `Set-Cookie` header, if that header sets it.
fn set_cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    let pair = header.split(';').next()?.trim();
    let (key, value) = pair.split_once('=')?;
    (key.trim() == name).then_some(value.trim())
}

pub struct StaticCredentials {
    csrf_token: Option<String>,
    session_cookie: Option<String>,
}

impl StaticCredentials {
    pub fn new(csrf_token: Option<String>, session_cookie: Option<String>) -> Self {
        Self {
            csrf_token,
            session_cookie,
        }
    }
}

#[async_trait::async_trait]
impl CredentialProvider for StaticCredentials {
    async fn credentials(&self) -> Result<Credentials, DomainError> {
        Ok(Credentials {
            csrf_token: self.csrf_token.clone(),
            cookie: cookie_header(self.csrf_token.as_deref(), self.session_cookie.as_deref()),
        })
    }
}

/// Token pair from the csrf endpoint: header value and cookie value.
#[derive(Debug, Clone)]
struct CsrfPair {
    header: String,
    cookie: String,
}

pub struct CsrfEndpointCredentials {
    client: Client,
    base_url: String,
    session_cookie: Option<String>,
    cached: RwLock<Option<CsrfPair>>,
}

impl CsrfEndpointCredentials {
    /// `timeout` bounds the token fetch like any other API request.
    pub fn new(
        base_url: impl Into<String>,
        session_cookie: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Credentials(format!("HTTP client init failed: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_cookie,
            cached: RwLock::new(None),
        })
    }

    async fn fetch(&self) -> Result<CsrfPair, DomainError> {
        let mut req = self.client.get(format!("{}{}", self.base_url, CSRF_PATH));
        if let Some(cookie) = cookie_header(None, self.session_cookie.as_deref()) {
            req = req.header(reqwest::header::COOKIE, cookie);
        }
        let response = req
            .send()
            .await
            .map_err(|e| DomainError::Credentials(format!("CSRF request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DomainError::Credentials(format!(
                "CSRF endpoint returned {}",
                response.status()
            )));
        }

        // The cookie carries the secret the header token is checked against.
        let cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|h| set_cookie_value(h, CSRF_COOKIE))
            .map(str::to_string);

        let body: CsrfResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Credentials(format!("Failed to parse CSRF response: {}", e)))?;

        debug!(from_cookie = cookie.is_some(), "CSRF token fetched");
        Ok(CsrfPair {
            cookie: cookie.unwrap_or_else(|| body.csrf_token.clone()),
            header: body.csrf_token,
        })
    }
}

#[async_trait::async_trait]
impl CredentialProvider for CsrfEndpointCredentials {
    async fn credentials(&self) -> Result<Credentials, DomainError> {
        let cached = self.cached.read().await.clone();
        let pair = match cached {
            Some(pair) => pair,
            None => {
                let pair = self.fetch().await?;
                info!("CSRF token obtained from {}", CSRF_PATH);
                *self.cached.write().await = Some(pair.clone());
                pair
            }
        };
        Ok(Credentials {
            cookie: cookie_header(Some(&pair.cookie), self.session_cookie.as_deref()),
            csrf_token: Some(pair.header),
        })
    }

    async fn invalidate(&self) {
        if self.cached.write().await.take().is_some() {
            info!("CSRF token discarded; next request refetches it");
        }
    }
}
