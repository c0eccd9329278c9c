//! reqwest-backed client for the remote session authority.
//!
//! Endpoints:
//! - `POST /api/start_session`
//! - `POST /api/keystroke`
//! - `GET  /api/new_text/{session_id}`
//! - `GET  /api/analysis/{session_id}`
//! - `POST /api/save_progress`
//! - `POST /api/login`, `POST /api/register`
//! - `POST /api/set_mode`
//!
//! The service ties the active session and the signed-in user to a cookie.
//! The client keeps its own cookie store so those cookies can be saved
//! between runs and dropped on logout.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::wire::{
    Ack, CredentialsRequest, ErrorBody, KeystrokeReply, KeystrokeRequest, LoginReply,
    NewTextReply, SaveProgressRequest, SetModeRequest, StartSessionReply, StartSessionRequest,
};
use super::{ExchangeClient, ExchangeError, ExchangeResult};
use crate::engine::analysis::AnalysisReport;

/// Cookie jar that can be emptied in place. reqwest's [`Jar`] only grows, so
/// logout swaps in a fresh one.
#[derive(Default)]
struct SessionCookies {
    jar: RwLock<Jar>,
}

impl SessionCookies {
    fn clear(&self) {
        match self.jar.write() {
            Ok(mut jar) => *jar = Jar::default(),
            Err(poisoned) => *poisoned.into_inner() = Jar::default(),
        }
    }

    fn add(&self, cookie: &str, url: &Url) {
        match self.jar.read() {
            Ok(jar) => jar.add_cookie_str(cookie, url),
            Err(poisoned) => poisoned.into_inner().add_cookie_str(cookie, url),
        }
    }
}

impl CookieStore for SessionCookies {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        match self.jar.read() {
            Ok(jar) => jar.set_cookies(cookie_headers, url),
            Err(poisoned) => poisoned.into_inner().set_cookies(cookie_headers, url),
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        match self.jar.read() {
            Ok(jar) => jar.cookies(url),
            Err(poisoned) => poisoned.into_inner().cookies(url),
        }
    }
}

#[derive(Clone)]
pub struct HttpExchange {
    base_url: String,
    origin: Url,
    cookies: Arc<SessionCookies>,
    http_client: reqwest::Client,
}

impl HttpExchange {
    /// Build a client for `base_url`. `timeout` of `None` keeps the transport
    /// default.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> ExchangeResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let origin = Url::parse(&base_url).map_err(|e| ExchangeError::Transport {
            operation: "client setup",
            message: format!("invalid server URL {base_url}: {e}"),
        })?;

        let cookies = Arc::new(SessionCookies::default());
        let mut builder = reqwest::Client::builder().cookie_provider(Arc::clone(&cookies));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(|e| ExchangeError::Transport {
            operation: "client setup",
            message: e.to_string(),
        })?;
        Ok(Self {
            base_url,
            origin,
            cookies,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> ExchangeResult<T> {
        let response = request.send().await.map_err(|e| ExchangeError::Transport {
            operation,
            message: e.to_string(),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ExchangeError::Transport {
            operation,
            message: e.to_string(),
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(ExchangeError::Status {
                operation,
                status: status.as_u16(),
                message,
            });
        }

        debug!(operation, bytes = body.len(), "reply received");
        serde_json::from_str(&body).map_err(|e| ExchangeError::Decode {
            operation,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl ExchangeClient for HttpExchange {
    async fn start_session(&self, user_id: Option<i64>) -> ExchangeResult<StartSessionReply> {
        let request = self
            .http_client
            .post(self.url("start_session"))
            .json(&StartSessionRequest { user_id });
        self.send("start session", request).await
    }

    async fn keystroke(&self, request: &KeystrokeRequest) -> ExchangeResult<KeystrokeReply> {
        let request = self.http_client.post(self.url("keystroke")).json(request);
        self.send("keystroke", request).await
    }

    async fn new_text(&self, session_id: &str) -> ExchangeResult<String> {
        let request = self
            .http_client
            .get(self.url(&format!("new_text/{session_id}")));
        let reply: NewTextReply = self.send("new text", request).await?;
        Ok(reply.text)
    }

    async fn analysis(&self, session_id: &str) -> ExchangeResult<AnalysisReport> {
        let request = self
            .http_client
            .get(self.url(&format!("analysis/{session_id}")));
        self.send("analysis", request).await
    }

    async fn save_progress(&self, user_id: i64) -> ExchangeResult<()> {
        let request = self
            .http_client
            .post(self.url("save_progress"))
            .json(&SaveProgressRequest { user_id });
        let _: Ack = self.send("save progress", request).await?;
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> ExchangeResult<LoginReply> {
        let request = self
            .http_client
            .post(self.url("login"))
            .json(&CredentialsRequest { username, password });
        self.send("login", request).await
    }

    async fn register(&self, username: &str, password: &str) -> ExchangeResult<()> {
        let request = self
            .http_client
            .post(self.url("register"))
            .json(&CredentialsRequest { username, password });
        let _: Ack = self.send("register", request).await?;
        Ok(())
    }

    async fn set_mode(&self, learn_mode: bool) -> ExchangeResult<()> {
        let request = self
            .http_client
            .post(self.url("set_mode"))
            .json(&SetModeRequest { learn_mode });
        let _: Ack = self.send("set mode", request).await?;
        Ok(())
    }

    fn identity_cookies(&self) -> Option<String> {
        let header = self.cookies.cookies(&self.origin)?;
        match header.to_str() {
            Ok(value) => Some(value.to_string()),
            Err(err) => {
                warn!(error = %err, "cookie header is not printable, not saving it");
                None
            }
        }
    }

    fn restore_identity_cookies(&self, cookies: &str) {
        for cookie in cookies.split(';').map(str::trim).filter(|c| !c.is_empty()) {
            self.cookies.add(cookie, &self.origin);
        }
        debug!("restored saved cookies");
    }

    fn clear_identity_cookies(&self) {
        self.cookies.clear();
    }
}
