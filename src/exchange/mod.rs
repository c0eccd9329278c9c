//! Remote session authority boundary.
//!
//! Every remote operation the trainer performs goes through [`ExchangeClient`]:
//! one method per operation, each returning a typed reply or an
//! [`ExchangeError`]. Nothing here retries; callers decide the degraded-mode
//! default for each failure.

#[cfg(feature = "network")]
pub mod http;
pub mod offline;
pub mod wire;

use async_trait::async_trait;
use thiserror::Error;

use crate::engine::analysis::AnalysisReport;
use wire::{KeystrokeReply, KeystrokeRequest, LoginReply, StartSessionReply};

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("transport failure during {operation}: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },
    #[error("{operation} returned status {status}: {message}")]
    Status {
        operation: &'static str,
        status: u16,
        message: String,
    },
    #[error("could not decode {operation} reply: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },
    #[error("{0} unavailable: built without network support")]
    Offline(&'static str),
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;

#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Create or resume a session; `user_id` is `None` for anonymous practice.
    async fn start_session(&self, user_id: Option<i64>) -> ExchangeResult<StartSessionReply>;

    async fn keystroke(&self, request: &KeystrokeRequest) -> ExchangeResult<KeystrokeReply>;

    async fn new_text(&self, session_id: &str) -> ExchangeResult<String>;

    async fn analysis(&self, session_id: &str) -> ExchangeResult<AnalysisReport>;

    async fn save_progress(&self, user_id: i64) -> ExchangeResult<()>;

    async fn login(&self, username: &str, password: &str) -> ExchangeResult<LoginReply>;

    async fn register(&self, username: &str, password: &str) -> ExchangeResult<()>;

    /// Switch the active session between learn mode (wrong keys block) and
    /// free mode (wrong keys advance).
    async fn set_mode(&self, learn_mode: bool) -> ExchangeResult<()>;

    /// Cookies binding this client to its signed-in identity, as a `Cookie`
    /// header value. `None` when the client keeps no cookies.
    fn identity_cookies(&self) -> Option<String> {
        None
    }

    /// Put back cookies saved by [`ExchangeClient::identity_cookies`] on an
    /// earlier run.
    fn restore_identity_cookies(&self, _cookies: &str) {}

    /// Drop every cookie so the remote side sees an anonymous client.
    fn clear_identity_cookies(&self) {}
}
