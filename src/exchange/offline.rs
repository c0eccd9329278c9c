use async_trait::async_trait;

use super::wire::{KeystrokeReply, KeystrokeRequest, LoginReply, StartSessionReply};
use super::{ExchangeClient, ExchangeError, ExchangeResult};
use crate::engine::analysis::AnalysisReport;

/// Client used when the crate is built without network support. Every call
/// fails, which keeps the trainer in degraded mode.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineExchange;

#[async_trait]
impl ExchangeClient for OfflineExchange {
    async fn start_session(&self, _user_id: Option<i64>) -> ExchangeResult<StartSessionReply> {
        Err(ExchangeError::Offline("start session"))
    }

    async fn keystroke(&self, _request: &KeystrokeRequest) -> ExchangeResult<KeystrokeReply> {
        Err(ExchangeError::Offline("keystroke"))
    }

    async fn new_text(&self, _session_id: &str) -> ExchangeResult<String> {
        Err(ExchangeError::Offline("new text"))
    }

    async fn analysis(&self, _session_id: &str) -> ExchangeResult<AnalysisReport> {
        Err(ExchangeError::Offline("analysis"))
    }

    async fn save_progress(&self, _user_id: i64) -> ExchangeResult<()> {
        Err(ExchangeError::Offline("save progress"))
    }

    async fn login(&self, _username: &str, _password: &str) -> ExchangeResult<LoginReply> {
        Err(ExchangeError::Offline("login"))
    }

    async fn register(&self, _username: &str, _password: &str) -> ExchangeResult<()> {
        Err(ExchangeError::Offline("register"))
    }

    async fn set_mode(&self, _learn_mode: bool) -> ExchangeResult<()> {
        Err(ExchangeError::Offline("set mode"))
    }
}
