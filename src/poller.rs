use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::engine::analysis::AnalysisReport;
use crate::exchange::{ExchangeClient, ExchangeResult};

/// Outcome of one analysis fetch, tagged with the session epoch it was
/// issued under so late replies for a replaced session can be dropped.
#[derive(Debug)]
pub struct AnalysisDelivery {
    pub epoch: u64,
    pub outcome: ExchangeResult<AnalysisReport>,
}

/// Receiving end of the poller, owned by the event loop.
pub struct AnalysisInbox {
    rx: mpsc::UnboundedReceiver<AnalysisDelivery>,
}

impl AnalysisInbox {
    pub async fn recv(&mut self) -> Option<AnalysisDelivery> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<AnalysisDelivery> {
        self.rx.try_recv().ok()
    }
}

/// Fire-and-forget analysis fetches, triggered every `interval` session
/// characters and after each completed text.
pub struct AnalysisPoller {
    tx: mpsc::UnboundedSender<AnalysisDelivery>,
    interval: u64,
}

impl AnalysisPoller {
    pub fn new(interval: u64) -> (Self, AnalysisInbox) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, interval }, AnalysisInbox { rx })
    }

    pub fn is_due(&self, session_chars: u64) -> bool {
        self.interval > 0 && session_chars > 0 && session_chars % self.interval == 0
    }

    /// Spawn a fetch on the current runtime. The result arrives on the inbox.
    pub fn fetch<C>(&self, client: &Arc<C>, session_id: &str, epoch: u64)
    where
        C: ExchangeClient + 'static,
    {
        let client = Arc::clone(client);
        let session_id = session_id.to_string();
        let tx = self.tx.clone();
        debug!(session_id = %session_id, epoch, "analysis fetch");
        tokio::spawn(async move {
            let outcome = client.analysis(&session_id).await;
            // Inbox gone means the trainer shut down; nothing to deliver to
            let _ = tx.send(AnalysisDelivery { epoch, outcome });
        });
    }
}
