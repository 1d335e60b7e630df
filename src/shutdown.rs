//! Process shutdown signal
//!
//! A single flag flipped once (Ctrl+C / SIGTERM) and observed by the
//! transport, the ingestion loop and the HTTP server.

use tokio::sync::watch;

/// Shared shutdown trigger
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Begin shutdown; idempotent
    pub fn trigger(&self) {
        if !self.tx.send_replace(true) {
            log::info!("🛑 Shutting down server...");
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve once shutdown has begun (or the trigger is gone)
pub async fn signalled(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|stopped| *stopped).await;
}
