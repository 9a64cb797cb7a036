//! Shared "keep running" token for the background tasks.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

/// Cloneable shutdown token.
///
/// Every clone observes the same flag; once [`Shutdown::trigger`] is called
/// by any holder, [`Shutdown::is_running`] is false everywhere and pending
/// [`Shutdown::cancelled`] futures resolve.
#[derive(Debug, Clone)]
pub struct Shutdown {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(true);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    pub fn is_running(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Ask every task to stop. Idempotent.
    pub fn trigger(&self) {
        let was_running = self.sender.send_replace(false);
        if was_running {
            info!("Shutdown requested");
        }
    }

    /// Resolves once shutdown has been triggered.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        // The sender lives in `self`, so `wait_for` cannot observe a closed channel here.
        let _ = receiver.wait_for(|running| !*running).await;
    }

    /// Trigger shutdown when the process receives Ctrl+C / SIGINT.
    pub async fn trigger_on_ctrl_c(self) {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::error!("failed to listen for interrupt: {}", e);
                    return;
                }
                info!("Interrupt received");
                self.trigger();
            }
            _ = self.cancelled() => {}
        }
    }
}
