//! Cancellation shared between the caller and poll loops.
//!
//! A `watch` channel rather than `broadcast`: a token created after
//! [`CancelController::cancel`] still observes the cancellation.

use tokio::signal;
use tokio::sync::watch;

/// Owns the cancellation flag.
#[derive(Debug)]
pub struct CancelController {
    tx: watch::Sender<bool>,
}

impl CancelController {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Wait for SIGINT, then cancel.
    pub async fn cancel_on_ctrl_c(&self) {
        if signal::ctrl_c().await.is_ok() {
            tracing::info!("received SIGINT, cancelling");
            self.cancel();
        }
    }
}

impl Default for CancelController {
    fn default() -> Self {
        Self::new()
    }
}

/// Observes a [`CancelController`].
#[derive(Clone, Debug)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled. Never resolves if the controller is
    /// dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
