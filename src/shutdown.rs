use std::sync::Arc;

use tokio::sync::watch;

/// Fires the run-wide cancellation signal. Cloning shares the same signal.
#[derive(Debug, Clone)]
pub struct ShutdownSender {
    tx: Arc<watch::Sender<bool>>,
}

/// Observes the cancellation signal. Every clone sees the same state, and a
/// receiver created after the signal fired still reports it.
#[derive(Debug, Clone)]
pub struct ShutdownReceiver {
    rx: watch::Receiver<bool>,
}

#[must_use]
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    let (tx, rx) = watch::channel(false);
    (ShutdownSender { tx: Arc::new(tx) }, ShutdownReceiver { rx })
}

impl ShutdownSender {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn subscribe(&self) -> ShutdownReceiver {
        ShutdownReceiver {
            rx: self.tx.subscribe(),
        }
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl ShutdownReceiver {
    /// Resolves once the signal fires. Never resolves if every sender is
    /// dropped without firing.
    pub async fn cancelled(&mut self) {
        let closed = self.rx.wait_for(|fired| *fired).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}
