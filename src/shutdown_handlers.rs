use std::time::Duration;

use tracing::{info, warn};

use crate::shutdown::ShutdownSender;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Fires the shutdown signal on Ctrl+C or SIGTERM. The task ends on its own
/// once the signal fired for any other reason.
pub fn setup_signal_shutdown_handler(shutdown_tx: &ShutdownSender) -> tokio::task::JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        let mut shutdown_rx = shutdown_tx.subscribe();

        #[cfg(unix)]
        let mut term_signal = match signal(SignalKind::terminate()) {
            Ok(signal) => Some(signal),
            Err(err) => {
                warn!("Failed to register SIGTERM handler: {}", err);
                None
            }
        };

        #[cfg(unix)]
        {
            tokio::select! {
                () = shutdown_rx.cancelled() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, stopping");
                    shutdown_tx.trigger();
                }
                () = async {
                    if let Some(signal) = term_signal.as_mut() {
                        signal.recv().await;
                    } else {
                        std::future::pending::<()>().await;
                    }
                } => {
                    info!("Terminated, stopping");
                    shutdown_tx.trigger();
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                () = shutdown_rx.cancelled() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, stopping");
                    shutdown_tx.trigger();
                }
            }
        }
    })
}

/// Fires the shutdown signal once `deadline` has elapsed.
pub fn setup_deadline_shutdown_handler(
    shutdown_tx: &ShutdownSender,
    deadline: Duration,
) -> tokio::task::JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        let mut shutdown_rx = shutdown_tx.subscribe();
        tokio::select! {
            () = shutdown_rx.cancelled() => {}
            () = tokio::time::sleep(deadline) => {
                info!("Deadline of {:?} reached, stopping", deadline);
                shutdown_tx.trigger();
            }
        }
    })
}
