//! The run-wide cancellation signal.
//!
//! One broadcast channel carries a single `()` to every producer. Producers
//! never block on it while working; they poll it with [`is_cancelled`] at
//! their own checkpoints.
use std::time::Duration;

use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

pub type ShutdownSender = broadcast::Sender<()>;
pub type ShutdownReceiver = broadcast::Receiver<()>;

/// Broadcast channel size for shutdown notifications (single signal fan-out).
const SHUTDOWN_CHANNEL_CAPACITY: usize = 1;

#[must_use]
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    broadcast::channel::<()>(SHUTDOWN_CHANNEL_CAPACITY)
}

/// Non-blocking checkpoint. A delivered signal, a lagged receiver, or a
/// closed channel all mean "stop".
pub fn is_cancelled(shutdown_rx: &mut ShutdownReceiver) -> bool {
    match shutdown_rx.try_recv() {
        Err(TryRecvError::Empty) => false,
        Ok(()) | Err(TryRecvError::Lagged(_) | TryRecvError::Closed) => true,
    }
}

/// Broadcasts on `shutdown_tx` once `duration` has elapsed.
pub fn arm_deadline(shutdown_tx: &ShutdownSender, duration: Duration) -> tokio::task::JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        debug!("Nominal duration of {:?} elapsed; cancelling producers.", duration);
        drop(shutdown_tx.send(()));
    })
}

/// Forwards Ctrl+C / SIGTERM onto the shutdown channel. Exits quietly once the
/// run is cancelled by any other means.
pub fn setup_signal_shutdown_handler(shutdown_tx: &ShutdownSender) -> tokio::task::JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        #[cfg(unix)]
        let mut term_signal = match signal(SignalKind::terminate()) {
            Ok(signal) => Some(signal),
            Err(err) => {
                tracing::warn!("Failed to register SIGTERM handler: {}", err);
                None
            }
        };

        #[cfg(unix)]
        {
            tokio::select! {
                _ = shutdown_rx.recv() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupt received; finishing in-flight requests.");
                    drop(shutdown_tx.send(()));
                }
                () = async {
                    if let Some(signal) = term_signal.as_mut() {
                        signal.recv().await;
                    } else {
                        std::future::pending::<()>().await;
                    }
                } => {
                    info!("SIGTERM received; finishing in-flight requests.");
                    drop(shutdown_tx.send(()));
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                _ = shutdown_rx.recv() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupt received; finishing in-flight requests.");
                    drop(shutdown_tx.send(()));
                }
            }
        }
    })
}
