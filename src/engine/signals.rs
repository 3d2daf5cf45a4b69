// src/engine/signals.rs

use std::io;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::CoordinatorEvent;

/// Listen for the first interrupt/termination signal and forward it to the
/// coordinator as [`CoordinatorEvent::ShutdownRequested`].
///
/// Only the first signal is forwarded; the listener exits afterwards.
pub fn spawn_signal_listener(events: mpsc::Sender<CoordinatorEvent>) -> JoinHandle<()> {
    spawn_shutdown_forwarder(wait_for_shutdown_signal(), events)
}

/// Forward a single shutdown request once `signal` resolves.
///
/// The task also exits, without sending, if the inbox is closed first.
pub fn spawn_shutdown_forwarder<F>(
    signal: F,
    events: mpsc::Sender<CoordinatorEvent>,
) -> JoinHandle<()>
where
    F: Future<Output = io::Result<&'static str>> + Send + 'static,
{
    tokio::spawn(async move {
        let received = tokio::select! {
            biased;
            _ = events.closed() => {
                debug!("inbox closed; signal listener exiting");
                return;
            }
            received = signal => received,
        };

        match received {
            Ok(signal) => {
                info!(signal, "received signal");
                if events.send(CoordinatorEvent::ShutdownRequested).await.is_err() {
                    info!("coordinator already gone; ignoring signal");
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for shutdown signals");
            }
        }
    })
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res?;
            Ok("SIGINT")
        }
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl-C")
}
