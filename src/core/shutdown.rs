//! # OS termination signals.
//!
//! [`wait_for_shutdown_signal`] completes when the process receives a
//! termination signal; the simulator uses it to stop workers early.
//!
//! **Unix:** `SIGINT`, `SIGTERM`, `SIGQUIT`, plus `Ctrl-C`.
//! **Elsewhere:** `Ctrl-C` via [`tokio::signal::ctrl_c`].

use std::future;

/// Waits for a termination signal.
///
/// Returns `Err` if signal registration fails.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Returns `Err` if signal registration fails.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Resolves on a termination signal; never resolves when `enabled` is false
/// or the handlers cannot be installed.
pub(crate) async fn shutdown_signal(enabled: bool) {
    if !enabled {
        return future::pending().await;
    }
    if let Err(e) = wait_for_shutdown_signal().await {
        tracing::warn!(error = %e, "signal handlers unavailable; running to the deadline");
        future::pending::<()>().await;
    }
}
