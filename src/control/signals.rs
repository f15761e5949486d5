// SYNOID Hologram Signal Handling — Graceful Shutdown
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Ctrl-C / SIGTERM only drop the shared running flag; every loop sees it
// and winds down on its own.

use std::sync::Arc;
use tracing::{info, warn};

use crate::state::ControlState;

/// Spawn a task on the current runtime that waits for an interrupt and
/// requests shutdown.
pub fn install_signal_handler(control: Arc<ControlState>) {
    tokio::spawn(async move {
        match wait_for_interrupt().await {
            Ok(name) => {
                warn!("[SIGNAL] ⛔ {} received. Stopping display...", name);
                control.request_shutdown();
                info!("[SIGNAL] Shutdown requested.");
            }
            Err(e) => warn!("[SIGNAL] Failed to install interrupt handler: {}", e),
        }
    });
}

#[cfg(unix)]
async fn wait_for_interrupt() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut term = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|_| "SIGINT"),
        _ = term.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_interrupt() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "Ctrl-C")
}
