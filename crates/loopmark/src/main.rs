//! Loopmark: timed annotation and loop playback for recorded sessions.

mod app;
mod app_command;
mod capture;
mod config;
mod error;
mod library;
mod overlay;
#[cfg(test)]
mod tests;
mod timeline;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    capture::ChunkBufferDevice,
    error::{AppError, Result as AppResult},
    library::MemoryLibrary,
    overlay::OverlayPublisher,
    timeline::TimelineBackend,
};

use crate::config::Config;

use std::panic::Location;

use error_location::ErrorLocation;
use loopmark_core::{OverlayMirror, OverlayUpdate, SystemTimeSource};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

/// Application entry point.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("loopmark=debug")
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let library_dir = match config.library_dir() {
        Ok(dir) => dir,
        Err(e) => {
            error!("Failed to resolve library directory: {:?}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = std::fs::create_dir_all(&library_dir) {
        error!(library_dir = ?library_dir, error = ?e, "Failed to create library directory");
        std::process::exit(1);
    }

    let (command_tx, command_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (overlay, overlay_rx) = OverlayPublisher::channel(64);

    // One library clone per seam: persistence and merging share the map.
    let library = MemoryLibrary::with_root(library_dir);

    let app = App::new(
        config,
        ChunkBufferDevice::new(),
        SystemTimeSource,
        TimelineBackend::new(),
        library.clone(),
        library,
        overlay,
        command_rx,
        shutdown_tx,
    );

    tokio::spawn(mirror_overlay(overlay_rx, shutdown_rx));
    tokio::spawn(async move {
        if let Err(e) = forward_ctrl_c(command_tx).await {
            error!(error = ?e, "Shutdown forwarding failed");
        }
    });

    if let Err(e) = app.run().await {
        error!(error = ?e, "App error");
        std::process::exit(1);
    }
}

/// Drive the overlay surface from the update channel until shutdown.
async fn mirror_overlay(
    mut overlay_rx: mpsc::Receiver<OverlayUpdate>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut mirror = OverlayMirror::new();

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
            update = overlay_rx.recv() => {
                let Some(update) = update else { break };
                if mirror.apply(update) {
                    let current = mirror.display();
                    debug!(
                        elapsed_seconds = current.elapsed_seconds,
                        mark_open = current.mark_open,
                        note = ?current.note,
                        "Overlay display updated"
                    );
                }
            }
        }
    }

    debug!("Overlay mirror stopped");
}

/// Translate Ctrl-C into a shutdown command so the main loop exits cleanly.
async fn forward_ctrl_c(command_tx: mpsc::Sender<AppCommand>) -> AppResult<()> {
    tokio::signal::ctrl_c().await?;

    info!("Ctrl-C received, requesting shutdown");

    command_tx
        .send(AppCommand::Shutdown)
        .await
        .map_err(|e| AppError::ChannelSendFailed {
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(())
}
