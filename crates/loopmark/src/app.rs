use crate::{AppCommand, AppResult, OverlayPublisher, config::Config};

use std::time::Duration;

use loopmark_core::{
    CaptureDevice, EngineError, ExtensionReconciler, ImageRef, LoopPlaybackController, MarkToggle,
    MediaBackend, MergeService, RecordingId, RecordingSession, RecordingStore, SessionOutput,
    SessionState, TimeSource, VideoRef,
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};

/// A finished extension whose merge failed, held in memory so the user can
/// retry without losing the recorded media.
struct PendingExtension {
    target: RecordingId,
    output: SessionOutput,
    images: Vec<ImageRef>,
    videos: Vec<VideoRef>,
}

/// Main application state.
///
/// Owns the one active recording session, the playback controller and the
/// persistence/merge collaborators, and drives them from a single serial
/// command loop. Serial handling is the concurrency discipline: loop-region
/// bursts are naturally serialized, and a reconciliation in flight can never
/// be interrupted by a queued shutdown.
pub struct App<D, T, B, S, M>
where
    D: CaptureDevice,
    T: TimeSource,
    B: MediaBackend,
    S: RecordingStore,
    M: MergeService,
{
    pub(crate) config: Config,
    pub(crate) session: RecordingSession<D, T>,
    pub(crate) controller: LoopPlaybackController<B>,
    pub(crate) library: S,
    pub(crate) merger: M,
    pub(crate) overlay: OverlayPublisher,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    /// Target recording when the active session is an extension.
    extending: Option<RecordingId>,
    /// Recording-level attachments collected during the extension flow.
    extension_images: Vec<ImageRef>,
    extension_videos: Vec<VideoRef>,
    pending_retry: Option<PendingExtension>,
}

impl<D, T, B, S, M> App<D, T, B, S, M>
where
    D: CaptureDevice,
    T: TimeSource,
    B: MediaBackend,
    S: RecordingStore,
    M: MergeService,
{
    /// Wire the application together.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        device: D,
        time: T,
        backend: B,
        library: S,
        merger: M,
        overlay: OverlayPublisher,
        command_rx: mpsc::Receiver<AppCommand>,
        shutdown_tx: watch::Sender<bool>,
    ) -> Self {
        Self {
            config,
            session: RecordingSession::new(device, time),
            controller: LoopPlaybackController::new(backend),
            library,
            merger,
            overlay,
            command_rx,
            shutdown_tx,
            extending: None,
            extension_images: Vec::new(),
            extension_videos: Vec::new(),
            pending_retry: None,
        }
    }

    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub async fn run(mut self) -> AppResult<()> {
        info!("Loopmark starting");

        let mut session_tick =
            tokio::time::interval(Duration::from_millis(self.config.session.tick_interval_ms));
        let mut playback_tick =
            tokio::time::interval(Duration::from_millis(self.config.playback.poll_interval_ms));

        loop {
            tokio::select! {
                _ = session_tick.tick() => {
                    let snapshot = self.session.tick();
                    self.overlay.publish_duration(snapshot.elapsed_seconds);
                    self.overlay.publish_mark_state(snapshot.mark_open);
                }

                _ = playback_tick.tick() => {
                    if let Err(e) = self.controller.poll() {
                        error!(error = ?e, "Playback poll failed");
                    }
                }

                Some(cmd) = self.command_rx.recv() => {
                    if !self.handle_command(cmd).await {
                        break;
                    }
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        let _ = self.shutdown_tx.send(true);
        info!("Loopmark shut down successfully");

        Ok(())
    }

    /// Handle one command. Returns false when the loop should exit.
    pub(crate) async fn handle_command(&mut self, cmd: AppCommand) -> bool {
        match cmd {
            AppCommand::StartRecording { session_id } => {
                if let Err(e) = self.session.start() {
                    error!(session_id = %session_id, error = ?e, "Failed to start recording");
                } else {
                    info!(session_id = %session_id, "Recording session started");
                }
            }
            AppCommand::PauseRecording => {
                if let Err(e) = self.session.pause() {
                    error!(error = ?e, "Failed to pause recording");
                }
            }
            AppCommand::ResumeRecording => {
                if let Err(e) = self.session.resume() {
                    error!(error = ?e, "Failed to resume recording");
                }
            }
            AppCommand::StopRecording { session_id } => {
                match self.session.stop() {
                    Ok(output) => {
                        let target = self.extending.take();
                        self.session.reset();
                        match target {
                            Some(target) => self.reconcile_extension(target, output).await,
                            None => {
                                if let Err(e) = self.finish_recording(output).await {
                                    error!(error = ?e, "Failed to persist recording");
                                }
                            }
                        }
                    }
                    Err(e) => {
                        error!(session_id = %session_id, error = ?e, "Failed to stop recording");
                    }
                }
            }
            AppCommand::ToggleMark => {
                if let Some(toggle) = self.session.toggle_mark() {
                    debug!(?toggle, "Mark toggled");
                    self.overlay
                        .publish_mark_state(matches!(toggle, MarkToggle::Opened { .. }));
                }
            }
            AppCommand::SetNote { text } => {
                // Only mirror notes that actually landed on an open mark.
                if self.session.set_note(text.clone()) {
                    self.overlay.publish_note(Some(text));
                } else {
                    debug!("No open mark, note dropped");
                }
            }
            AppCommand::AttachImage { image } => {
                if !self.session.attach_image(image) {
                    if self.extending.is_some() {
                        // No mark target: a recording-level attachment for
                        // the extension, persisted at reconcile time.
                        self.extension_images.push(image);
                    } else {
                        debug!("No attachment target, image dropped");
                    }
                }
            }
            AppCommand::AttachVideo { video } => {
                if !self.session.attach_video(video) {
                    if self.extending.is_some() {
                        self.extension_videos.push(video);
                    } else {
                        debug!("No attachment target, video dropped");
                    }
                }
            }
            AppCommand::SelectMark { start_seconds } => {
                self.session.select_mark(start_seconds);
            }
            AppCommand::ClearSelection => {
                self.session.clear_selection();
            }
            AppCommand::RemoveImage {
                start_seconds,
                index,
            } => {
                self.session.remove_image(start_seconds, index);
            }
            AppCommand::RemoveVideo {
                start_seconds,
                index,
            } => {
                self.session.remove_video(start_seconds, index);
            }
            AppCommand::TogglePlayback => {
                if let Err(e) = self.controller.toggle() {
                    error!(error = ?e, "Failed to toggle playback");
                }
            }
            AppCommand::PlayLoop { start, end } => {
                // Commands are handled serially on this loop, so a burst of
                // region requests can never issue overlapping
                // stop/seek/play sequences.
                if let Err(e) = self.controller.set_loop_region(start, end) {
                    error!(start, end, error = ?e, "Failed to set loop region");
                }
            }
            AppCommand::ClearLoop => {
                if let Err(e) = self.controller.clear_loop_region() {
                    error!(error = ?e, "Failed to clear loop region");
                }
            }
            AppCommand::CycleRate => match self.controller.cycle_rate() {
                Ok(rate) => info!(rate, "Playback rate changed"),
                Err(e) => error!(error = ?e, "Failed to change playback rate"),
            },
            AppCommand::Seek { seconds } => {
                if let Err(e) = self.controller.seek(seconds) {
                    error!(seconds, error = ?e, "Failed to seek");
                }
            }
            AppCommand::ExtendRecording { target } => {
                if matches!(
                    self.session.state(),
                    SessionState::Recording | SessionState::Paused
                ) {
                    // Resetting here would silently discard the in-progress
                    // recording's media and marks.
                    warn!(target = %target, "Extension refused, a recording is in progress");
                    return true;
                }
                self.session.reset();
                match self.session.start() {
                    Ok(()) => {
                        self.extending = Some(target);
                        self.extension_images.clear();
                        self.extension_videos.clear();
                        info!(target = %target, "Extension recording started");
                    }
                    Err(e) => {
                        error!(target = %target, error = ?e, "Failed to start extension recording");
                    }
                }
            }
            AppCommand::RetryExtension => {
                if let Some(pending) = self.pending_retry.take() {
                    self.extension_images = pending.images;
                    self.extension_videos = pending.videos;
                    self.reconcile_extension(pending.target, pending.output)
                        .await;
                } else {
                    debug!("No failed extension to retry");
                }
            }
            AppCommand::Shutdown => {
                info!("Shutdown requested");
                return false;
            }
        }

        true
    }

    /// Persist a freshly stopped recording and load it for review playback.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Engine`](crate::AppError::Engine) when the
    /// recording itself cannot be created; individual mark or load failures
    /// are logged and do not fail the whole persist.
    async fn finish_recording(&mut self, output: SessionOutput) -> AppResult<()> {
        let duration_ms = output.duration_seconds * 1000;
        let id = self.library.create_recording(&output.media, duration_ms).await?;

        for mark in &output.marks {
            if let Err(e) = self.library.insert_mark(id, mark).await {
                error!(
                    recording = %id,
                    start_seconds = mark.start_seconds,
                    error = ?e,
                    "Failed to persist mark"
                );
            }
        }

        if let Err(e) = self
            .controller
            .load(&output.media, Some(output.duration_seconds as f64))
        {
            error!(recording = %id, error = ?e, "Failed to load recording for playback");
        }

        info!(
            recording = %id,
            duration_seconds = output.duration_seconds,
            marks = output.marks.len(),
            "Recording persisted"
        );

        Ok(())
    }

    /// Merge a finished extension onto its target recording.
    ///
    /// Awaited inline on the command loop: no other command, including
    /// shutdown, can run while the merge is in flight, because the merge
    /// touches the target's shared state and cannot be aborted mid-write.
    async fn reconcile_extension(&mut self, target: RecordingId, output: SessionOutput) {
        let images = std::mem::take(&mut self.extension_images);
        let videos = std::mem::take(&mut self.extension_videos);

        let result = ExtensionReconciler::new(&mut self.library, &mut self.merger)
            .reconcile(target, &output, &images, &videos)
            .await;

        match result {
            Ok(outcome) => {
                info!(
                    target = %target,
                    total_duration_ms = outcome.total_duration_ms,
                    marks_persisted = outcome.marks_persisted,
                    "Extension reconciled"
                );
            }
            Err(e @ (EngineError::MergeFailed { .. } | EngineError::Store { .. })) => {
                // Nothing was written; keep the extension in memory so the
                // user does not lose the recording.
                warn!(target = %target, error = ?e, "Merge failed, extension retained for retry");
                self.pending_retry = Some(PendingExtension {
                    target,
                    output,
                    images,
                    videos,
                });
            }
            Err(EngineError::PartialPersistence { failures, .. }) => {
                // The merge has already been applied; a wholesale retry
                // would double-apply the extension. Surface the itemized
                // list for a narrower retry instead.
                error!(
                    target = %target,
                    failed = failures.len(),
                    "Extension merged but some items failed to persist"
                );
                for failure in &failures {
                    error!(item = ?failure.item, reason = %failure.reason, "Unsaved item");
                }
            }
            Err(e) => {
                error!(target = %target, error = ?e, "Extension reconciliation failed");
            }
        }
    }
}
