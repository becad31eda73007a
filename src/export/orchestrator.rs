use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use crate::animation::keyframe::Animation;
use crate::animation::timeline::{frame_count, frame_time_ms, state_at_for_output};
use crate::encode::delivery::{
    DeliveredMedia, MediaDelivery, check_file_name, export_file_name,
};
use crate::encode::encoder::{MediaBlob, MediaPayload, VideoEncoder};
use crate::encode::stream::StreamingEncoder;
use crate::export::progress::{CancelToken, ExportPhase, ExportProgress, ProgressReporter};
use crate::export::settings::{ExportSettings, ExporterConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::backend::{
    BackendKind, BackendProvider, BuiltinBackends, FrameRequest, RasterFrame, raster_len,
};
use crate::render::overlay::{OverlayInfo, OverlayRenderer};
use crate::render::renderer::FrameRenderer;

/// What to export.
#[derive(Clone, Debug)]
pub struct ExportRequest {
    /// The animation, read-only for the duration of the export.
    pub animation: Animation,
    /// Output settings.
    pub settings: ExportSettings,
    /// File name to deliver under. Derived from the animation name when `None`.
    pub file_name: Option<String>,
}

impl ExportRequest {
    /// Export `animation` with `settings` under the derived file name.
    pub fn new(animation: Animation, settings: ExportSettings) -> Self {
        Self {
            animation,
            settings,
            file_name: None,
        }
    }

    /// The file name the media will be delivered under.
    pub fn file_name(&self) -> String {
        self.file_name.clone().unwrap_or_else(|| {
            export_file_name(&self.animation.name, self.settings.container)
        })
    }
}

/// Terminal result of an export that did not fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Every frame was encoded and the media delivered.
    Completed(DeliveredMedia),
    /// Cancelled by the user. Nothing was finished or delivered.
    Cancelled,
}

/// Runs exports: interpolate, render, encode, deliver.
///
/// One call to [`Exporter::run`] is one export run. It owns its renderer backends and encoder
/// exclusively; both are released exactly once whichever way the run ends.
#[derive(Clone)]
pub struct Exporter {
    config: ExporterConfig,
    backends: Arc<dyn BackendProvider>,
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Exporter {
    /// An exporter drawing backends from `backends`.
    pub fn new(config: ExporterConfig, backends: Arc<dyn BackendProvider>) -> Self {
        Self { config, backends }
    }

    /// An exporter using the built-in fast and exact backends.
    pub fn builtin(config: ExporterConfig) -> Self {
        let backends = BuiltinBackends {
            exact_threads: config.exact_threads,
        };
        Self::new(config, Arc::new(backends))
    }

    /// Runtime configuration.
    pub fn config(&self) -> &ExporterConfig {
        &self.config
    }

    /// Export `req` through `encoder` and hand the result to `delivery`.
    ///
    /// Progress goes to `progress` after every frame. `cancel` is checked before each frame;
    /// a cancelled run aborts the encoder and returns [`ExportOutcome::Cancelled`].
    #[tracing::instrument(skip_all, fields(animation = %req.animation.name))]
    pub fn run(
        &self,
        req: &ExportRequest,
        encoder: Box<dyn VideoEncoder>,
        delivery: &dyn MediaDelivery,
        progress: Option<&Sender<ExportProgress>>,
        cancel: &CancelToken,
    ) -> ReelResult<ExportOutcome> {
        let settings = &req.settings;
        self.config.validate()?;
        validate_request(req)?;

        let total = frame_count(req.animation.total_duration_ms(), settings.fps);
        let mut progress = ProgressReporter::new(progress);
        progress.report(ExportPhase::Preparing, 0, total);
        tracing::info!(
            frames = total,
            width = settings.width,
            height = settings.height,
            fps = settings.fps,
            "starting export"
        );

        let overlay = settings.overlay.clone().map(OverlayRenderer::new);
        let mut renderer = FrameRenderer::acquire(self.backends.as_ref());
        let mut stream = match StreamingEncoder::start(
            encoder,
            &settings.encoder_config(),
            self.config.queue_capacity,
        ) {
            Ok(stream) => stream,
            Err(e) => {
                renderer.dispose();
                return Err(e);
            }
        };

        let rendered = self.render_frames(
            req,
            total,
            &mut renderer,
            overlay.as_ref(),
            &mut stream,
            &mut progress,
            cancel,
        );
        renderer.dispose();
        let stats = renderer.stats();
        tracing::debug!(
            fast = stats.fast_frames,
            exact = stats.exact_frames,
            "rendering finished"
        );

        let finished = match rendered {
            Ok(true) => {
                progress.report(ExportPhase::Finalizing, total, total);
                stream.finish().map(Some)
            }
            Ok(false) => Ok(None),
            Err(e) => Err(e),
        };
        // No-op once finished; otherwise releases the encoder and discards its output.
        stream.abort();

        let Some(blob) = finished? else {
            tracing::info!("export cancelled");
            return Ok(ExportOutcome::Cancelled);
        };
        let delivered = deliver_or_discard(delivery, blob, &req.file_name())?;
        progress.report(ExportPhase::Complete, total, total);
        Ok(ExportOutcome::Completed(delivered))
    }

    /// Render the frame at `t_ms` as it would appear in an export with `settings`.
    #[tracing::instrument(skip(self, animation, settings))]
    pub fn render_still(
        &self,
        animation: &Animation,
        settings: &ExportSettings,
        t_ms: f64,
    ) -> ReelResult<(BackendKind, RasterFrame)> {
        self.config.validate()?;
        animation.validate()?;
        raster_len(settings.width, settings.height)?;

        let state = state_at_for_output(
            &animation.keyframes,
            t_ms,
            settings.width,
            settings.height,
        );
        let selector = self.config.selector();
        let kind = selector.select_backend(settings.precision, &state.view_bounds);
        let mut renderer = FrameRenderer::acquire(self.backends.as_ref());
        let rendered = renderer.render_frame(
            kind,
            &FrameRequest {
                state: &state,
                width: settings.width,
                height: settings.height,
                aa_grid: settings.anti_alias.grid(),
            },
        );
        renderer.dispose();
        let (used, mut frame) = rendered?;

        if let Some(overlay) = settings.overlay.clone() {
            let total = frame_count(animation.total_duration_ms(), settings.fps);
            let index = (t_ms.max(0.0) * f64::from(settings.fps) / 1000.0).floor() as u64;
            OverlayRenderer::new(overlay).compose(
                &mut frame,
                &OverlayInfo {
                    zoom: selector.zoom_factor(&state.view_bounds),
                    center: state.view_bounds.center(),
                    frame: FrameIndex(index.min(total.saturating_sub(1))),
                    total_frames: total,
                },
            )?;
        }
        Ok((used, frame))
    }

    /// The rendering phase. Returns `false` when cancelled.
    #[allow(clippy::too_many_arguments)]
    fn render_frames(
        &self,
        req: &ExportRequest,
        total: u64,
        renderer: &mut FrameRenderer<'_>,
        overlay: Option<&OverlayRenderer>,
        stream: &mut StreamingEncoder,
        progress: &mut ProgressReporter<'_>,
        cancel: &CancelToken,
    ) -> ReelResult<bool> {
        let settings = &req.settings;
        let keyframes = &req.animation.keyframes;
        let selector = self.config.selector();
        let aa_grid = settings.anti_alias.grid();
        let mut current = None;

        for i in 0..total {
            if cancel.is_cancelled() {
                tracing::info!(frame = i, "cancellation requested");
                return Ok(false);
            }

            let t_ms = frame_time_ms(i, settings.fps);
            let state = state_at_for_output(keyframes, t_ms, settings.width, settings.height);
            let kind = selector.select_backend(settings.precision, &state.view_bounds);
            if current != Some(kind) {
                tracing::debug!(frame = i, backend = %kind, "backend selected");
                current = Some(kind);
            }

            let (_, mut frame) = renderer.render_frame(
                kind,
                &FrameRequest {
                    state: &state,
                    width: settings.width,
                    height: settings.height,
                    aa_grid,
                },
            )?;
            if let Some(overlay) = overlay {
                overlay.compose(
                    &mut frame,
                    &OverlayInfo {
                        zoom: selector.zoom_factor(&state.view_bounds),
                        center: state.view_bounds.center(),
                        frame: FrameIndex(i),
                        total_frames: total,
                    },
                )?;
            }
            stream.add_frame(frame)?;
            progress.report(ExportPhase::Rendering, i + 1, total);

            let every = self.config.yield_every;
            if every > 0 && (i + 1) % every == 0 {
                std::thread::yield_now();
            }
        }
        Ok(true)
    }
}

/// Fail fast, before any backend or encoder exists.
fn validate_request(req: &ExportRequest) -> ReelResult<()> {
    if !req.animation.is_exportable() {
        return Err(ReelError::validation(format!(
            "an animation needs at least 2 keyframes to export, got {}",
            req.animation.keyframes.len()
        )));
    }
    req.animation.validate()?;
    req.settings.validate()?;
    raster_len(req.settings.width, req.settings.height)?;
    check_file_name(&req.file_name())
}

/// Deliver `blob`; on failure remove a file-backed blob so a failed run leaves nothing behind.
fn deliver_or_discard(
    delivery: &dyn MediaDelivery,
    blob: MediaBlob,
    filename: &str,
) -> ReelResult<DeliveredMedia> {
    let source = match &blob.payload {
        MediaPayload::File(path) => Some(path.clone()),
        MediaPayload::Bytes(_) => None,
    };
    delivery.deliver(blob, filename).inspect_err(|e| {
        let Some(path) = source else { return };
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "delivery failed, discarded encoded media"
            ),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!(
                path = %path.display(),
                error = %err,
                "failed to discard encoded media"
            ),
        }
    })
}

/// A running background export.
pub struct ExportHandle {
    progress: Receiver<ExportProgress>,
    cancel: CancelToken,
    join: JoinHandle<ReelResult<ExportOutcome>>,
}

impl ExportHandle {
    /// Progress reports, in order. Ends when the export does.
    pub fn progress(&self) -> &Receiver<ExportProgress> {
        &self.progress
    }

    /// A token that cancels this export.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Request cancellation. Takes effect at the next frame boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the export thread has exited.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Block until the export ends.
    pub fn wait(self) -> ReelResult<ExportOutcome> {
        self.join
            .join()
            .map_err(|_| ReelError::Other(anyhow::anyhow!("export thread panicked")))?
    }
}

/// Run an export on its own thread.
pub fn spawn_export(
    exporter: Exporter,
    req: ExportRequest,
    encoder: Box<dyn VideoEncoder>,
    delivery: Box<dyn MediaDelivery>,
) -> ReelResult<ExportHandle> {
    let (tx, rx) = mpsc::channel();
    let cancel = CancelToken::new();
    let token = cancel.clone();
    let join = std::thread::Builder::new()
        .name("fractalreel-export".to_string())
        .spawn(move || exporter.run(&req, encoder, delivery.as_ref(), Some(&tx), &token))
        .map_err(|e| ReelError::Other(anyhow::anyhow!("failed to spawn export thread: {e}")))?;
    Ok(ExportHandle {
        progress: rx,
        cancel,
        join,
    })
}
