use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

/// Stage of an export run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportPhase {
    /// Validating input and acquiring backends and the encoder.
    Preparing,
    /// Rendering and encoding frames.
    Rendering,
    /// Flushing the encoder.
    Finalizing,
    /// Media delivered.
    Complete,
}

impl std::fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Preparing => "preparing",
            Self::Rendering => "rendering",
            Self::Finalizing => "finalizing",
            Self::Complete => "complete",
        })
    }
}

/// One progress report.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExportProgress {
    /// Current phase.
    pub phase: ExportPhase,
    /// Frames handed to the encoder so far.
    pub current_frame: u64,
    /// Frames in the export.
    pub total_frames: u64,
    /// Completion in `[0, 100]`, non-decreasing within a run.
    pub percent: f64,
}

/// Cooperative cancellation flag shared between an export and whoever may cancel it.
///
/// The export checks it once per frame boundary, never mid-frame.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Sends progress for one run, keeping `percent` monotonic.
pub(crate) struct ProgressReporter<'a> {
    tx: Option<&'a Sender<ExportProgress>>,
    phase: Option<ExportPhase>,
    percent: f64,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) fn new(tx: Option<&'a Sender<ExportProgress>>) -> Self {
        Self {
            tx,
            phase: None,
            percent: 0.0,
        }
    }

    pub(crate) fn report(&mut self, phase: ExportPhase, current_frame: u64, total_frames: u64) {
        if self.phase != Some(phase) {
            tracing::info!(%phase, total_frames, "export phase");
            self.phase = Some(phase);
        }
        let raw = match phase {
            ExportPhase::Preparing => 0.0,
            ExportPhase::Rendering if total_frames > 0 => {
                current_frame as f64 / total_frames as f64 * 100.0
            }
            ExportPhase::Rendering => 0.0,
            ExportPhase::Finalizing | ExportPhase::Complete => 100.0,
        };
        self.percent = self.percent.max(raw.clamp(0.0, 100.0));

        if let Some(tx) = self.tx {
            // A dropped receiver only means nobody is watching.
            let _ = tx.send(ExportProgress {
                phase,
                current_frame,
                total_frames,
                percent: self.percent,
            });
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/progress.rs"]
mod tests;
