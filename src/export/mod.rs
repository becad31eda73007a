//! The export pipeline: settings, progress, and the orchestrator that drives a run.

/// Export state machine and background handle.
pub mod orchestrator;
/// Progress reports and cancellation.
pub mod progress;
/// Export settings and exporter tuning.
pub mod settings;
