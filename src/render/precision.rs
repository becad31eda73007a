use crate::foundation::core::ViewBounds;
use crate::render::backend::BackendKind;

/// Zoom factor past which single-precision pixel steps start to band.
pub const DEFAULT_PRECISION_THRESHOLD: f64 = 12_500.0;

/// Real span treated as zoom 1× (the full Mandelbrot set, `-2..1`).
pub const DEFAULT_REFERENCE_RANGE: f64 = 3.0;

/// Export-time policy for choosing between the fast and exact backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrecisionMode {
    /// Exact backend only for frames zoomed past the threshold.
    #[default]
    Auto,
    /// Always the fast backend.
    Gpu,
    /// Always the exact backend.
    Cpu,
}

/// Decides per frame whether extended precision is needed.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PrecisionSelector {
    /// Zoom factor above which frames need the exact backend.
    pub threshold: f64,
    /// Real span that counts as zoom 1×.
    pub reference_range: f64,
}

impl Default for PrecisionSelector {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_PRECISION_THRESHOLD,
            reference_range: DEFAULT_REFERENCE_RANGE,
        }
    }
}

impl PrecisionSelector {
    /// `reference_range / (max_real - min_real)`.
    pub fn zoom_factor(&self, bounds: &ViewBounds) -> f64 {
        self.reference_range / bounds.width()
    }

    /// Whether `bounds` is zoomed deep enough to need the exact backend.
    pub fn needs_high_precision(&self, bounds: &ViewBounds) -> bool {
        self.zoom_factor(bounds) > self.threshold
    }

    /// Backend for a frame showing `bounds` under `mode`.
    pub fn select_backend(&self, mode: PrecisionMode, bounds: &ViewBounds) -> BackendKind {
        match mode {
            PrecisionMode::Gpu => BackendKind::Fast,
            PrecisionMode::Cpu => BackendKind::Exact,
            PrecisionMode::Auto => {
                if self.needs_high_precision(bounds) {
                    BackendKind::Exact
                } else {
                    BackendKind::Fast
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/precision.rs"]
mod tests;
