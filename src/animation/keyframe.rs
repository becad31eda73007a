use std::io::{Read, Write};

use crate::animation::ease::Ease;
use crate::animation::timeline::RenderState;
use crate::foundation::core::{Complex, ViewBounds};
use crate::foundation::error::{ReelError, ReelResult};

/// Iteration family of a fractal view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FractalMode {
    /// `z0 = 0`, `c` = pixel.
    #[default]
    Mandelbrot,
    /// `z0` = pixel, `c` = the Julia constant.
    Julia,
}

/// A captured fractal view anchored on an animation timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    /// Identifier, unique within its animation.
    pub id: u64,
    /// Start of this keyframe on the timeline. Equals the sum of all preceding durations.
    pub timestamp_ms: u64,
    /// Length of the segment that starts at this keyframe. Ignored for the last keyframe.
    pub duration_ms: u64,
    /// Easing applied across the segment that starts at this keyframe.
    #[serde(default)]
    pub easing: Ease,
    /// Visible window of the complex plane.
    pub view_bounds: ViewBounds,
    /// Mandelbrot or Julia iteration.
    #[serde(default)]
    pub fractal_mode: FractalMode,
    /// Constant used in Julia mode.
    #[serde(default)]
    pub julia_constant: Complex,
    /// Iteration formula identifier.
    #[serde(default = "default_equation_id")]
    pub equation_id: u32,
    /// Escape-time iteration cap.
    pub max_iterations: u32,
    /// Palette identifier.
    #[serde(default)]
    pub palette_id: u32,
    /// Warm/cool color shift in `[-1, 1]`.
    #[serde(default)]
    pub color_temperature: f64,
    /// Opaque preview image (typically a PNG data URL); never read by the export pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

fn default_equation_id() -> u32 {
    1
}

impl Keyframe {
    /// The renderer-ready parameter set captured by this keyframe.
    pub fn snapshot(&self) -> RenderState {
        RenderState {
            view_bounds: self.view_bounds,
            fractal_mode: self.fractal_mode,
            julia_constant: self.julia_constant,
            equation_id: self.equation_id,
            max_iterations: self.max_iterations,
            palette_id: self.palette_id,
            color_temperature: self.color_temperature,
        }
    }
}

/// An ordered keyframe sequence with a contiguous timeline.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Animation {
    /// Display name, also used to derive export file names.
    #[serde(default)]
    pub name: String,
    /// Keyframes in timeline order.
    pub keyframes: Vec<Keyframe>,
}

impl Animation {
    /// Build an animation from keyframes, recomputing timestamps from durations.
    pub fn new(name: impl Into<String>, keyframes: Vec<Keyframe>) -> Self {
        let mut anim = Self {
            name: name.into(),
            keyframes,
        };
        anim.retime();
        anim
    }

    /// Sum of all keyframe durations except the last.
    pub fn total_duration_ms(&self) -> u64 {
        match self.keyframes.split_last() {
            Some((_, head)) => head.iter().map(|k| k.duration_ms).sum(),
            None => 0,
        }
    }

    /// Whether the animation has enough keyframes to be exported.
    pub fn is_exportable(&self) -> bool {
        self.keyframes.len() >= 2
    }

    /// Re-derive every `timestamp_ms` from the preceding durations.
    pub fn retime(&mut self) {
        let mut t = 0u64;
        for k in &mut self.keyframes {
            k.timestamp_ms = t;
            t = t.saturating_add(k.duration_ms);
        }
    }

    /// Check structural invariants: contiguity, positive segment durations, valid views,
    /// unique ids.
    pub fn validate(&self) -> ReelResult<()> {
        if self.keyframes.is_empty() {
            return Err(ReelError::validation("animation has no keyframes"));
        }

        let mut expected = 0u64;
        let last = self.keyframes.len() - 1;
        let mut ids = std::collections::HashSet::with_capacity(self.keyframes.len());
        for (i, k) in self.keyframes.iter().enumerate() {
            if !ids.insert(k.id) {
                return Err(ReelError::validation(format!(
                    "duplicate keyframe id {}",
                    k.id
                )));
            }
            if k.timestamp_ms != expected {
                return Err(ReelError::validation(format!(
                    "keyframe {i} timestamp {}ms breaks contiguity (expected {expected}ms)",
                    k.timestamp_ms
                )));
            }
            if i < last && k.duration_ms == 0 {
                return Err(ReelError::validation(format!(
                    "keyframe {i} has zero duration"
                )));
            }
            k.view_bounds.validate().map_err(|e| match e {
                ReelError::Validation(msg) => ReelError::validation(format!("keyframe {i}: {msg}")),
                other => other,
            })?;
            if k.max_iterations == 0 {
                return Err(ReelError::validation(format!(
                    "keyframe {i} max_iterations must be >= 1"
                )));
            }
            if !k.color_temperature.is_finite() {
                return Err(ReelError::validation(format!(
                    "keyframe {i} color_temperature must be finite"
                )));
            }
            expected = expected.saturating_add(k.duration_ms);
        }
        Ok(())
    }

    /// Read an animation from JSON.
    pub fn from_json_reader(r: impl Read) -> ReelResult<Self> {
        serde_json::from_reader(r).map_err(|e| ReelError::serde(e.to_string()))
    }

    /// Write an animation as pretty-printed JSON.
    pub fn to_json_writer(&self, w: impl Write) -> ReelResult<()> {
        serde_json::to_writer_pretty(w, self).map_err(|e| ReelError::serde(e.to_string()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/keyframe.rs"]
mod tests;
