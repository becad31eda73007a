//! Keyframe timeline sampling.
//!
//! Continuous fields blend across a segment using the segment's easing. The view center moves
//! linearly while the zoom half-range is interpolated in log space, so a linear segment zooms
//! at a constant perceived rate. Discrete fields (mode, equation, palette) hold the segment
//! start's value and switch exactly at the next keyframe's timestamp.

use crate::animation::keyframe::{FractalMode, Keyframe};
use crate::foundation::core::{Complex, ViewBounds};
use crate::foundation::math::{lerp, lerp_log};

/// Fully resolved parameters for rendering one instant of an animation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderState {
    /// Visible window of the complex plane.
    pub view_bounds: ViewBounds,
    /// Mandelbrot or Julia iteration.
    pub fractal_mode: FractalMode,
    /// Constant used in Julia mode.
    pub julia_constant: Complex,
    /// Iteration formula identifier.
    pub equation_id: u32,
    /// Escape-time iteration cap (>= 1).
    pub max_iterations: u32,
    /// Palette identifier.
    pub palette_id: u32,
    /// Warm/cool color shift in `[-1, 1]`.
    pub color_temperature: f64,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            view_bounds: ViewBounds {
                min_real: -2.0,
                max_real: 1.0,
                min_imag: -1.5,
                max_imag: 1.5,
            },
            fractal_mode: FractalMode::Mandelbrot,
            julia_constant: Complex::default(),
            equation_id: 1,
            max_iterations: 256,
            palette_id: 0,
            color_temperature: 0.0,
        }
    }
}

/// Sample the timeline at `t_ms`.
///
/// Total: times before the first keyframe return its snapshot, times at or after the last
/// keyframe return the last snapshot, and a time exactly on a keyframe's timestamp returns that
/// keyframe's snapshot unchanged. An empty slice yields [`RenderState::default`].
///
/// Inside a segment the imaginary half-range follows the interpolated real half-range using
/// the aspect ratio of the two keyframe views.
pub fn state_at(keyframes: &[Keyframe], t_ms: f64) -> RenderState {
    sample(keyframes, t_ms, None)
}

/// Like [`state_at`], but derives the imaginary half-range from a `width`×`height` output so
/// interpolated frames are never stretched.
pub fn state_at_for_output(
    keyframes: &[Keyframe],
    t_ms: f64,
    width: u32,
    height: u32,
) -> RenderState {
    let aspect = (width > 0 && height > 0).then(|| f64::from(height) / f64::from(width));
    sample(keyframes, t_ms, aspect)
}

fn sample(keyframes: &[Keyframe], t_ms: f64, aspect: Option<f64>) -> RenderState {
    let (Some(first), Some(last)) = (keyframes.first(), keyframes.last()) else {
        return RenderState::default();
    };
    if t_ms.is_nan() || t_ms <= first.timestamp_ms as f64 {
        return first.snapshot();
    }
    if t_ms >= last.timestamp_ms as f64 {
        return last.snapshot();
    }

    // First keyframe strictly after `t_ms`. Clamped so a malformed (unsorted) list still
    // yields a valid segment instead of panicking.
    let next = keyframes
        .partition_point(|k| (k.timestamp_ms as f64) <= t_ms)
        .clamp(1, keyframes.len() - 1);
    let from = &keyframes[next - 1];
    let to = &keyframes[next];

    let elapsed = t_ms - from.timestamp_ms as f64;
    if elapsed <= 0.0 {
        return from.snapshot();
    }
    let local_t = if from.duration_ms == 0 {
        1.0
    } else {
        (elapsed / from.duration_ms as f64).clamp(0.0, 1.0)
    };
    let t = from.easing.apply(local_t);

    blend(from, to, t, aspect)
}

fn blend(from: &Keyframe, to: &Keyframe, t: f64, aspect: Option<f64>) -> RenderState {
    let (b0, b1) = (from.view_bounds, to.view_bounds);
    let (c0, c1) = (b0.center(), b1.center());
    let center = Complex::new(lerp(c0.real, c1.real, t), lerp(c0.imag, c1.imag, t));

    let half_real = lerp_log(b0.half_range_real(), b1.half_range_real(), t);
    let aspect = aspect.unwrap_or_else(|| lerp(b0.aspect(), b1.aspect(), t));
    let half_imag = half_real * aspect;

    let max_iterations = lerp(
        f64::from(from.max_iterations),
        f64::from(to.max_iterations),
        t,
    )
    .round()
    .max(1.0) as u32;

    RenderState {
        view_bounds: ViewBounds::from_center(center, half_real, half_imag),
        fractal_mode: from.fractal_mode,
        julia_constant: Complex::new(
            lerp(from.julia_constant.real, to.julia_constant.real, t),
            lerp(from.julia_constant.imag, to.julia_constant.imag, t),
        ),
        equation_id: from.equation_id,
        max_iterations,
        palette_id: from.palette_id,
        color_temperature: lerp(from.color_temperature, to.color_temperature, t).clamp(-1.0, 1.0),
    }
}

/// Number of output frames for an animation of `total_duration_ms` at `fps`.
///
/// `ceil(total_duration_ms / 1000 * fps)`, computed in integers.
pub fn frame_count(total_duration_ms: u64, fps: u32) -> u64 {
    total_duration_ms
        .saturating_mul(u64::from(fps))
        .div_ceil(1000)
}

/// Timeline position of `frame` at `fps`.
pub fn frame_time_ms(frame: u64, fps: u32) -> f64 {
    if fps == 0 {
        return 0.0;
    }
    frame as f64 * 1000.0 / f64::from(fps)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
