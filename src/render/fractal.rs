//! Escape-time iteration and coloring shared by the built-in backends.
//!
//! The iteration is generic over the scalar type so the fast backend runs it in `f32` and the
//! exact backend in double-double, with identical formulas and shading.

use std::ops::{Add, Mul, Neg, Sub};

use crate::animation::keyframe::FractalMode;
use crate::animation::timeline::RenderState;
use crate::render::double_double::DoubleDouble;

/// Squared escape radius. Large so the smooth iteration count is accurate.
const BAILOUT_SQR: f64 = 65_536.0;

/// Smooth iterations per full trip around a palette.
const PALETTE_CYCLE: f64 = 48.0;

/// Channel shift at `color_temperature = ±1`.
const TEMPERATURE_SHIFT: f32 = 48.0;

pub(crate) trait Real:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self> + Neg<Output = Self>
{
    fn from_f64(v: f64) -> Self;
    fn to_f64(self) -> f64;
    fn abs(self) -> Self;
}

impl Real for f32 {
    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn abs(self) -> Self {
        f32::abs(self)
    }
}

impl Real for DoubleDouble {
    #[inline]
    fn from_f64(v: f64) -> Self {
        DoubleDouble::from_f64(v)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        DoubleDouble::to_f64(self)
    }

    #[inline]
    fn abs(self) -> Self {
        DoubleDouble::abs(self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Equation {
    /// `z² + c`
    Quadratic,
    /// `z³ + c`
    Cubic,
    /// `z⁴ + c`
    Quartic,
    BurningShip,
    Tricorn,
}

impl Equation {
    /// Unknown ids fall back to the classic quadratic map.
    pub(crate) fn from_id(id: u32) -> Self {
        match id {
            2 => Self::Cubic,
            3 => Self::Quartic,
            4 => Self::BurningShip,
            5 => Self::Tricorn,
            _ => Self::Quadratic,
        }
    }

    fn power(self) -> f64 {
        match self {
            Self::Cubic => 3.0,
            Self::Quartic => 4.0,
            Self::Quadratic | Self::BurningShip | Self::Tricorn => 2.0,
        }
    }

    #[inline]
    fn step<R: Real>(self, x: R, y: R, cx: R, cy: R) -> (R, R) {
        let two = R::from_f64(2.0);
        match self {
            Self::Quadratic => (x * x - y * y + cx, two * x * y + cy),
            Self::Cubic => {
                let three = R::from_f64(3.0);
                let (x2, y2) = (x * x, y * y);
                (x * (x2 - three * y2) + cx, y * (three * x2 - y2) + cy)
            }
            Self::Quartic => {
                let a = x * x - y * y;
                let b = two * x * y;
                (a * a - b * b + cx, two * a * b + cy)
            }
            Self::BurningShip => {
                let (ax, ay) = (x.abs(), y.abs());
                (ax * ax - ay * ay + cx, two * ax * ay + cy)
            }
            Self::Tricorn => (x * x - y * y + cx, -(two * x * y) + cy),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Escape {
    pub(crate) iterations: u32,
    pub(crate) norm_sqr: f64,
    pub(crate) escaped: bool,
}

pub(crate) fn escape<R: Real>(eq: Equation, z0: (R, R), c: (R, R), max_iter: u32) -> Escape {
    let (mut x, mut y) = z0;
    let mut norm_sqr = 0.0;
    for n in 0..max_iter {
        norm_sqr = (x * x + y * y).to_f64();
        if norm_sqr > BAILOUT_SQR {
            return Escape {
                iterations: n,
                norm_sqr,
                escaped: true,
            };
        }
        (x, y) = eq.step(x, y, c.0, c.1);
    }
    Escape {
        iterations: max_iter,
        norm_sqr,
        escaped: false,
    }
}

const PALETTES: [&[[u8; 3]]; 5] = [
    // classic
    &[
        [0, 7, 100],
        [32, 107, 203],
        [237, 255, 255],
        [255, 170, 0],
        [0, 2, 0],
    ],
    // fire
    &[[20, 0, 0], [180, 20, 0], [255, 140, 0], [255, 240, 120], [90, 10, 0]],
    // ocean
    &[[0, 10, 30], [0, 80, 120], [40, 180, 200], [200, 250, 255], [0, 40, 80]],
    // grayscale
    &[[0, 0, 0], [255, 255, 255]],
    // rainbow
    &[
        [255, 0, 0],
        [255, 255, 0],
        [0, 255, 0],
        [0, 255, 255],
        [0, 0, 255],
        [255, 0, 255],
    ],
];

/// Per-frame coloring parameters derived from a [`RenderState`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct Shader {
    equation: Equation,
    mode: FractalMode,
    julia: (f64, f64),
    max_iterations: u32,
    palette: &'static [[u8; 3]],
    temperature: f32,
}

impl Shader {
    pub(crate) fn new(state: &RenderState) -> Self {
        Self {
            equation: Equation::from_id(state.equation_id),
            mode: state.fractal_mode,
            julia: (state.julia_constant.real, state.julia_constant.imag),
            max_iterations: state.max_iterations.max(1),
            palette: PALETTES
                .get(state.palette_id as usize)
                .copied()
                .unwrap_or(PALETTES[0]),
            temperature: state.color_temperature.clamp(-1.0, 1.0) as f32,
        }
    }

    /// Linear RGB (0..=255 scale) of the plane point `(re, im)`.
    #[inline]
    pub(crate) fn color<R: Real>(&self, re: R, im: R) -> [f32; 3] {
        let point = (re, im);
        let (z0, c) = match self.mode {
            FractalMode::Mandelbrot => ((R::from_f64(0.0), R::from_f64(0.0)), point),
            FractalMode::Julia => (
                point,
                (R::from_f64(self.julia.0), R::from_f64(self.julia.1)),
            ),
        };
        let e = escape(self.equation, z0, c, self.max_iterations);
        self.shade(e)
    }

    fn shade(&self, e: Escape) -> [f32; 3] {
        if !e.escaped {
            return [0.0; 3];
        }
        let log_mod = 0.5 * e.norm_sqr.ln();
        let mu = (f64::from(e.iterations) + 1.0 - log_mod.ln() / self.equation.power().ln())
            .max(0.0);
        let [r, g, b] = sample_palette(self.palette, (mu / PALETTE_CYCLE).fract());
        let shift = self.temperature * TEMPERATURE_SHIFT;
        [(r + shift).clamp(0.0, 255.0), g, (b - shift).clamp(0.0, 255.0)]
    }
}

fn sample_palette(stops: &[[u8; 3]], t: f64) -> [f32; 3] {
    let n = stops.len();
    let pos = t.clamp(0.0, 1.0) * n as f64;
    let i = (pos.floor() as usize).min(n - 1);
    let f = (pos - i as f64) as f32;
    let a = stops[i];
    let b = stops[(i + 1) % n];
    std::array::from_fn(|k| f32::from(a[k]) + (f32::from(b[k]) - f32::from(a[k])) * f)
}

/// Average `samples` accumulated colors into one opaque RGBA8 pixel.
#[inline]
pub(crate) fn write_pixel(dst: &mut [u8], acc: [f32; 3], samples: u32) {
    let inv = 1.0 / samples.max(1) as f32;
    for (d, a) in dst.iter_mut().zip(acc) {
        *d = (a * inv).round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = 255;
}

/// Sub-pixel offset of sample `i` on an `grid`×`grid` lattice.
#[inline]
pub(crate) fn sample_offset(i: u32, grid: u32) -> f64 {
    (f64::from(i) + 0.5) / f64::from(grid)
}

#[cfg(test)]
#[path = "../../tests/unit/render/fractal.rs"]
mod tests;
