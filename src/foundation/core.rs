use crate::foundation::error::{ReelError, ReelResult};

pub use kurbo::{Affine, Point};

/// Zero-based index of an output video frame.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// A point in the fractal parameter plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Complex {
    /// Real component.
    pub real: f64,
    /// Imaginary component.
    pub imag: f64,
}

impl Complex {
    /// Construct a complex value.
    pub const fn new(real: f64, imag: f64) -> Self {
        Self { real, imag }
    }
}

impl std::fmt::Display for Complex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.imag.is_sign_negative() {
            write!(f, "{} - {}i", self.real, -self.imag)
        } else {
            write!(f, "{} + {}i", self.real, self.imag)
        }
    }
}

/// Axis-aligned window onto the complex plane.
///
/// Invariant: `max_real > min_real` and `max_imag > min_imag`. Pixel `(0, 0)` maps to the
/// top-left corner `(min_real, max_imag)`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewBounds {
    /// Left edge.
    pub min_real: f64,
    /// Right edge.
    pub max_real: f64,
    /// Bottom edge.
    pub min_imag: f64,
    /// Top edge.
    pub max_imag: f64,
}

impl ViewBounds {
    /// Construct bounds, rejecting empty, inverted, or non-finite windows.
    pub fn new(min_real: f64, max_real: f64, min_imag: f64, max_imag: f64) -> ReelResult<Self> {
        let b = Self {
            min_real,
            max_real,
            min_imag,
            max_imag,
        };
        b.validate()?;
        Ok(b)
    }

    /// Bounds centered on `center` with the given half extents.
    pub fn from_center(center: Complex, half_real: f64, half_imag: f64) -> Self {
        Self {
            min_real: center.real - half_real,
            max_real: center.real + half_real,
            min_imag: center.imag - half_imag,
            max_imag: center.imag + half_imag,
        }
    }

    /// Check the bounds invariant.
    pub fn validate(&self) -> ReelResult<()> {
        let all_finite = [self.min_real, self.max_real, self.min_imag, self.max_imag]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(ReelError::validation("view bounds must be finite"));
        }
        if self.max_real <= self.min_real || self.max_imag <= self.min_imag {
            return Err(ReelError::validation(
                "view bounds require max_real > min_real and max_imag > min_imag",
            ));
        }
        Ok(())
    }

    /// Center of the window.
    pub fn center(&self) -> Complex {
        Complex::new(
            (self.min_real + self.max_real) / 2.0,
            (self.min_imag + self.max_imag) / 2.0,
        )
    }

    /// Half of the real span; the quantity zoom interpolation works on.
    pub fn half_range_real(&self) -> f64 {
        (self.max_real - self.min_real) / 2.0
    }

    /// Half of the imaginary span.
    pub fn half_range_imag(&self) -> f64 {
        (self.max_imag - self.min_imag) / 2.0
    }

    /// Full real span.
    pub fn width(&self) -> f64 {
        self.max_real - self.min_real
    }

    /// Full imaginary span.
    pub fn height(&self) -> f64 {
        self.max_imag - self.min_imag
    }

    /// Imaginary span over real span.
    pub fn aspect(&self) -> f64 {
        self.height() / self.width()
    }

    /// Same center and real span, imaginary span recomputed so a `width`×`height` raster has
    /// square pixels.
    pub fn fit_aspect(&self, width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            return *self;
        }
        let half_real = self.half_range_real();
        let half_imag = half_real * f64::from(height) / f64::from(width);
        Self::from_center(self.center(), half_real, half_imag)
    }

    /// Plane distance between adjacent pixel centers along each axis.
    pub fn pixel_step(&self, width: u32, height: u32) -> (f64, f64) {
        (
            self.width() / f64::from(width.max(1)),
            self.height() / f64::from(height.max(1)),
        )
    }

    /// Affine map from raster coordinates (y down) to the complex plane (imag up).
    pub fn pixel_to_plane(&self, width: u32, height: u32) -> Affine {
        let (sx, sy) = self.pixel_step(width, height);
        Affine::new([sx, 0.0, 0.0, -sy, self.min_real, self.max_imag])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
