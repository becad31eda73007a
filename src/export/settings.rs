use std::io::Read;

use crate::encode::encoder::{Codec, Container, EncoderConfig};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::backend::MAX_RASTER_DIM;
use crate::render::overlay::OverlaySettings;
use crate::render::precision::{
    DEFAULT_PRECISION_THRESHOLD, DEFAULT_REFERENCE_RANGE, PrecisionMode, PrecisionSelector,
};

/// Supersampling quality tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntiAliasTier {
    /// 1×1.
    Off,
    /// 2×2.
    Low,
    /// 3×3.
    #[default]
    Medium,
    /// 4×4.
    High,
    /// 5×5.
    Ultra,
}

impl AntiAliasTier {
    /// Edge of the per-pixel sample grid.
    pub fn grid(self) -> u32 {
        match self {
            Self::Off => 1,
            Self::Low => 2,
            Self::Medium => 3,
            Self::High => 4,
            Self::Ultra => 5,
        }
    }
}

/// Output parameters of one export. Immutable for the duration of the run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Output container.
    pub container: Container,
    /// Frames per second, 30 or 60.
    pub fps: u32,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Encoder quality in `(0, 1]`.
    pub bitrate_quality: f64,
    /// Video codec.
    pub codec: Codec,
    /// Supersampling tier.
    pub anti_alias: AntiAliasTier,
    /// Fast/exact backend policy.
    pub precision: PrecisionMode,
    /// Text overlay; `None` disables it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<OverlaySettings>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            container: Container::Mp4,
            fps: 30,
            width: 1280,
            height: 720,
            bitrate_quality: 0.8,
            codec: Codec::H264,
            anti_alias: AntiAliasTier::default(),
            precision: PrecisionMode::Auto,
            overlay: None,
        }
    }
}

impl ExportSettings {
    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json_reader(r: impl Read) -> ReelResult<Self> {
        serde_json::from_reader(r).map_err(|e| ReelError::serde(e.to_string()))
    }

    /// Check every field before an export acquires anything.
    pub fn validate(&self) -> ReelResult<()> {
        if !matches!(self.fps, 30 | 60) {
            return Err(ReelError::validation(format!(
                "fps must be 30 or 60, got {}",
                self.fps
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ReelError::validation(
                "output width/height must be non-zero",
            ));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(ReelError::validation(format!(
                "output size must be even, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > MAX_RASTER_DIM || self.height > MAX_RASTER_DIM {
            return Err(ReelError::validation(format!(
                "output size {}x{} exceeds {MAX_RASTER_DIM}x{MAX_RASTER_DIM}",
                self.width, self.height
            )));
        }
        if !(self.bitrate_quality > 0.0 && self.bitrate_quality <= 1.0) {
            return Err(ReelError::validation(format!(
                "bitrate_quality must be in (0, 1], got {}",
                self.bitrate_quality
            )));
        }
        if !self.codec.fits(self.container) {
            return Err(ReelError::validation(format!(
                "codec {:?} is not supported in {:?}",
                self.codec, self.container
            )));
        }
        Ok(())
    }

    /// Encoder parameters for these settings.
    pub fn encoder_config(&self) -> EncoderConfig {
        EncoderConfig {
            width: self.width,
            height: self.height,
            fps: self.fps,
            bitrate_quality: self.bitrate_quality,
            codec: self.codec,
            container: self.container,
        }
    }
}

/// Runtime tuning of the exporter, independent of any one export.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    /// Zoom factor above which `auto` precision uses the exact backend.
    pub precision_threshold: f64,
    /// Real span counted as zoom 1×.
    pub reference_range: f64,
    /// Frames that may wait for the encoder before rendering blocks.
    pub queue_capacity: usize,
    /// Yield the thread every this many frames. `0` never yields.
    pub yield_every: u64,
    /// Worker threads for the exact backend. `None` uses rayon defaults.
    pub exact_threads: Option<usize>,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            precision_threshold: DEFAULT_PRECISION_THRESHOLD,
            reference_range: DEFAULT_REFERENCE_RANGE,
            queue_capacity: 4,
            yield_every: 5,
            exact_threads: None,
        }
    }
}

impl ExporterConfig {
    /// The precision selector these values describe.
    pub fn selector(&self) -> PrecisionSelector {
        PrecisionSelector {
            threshold: self.precision_threshold,
            reference_range: self.reference_range,
        }
    }

    /// Reject values that would silently disable `auto` precision or stall the queue.
    pub fn validate(&self) -> ReelResult<()> {
        if !(self.precision_threshold.is_finite() && self.precision_threshold > 0.0) {
            return Err(ReelError::validation(format!(
                "precision_threshold must be a positive finite zoom factor, got {}",
                self.precision_threshold
            )));
        }
        if !(self.reference_range.is_finite() && self.reference_range > 0.0) {
            return Err(ReelError::validation(format!(
                "reference_range must be positive and finite, got {}",
                self.reference_range
            )));
        }
        if self.queue_capacity == 0 {
            return Err(ReelError::validation("queue_capacity must be >= 1"));
        }
        if self.exact_threads == Some(0) {
            return Err(ReelError::validation("exact_threads must be >= 1 when set"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/settings.rs"]
mod tests;
