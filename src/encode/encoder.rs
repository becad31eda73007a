use std::path::PathBuf;

use crate::foundation::error::{ReelError, ReelResult};
use crate::render::backend::RasterFrame;

/// Output container format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    /// MPEG-4.
    #[default]
    Mp4,
    /// WebM.
    Webm,
}

impl Container {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
        }
    }

    /// MIME type of a finished file.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
            Self::Webm => "video/webm",
        }
    }
}

/// Video codec.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// H.264 / AVC.
    #[default]
    H264,
    /// H.265 / HEVC.
    H265,
    /// VP9.
    Vp9,
    /// AV1.
    Av1,
}

impl Codec {
    /// Whether this codec can be muxed into `container`.
    pub fn fits(self, container: Container) -> bool {
        match container {
            Container::Mp4 => matches!(self, Self::H264 | Self::H265 | Self::Av1),
            Container::Webm => matches!(self, Self::Vp9 | Self::Av1),
        }
    }
}

/// Parameters an encoder is started with.
#[derive(Clone, Debug, PartialEq)]
pub struct EncoderConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second.
    pub fps: u32,
    /// Quality in `(0, 1]`, scaled into a target bitrate.
    pub bitrate_quality: f64,
    /// Video codec.
    pub codec: Codec,
    /// Output container.
    pub container: Container,
}

impl EncoderConfig {
    /// Target bitrate in bits per second: `width · height · fps · 0.2 · quality`.
    pub fn bitrate_bps(&self) -> u64 {
        let pixels_per_sec = f64::from(self.width) * f64::from(self.height) * f64::from(self.fps);
        (pixels_per_sec * 0.2 * self.bitrate_quality.clamp(0.0, 1.0)).round() as u64
    }

    /// Byte length of one RGBA8 frame.
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    pub(crate) fn check_frame(&self, frame: &RasterFrame) -> ReelResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(ReelError::encoding(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        if frame.data.len() != self.frame_len() {
            return Err(ReelError::encoding(
                "frame.data size mismatch with width*height*4",
            ));
        }
        Ok(())
    }
}

/// Where the bytes of an encoded video live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaPayload {
    /// Held in memory.
    Bytes(Vec<u8>),
    /// Written to a file the receiver now owns.
    File(PathBuf),
}

/// A finished, encoded video.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaBlob {
    /// MIME type of the payload.
    pub mime_type: String,
    /// Encoded bytes.
    pub payload: MediaPayload,
}

/// A streaming video encoder.
///
/// Call order: `start` once, then any number of `add_frame`, then exactly one of `finish` or
/// `abort`. Frames arrive in timeline order.
pub trait VideoEncoder: Send {
    /// Prepare to receive frames.
    fn start(&mut self, cfg: &EncoderConfig) -> ReelResult<()>;
    /// Encode one frame.
    fn add_frame(&mut self, frame: &RasterFrame) -> ReelResult<()>;
    /// Flush and return the finished media.
    fn finish(&mut self) -> ReelResult<MediaBlob>;
    /// Stop and discard everything written so far.
    fn abort(&mut self);
}

/// Encoder that keeps raw RGBA frames in memory. Useful for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryEncoder {
    cfg: Option<EncoderConfig>,
    frames: u64,
    bytes: Vec<u8>,
}

impl InMemoryEncoder {
    /// MIME type of the blob produced by [`InMemoryEncoder::finish`].
    pub const MIME_TYPE: &'static str = "video/x-raw-rgba";

    /// Create an empty encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames received since `start`.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl VideoEncoder for InMemoryEncoder {
    fn start(&mut self, cfg: &EncoderConfig) -> ReelResult<()> {
        if cfg.width == 0 || cfg.height == 0 || cfg.fps == 0 {
            return Err(ReelError::encoding(
                "in-memory encoder needs non-zero size and fps",
            ));
        }
        self.cfg = Some(cfg.clone());
        self.frames = 0;
        self.bytes.clear();
        Ok(())
    }

    fn add_frame(&mut self, frame: &RasterFrame) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::encoding("in-memory encoder not started"))?;
        cfg.check_frame(frame)?;
        self.bytes.extend_from_slice(&frame.data);
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> ReelResult<MediaBlob> {
        self.cfg
            .take()
            .ok_or_else(|| ReelError::encoding("in-memory encoder not started"))?;
        Ok(MediaBlob {
            mime_type: Self::MIME_TYPE.to_string(),
            payload: MediaPayload::Bytes(std::mem::take(&mut self.bytes)),
        })
    }

    fn abort(&mut self) {
        self.cfg = None;
        self.bytes.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/encoder.rs"]
mod tests;
