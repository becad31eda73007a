//! fractalreel renders keyframed fractal zoom animations to video.
//!
//! An export samples an [`Animation`] timeline once per output frame, renders each
//! [`RenderState`] on either a fast single-precision backend or an exact double-double backend
//! (chosen per frame by zoom depth), and streams the frames into a [`VideoEncoder`]:
//!
//! - Build or load an [`Animation`] (see [`AnimationSession`] for editing)
//! - Pick [`ExportSettings`]
//! - Call [`Exporter::run`], or [`spawn_export`] for a background run with progress and
//!   cancellation
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Keyframes, easing, and timeline sampling.
pub mod animation;
/// Video encoders and media delivery.
pub mod encode;
/// Export orchestration.
pub mod export;
/// Fractal rendering backends.
pub mod render;

pub use crate::foundation::core::{Affine, Complex, FrameIndex, Point, ViewBounds};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::keyframe::{Animation, FractalMode, Keyframe};
pub use crate::animation::session::AnimationSession;
pub use crate::animation::timeline::{
    RenderState, frame_count, frame_time_ms, state_at, state_at_for_output,
};
pub use crate::encode::delivery::{
    DeliveredMedia, DirectoryDelivery, MediaDelivery, export_file_name,
};
pub use crate::encode::encoder::{
    Codec, Container, EncoderConfig, InMemoryEncoder, MediaBlob, MediaPayload, VideoEncoder,
};
pub use crate::encode::ffmpeg::{FfmpegEncoder, FfmpegEncoderOpts, is_ffmpeg_on_path};
pub use crate::encode::stream::StreamingEncoder;
pub use crate::export::orchestrator::{
    ExportHandle, ExportOutcome, ExportRequest, Exporter, spawn_export,
};
pub use crate::export::progress::{CancelToken, ExportPhase, ExportProgress};
pub use crate::export::settings::{AntiAliasTier, ExportSettings, ExporterConfig};
pub use crate::render::backend::{
    BackendKind, BackendProvider, BuiltinBackends, FrameBackend, FrameRequest, RasterFrame,
};
pub use crate::render::exact::ExactBackend;
pub use crate::render::fast::FastBackend;
pub use crate::render::overlay::{OverlayCorner, OverlayInfo, OverlayRenderer, OverlaySettings};
pub use crate::render::precision::{PrecisionMode, PrecisionSelector};
pub use crate::render::renderer::{FrameRenderer, RendererStats};
