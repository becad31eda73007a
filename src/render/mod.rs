//! Frame rendering.
//!
//! Backends turn a [`crate::RenderState`] into an RGBA8 [`backend::RasterFrame`]; the
//! [`renderer::FrameRenderer`] façade owns them for one export and routes frames between them.

/// Backend trait, frame types and the built-in provider.
pub mod backend;
pub(crate) mod double_double;
/// Extended-precision CPU backend.
pub mod exact;
/// Single-precision tiled backend.
pub mod fast;
pub(crate) mod fractal;
/// Text overlay composited onto frames.
pub mod overlay;
/// Fast/exact backend selection.
pub mod precision;
/// Backend ownership and dispatch for one export.
pub mod renderer;
