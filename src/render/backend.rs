use crate::animation::timeline::RenderState;
use crate::foundation::error::{ReelError, ReelResult};

/// A rendered frame as RGBA8 pixels.
///
/// Built-in backends emit opaque frames, so premultiplied and straight alpha coincide. The
/// `premultiplied` flag is kept explicit for frames composed elsewhere.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl RasterFrame {
    /// Allocate an all-transparent frame.
    pub fn new(width: u32, height: u32) -> ReelResult<Self> {
        let len = raster_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0u8; len],
            premultiplied: true,
        })
    }

    /// RGBA bytes of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let p = self.data.get(i..i + 4)?;
        Some([p[0], p[1], p[2], p[3]])
    }
}

/// Largest accepted raster edge, in pixels.
pub const MAX_RASTER_DIM: u32 = 16_384;

/// Byte length of a `width`×`height` RGBA8 raster, rejecting empty or oversized surfaces.
pub fn raster_len(width: u32, height: u32) -> ReelResult<usize> {
    if width == 0 || height == 0 {
        return Err(ReelError::validation(
            "raster surface width/height must be non-zero",
        ));
    }
    if width > MAX_RASTER_DIM || height > MAX_RASTER_DIM {
        return Err(ReelError::validation(format!(
            "raster surface too large: {width}x{height} (max {MAX_RASTER_DIM}x{MAX_RASTER_DIM})"
        )));
    }
    Ok((width as usize) * (height as usize) * 4)
}

/// One frame to render.
#[derive(Clone, Copy, Debug)]
pub struct FrameRequest<'a> {
    /// Parameters to render.
    pub state: &'a RenderState,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Supersampling grid edge; each pixel averages `aa_grid²` samples. `0` is treated as `1`.
    pub aa_grid: u32,
}

impl FrameRequest<'_> {
    /// Total samples per pixel.
    pub fn samples(&self) -> u32 {
        let g = self.aa_grid.max(1);
        g * g
    }
}

/// Which of the two rendering backends a frame goes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Fast single-precision tiled backend.
    Fast,
    /// Slow extended-precision backend.
    Exact,
}

impl BackendKind {
    /// The other backend.
    pub fn other(self) -> Self {
        match self {
            Self::Fast => Self::Exact,
            Self::Exact => Self::Fast,
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Fast => "fast",
            Self::Exact => "exact",
        })
    }
}

/// A fractal frame renderer.
///
/// Backends may hold expensive state (thread pools, device handles). [`FrameBackend::dispose`]
/// releases it; callers invoke it exactly once and never render afterwards.
pub trait FrameBackend: Send {
    /// Render one frame.
    fn render(&mut self, req: &FrameRequest<'_>) -> ReelResult<RasterFrame>;

    /// Release backend resources.
    fn dispose(&mut self);
}

/// Constructs backends on demand.
pub trait BackendProvider: Send + Sync {
    /// Create a new backend instance of `kind`.
    fn create(&self, kind: BackendKind) -> ReelResult<Box<dyn FrameBackend>>;
}

/// Provider for the built-in [`crate::FastBackend`] and [`crate::ExactBackend`].
#[derive(Clone, Debug, Default)]
pub struct BuiltinBackends {
    /// Worker thread count for the exact backend. `None` uses rayon defaults.
    pub exact_threads: Option<usize>,
}

impl BackendProvider for BuiltinBackends {
    fn create(&self, kind: BackendKind) -> ReelResult<Box<dyn FrameBackend>> {
        match kind {
            BackendKind::Fast => Ok(Box::new(crate::render::fast::FastBackend::new())),
            BackendKind::Exact => Ok(Box::new(crate::render::exact::ExactBackend::new(
                self.exact_threads,
            )?)),
        }
    }
}
