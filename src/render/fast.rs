use rayon::prelude::*;

use crate::foundation::core::Point;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::backend::{FrameBackend, FrameRequest, RasterFrame, raster_len};
use crate::render::fractal::{Shader, sample_offset, write_pixel};

/// Tile edge in pixels.
const TILE: u32 = 64;

/// Single-precision tiled backend.
///
/// Plane coordinates are computed in `f64` and then narrowed to `f32` for iteration, the same
/// precision budget as a GPU fragment shader. Beyond roughly 10⁴× zoom the per-pixel step falls
/// under `f32` resolution and the image bands; [`crate::PrecisionSelector`] routes such frames
/// to the exact backend.
#[derive(Debug, Default)]
pub struct FastBackend {
    disposed: bool,
}

impl FastBackend {
    /// Create a fast backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameBackend for FastBackend {
    fn render(&mut self, req: &FrameRequest<'_>) -> ReelResult<RasterFrame> {
        if self.disposed {
            return Err(ReelError::render("fast backend used after dispose"));
        }
        let (w, h) = (req.width, req.height);
        raster_len(w, h)?;

        let bounds = req.state.view_bounds.fit_aspect(w, h);
        let to_plane = bounds.pixel_to_plane(w, h);
        let shader = Shader::new(req.state);
        let grid = req.aa_grid.max(1);
        let samples = req.samples();

        let mut frame = RasterFrame::new(w, h)?;
        let row_bytes = w as usize * 4;
        let band_bytes = row_bytes * TILE as usize;

        // One work item per band of TILE rows; each band walks its tiles left to right.
        frame
            .data
            .par_chunks_mut(band_bytes)
            .enumerate()
            .for_each(|(band, rows)| {
                let y0 = band as u32 * TILE;
                let band_h = (rows.len() / row_bytes) as u32;
                for tx in (0..w).step_by(TILE as usize) {
                    let tw = TILE.min(w - tx);
                    for ty in 0..band_h {
                        let py = f64::from(y0 + ty);
                        for x in tx..tx + tw {
                            let px = f64::from(x);
                            let mut acc = [0.0f32; 3];
                            for sy in 0..grid {
                                for sx in 0..grid {
                                    let p = to_plane
                                        * Point::new(
                                            px + sample_offset(sx, grid),
                                            py + sample_offset(sy, grid),
                                        );
                                    let c = shader.color(p.x as f32, p.y as f32);
                                    acc[0] += c[0];
                                    acc[1] += c[1];
                                    acc[2] += c[2];
                                }
                            }
                            let i = (ty as usize * w as usize + x as usize) * 4;
                            write_pixel(&mut rows[i..i + 4], acc, samples);
                        }
                    }
                }
            });

        Ok(frame)
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }
}
