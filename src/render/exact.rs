use rayon::prelude::*;

use crate::foundation::error::{ReelError, ReelResult};
use crate::render::backend::{FrameBackend, FrameRequest, RasterFrame, raster_len};
use crate::render::double_double::DoubleDouble;
use crate::render::fractal::{Shader, sample_offset, write_pixel};

/// Extended-precision backend.
///
/// Iterates in double-double arithmetic and fans rows out to a dedicated rayon pool; `render`
/// returns once every row has been joined. Building the pool is the setup cost that makes this
/// backend worth constructing lazily.
pub struct ExactBackend {
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for ExactBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExactBackend")
            .field("threads", &self.pool.as_ref().map(|p| p.current_num_threads()))
            .finish()
    }
}

impl ExactBackend {
    /// Create an exact backend with `threads` workers (`None` uses rayon defaults).
    pub fn new(threads: Option<usize>) -> ReelResult<Self> {
        Ok(Self {
            pool: Some(build_thread_pool(threads)?),
        })
    }
}

impl FrameBackend for ExactBackend {
    fn render(&mut self, req: &FrameRequest<'_>) -> ReelResult<RasterFrame> {
        let pool = self
            .pool
            .as_ref()
            .ok_or_else(|| ReelError::render("exact backend used after dispose"))?;
        let (w, h) = (req.width, req.height);
        raster_len(w, h)?;

        let bounds = req.state.view_bounds.fit_aspect(w, h);
        let (step_x, step_y) = bounds.pixel_step(w, h);
        let step_x = DoubleDouble::from_f64(step_x);
        let step_y = DoubleDouble::from_f64(step_y);
        let left = DoubleDouble::from_f64(bounds.min_real);
        let top = DoubleDouble::from_f64(bounds.max_imag);

        let shader = Shader::new(req.state);
        let grid = req.aa_grid.max(1);
        let samples = req.samples();

        let mut frame = RasterFrame::new(w, h)?;
        let row_bytes = w as usize * 4;

        pool.install(|| {
            frame
                .data
                .par_chunks_mut(row_bytes)
                .enumerate()
                .for_each(|(y, row)| {
                    for x in 0..w {
                        let mut acc = [0.0f32; 3];
                        for sy in 0..grid {
                            let fy = y as f64 + sample_offset(sy, grid);
                            let im = top - step_y * DoubleDouble::from_f64(fy);
                            for sx in 0..grid {
                                let fx = f64::from(x) + sample_offset(sx, grid);
                                let re = left + step_x * DoubleDouble::from_f64(fx);
                                let c = shader.color(re, im);
                                acc[0] += c[0];
                                acc[1] += c[1];
                                acc[2] += c[2];
                            }
                        }
                        let i = x as usize * 4;
                        write_pixel(&mut row[i..i + 4], acc, samples);
                    }
                });
        });

        Ok(frame)
    }

    fn dispose(&mut self) {
        self.pool = None;
    }
}

fn build_thread_pool(threads: Option<usize>) -> ReelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ReelError::validation(
            "exact backend 'threads' must be >= 1 when set",
        ));
    }
    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|i| format!("fractalreel-exact-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ReelError::render(format!("failed to build rayon thread pool: {e}")))
}
