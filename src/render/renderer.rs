use crate::foundation::error::{ReelError, ReelResult};
use crate::render::backend::{
    BackendKind, BackendProvider, FrameBackend, FrameRequest, RasterFrame,
};

/// Supersampling cap for the exact backend (3×3 = 9 samples per pixel).
pub const MAX_EXACT_AA_GRID: u32 = 3;

/// Per-backend frame counters for one renderer lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RendererStats {
    /// Frames rendered by the fast backend.
    pub fast_frames: u64,
    /// Frames rendered by the exact backend.
    pub exact_frames: u64,
}

enum Slot {
    Untried,
    Ready(Box<dyn FrameBackend>),
    Unavailable(String),
    Disposed,
}

impl Slot {
    fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// The backend a frame is dispatched to.
enum Active<'a> {
    Fast(&'a mut Box<dyn FrameBackend>),
    Exact(&'a mut Box<dyn FrameBackend>),
}

impl Active<'_> {
    fn render(self, req: &FrameRequest<'_>) -> ReelResult<(BackendKind, RasterFrame)> {
        match self {
            Self::Fast(b) => Ok((BackendKind::Fast, b.render(req)?)),
            Self::Exact(b) => {
                let capped = FrameRequest {
                    aa_grid: req.aa_grid.clamp(1, MAX_EXACT_AA_GRID),
                    ..*req
                };
                Ok((BackendKind::Exact, b.render(&capped)?))
            }
        }
    }
}

/// Owns both backends for the lifetime of one export.
///
/// The fast backend is created up front; the exact backend only on its first frame. Every
/// backend that was created is disposed exactly once, by [`FrameRenderer::dispose`] or, failing
/// that, on drop. If the requested backend cannot be created the other one renders the frame;
/// when neither is usable the frame fails with [`ReelError::RendererUnavailable`].
pub struct FrameRenderer<'p> {
    provider: &'p dyn BackendProvider,
    fast: Slot,
    exact: Slot,
    stats: RendererStats,
}

impl<'p> FrameRenderer<'p> {
    /// Acquire backends from `provider`.
    pub fn acquire(provider: &'p dyn BackendProvider) -> Self {
        let mut r = Self {
            provider,
            fast: Slot::Untried,
            exact: Slot::Untried,
            stats: RendererStats::default(),
        };
        r.ensure(BackendKind::Fast);
        r
    }

    /// Render `req` on `kind`, falling back to the other backend only if `kind` is unavailable.
    /// Returns the backend that actually rendered the frame.
    pub fn render_frame(
        &mut self,
        kind: BackendKind,
        req: &FrameRequest<'_>,
    ) -> ReelResult<(BackendKind, RasterFrame)> {
        let chosen = if self.ensure(kind) {
            kind
        } else if self.ensure(kind.other()) {
            tracing::warn!(
                requested = %kind,
                using = %kind.other(),
                "backend unavailable, falling back"
            );
            kind.other()
        } else {
            return Err(ReelError::renderer_unavailable(format!(
                "no usable backend (fast: {}, exact: {})",
                self.describe(BackendKind::Fast),
                self.describe(BackendKind::Exact)
            )));
        };

        let active = match (chosen, &mut self.fast, &mut self.exact) {
            (BackendKind::Fast, Slot::Ready(b), _) => Active::Fast(b),
            (BackendKind::Exact, _, Slot::Ready(b)) => Active::Exact(b),
            _ => {
                return Err(ReelError::renderer_unavailable(format!(
                    "{chosen} backend is not ready"
                )));
            }
        };
        let (used, frame) = active.render(req)?;
        match used {
            BackendKind::Fast => self.stats.fast_frames += 1,
            BackendKind::Exact => self.stats.exact_frames += 1,
        }
        Ok((used, frame))
    }

    /// Frame counters so far.
    pub fn stats(&self) -> RendererStats {
        self.stats
    }

    /// Dispose every created backend. Idempotent; later renders fail.
    pub fn dispose(&mut self) {
        for (kind, slot) in [
            (BackendKind::Fast, &mut self.fast),
            (BackendKind::Exact, &mut self.exact),
        ] {
            if let Slot::Ready(mut b) = std::mem::replace(slot, Slot::Disposed) {
                b.dispose();
                tracing::debug!(backend = %kind, "disposed backend");
            }
        }
    }

    /// Make sure the backend for `kind` exists; returns whether it is usable.
    fn ensure(&mut self, kind: BackendKind) -> bool {
        let provider = self.provider;
        let slot = self.slot_mut(kind);
        if let Slot::Untried = slot {
            *slot = match provider.create(kind) {
                Ok(b) => {
                    tracing::debug!(backend = %kind, "created backend");
                    Slot::Ready(b)
                }
                Err(e) => {
                    tracing::warn!(backend = %kind, error = %e, "backend unavailable");
                    Slot::Unavailable(e.to_string())
                }
            };
        }
        slot.is_ready()
    }

    fn slot_mut(&mut self, kind: BackendKind) -> &mut Slot {
        match kind {
            BackendKind::Fast => &mut self.fast,
            BackendKind::Exact => &mut self.exact,
        }
    }

    fn describe(&self, kind: BackendKind) -> String {
        let slot = match kind {
            BackendKind::Fast => &self.fast,
            BackendKind::Exact => &self.exact,
        };
        match slot {
            Slot::Untried => "not created".to_string(),
            Slot::Ready(_) => "ready".to_string(),
            Slot::Unavailable(e) => e.clone(),
            Slot::Disposed => "disposed".to_string(),
        }
    }
}

impl Drop for FrameRenderer<'_> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
