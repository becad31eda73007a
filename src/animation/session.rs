use crate::animation::ease::Ease;
use crate::animation::keyframe::{Animation, Keyframe};
use crate::animation::timeline::RenderState;
use crate::foundation::error::{ReelError, ReelResult};

/// Editing session that exclusively owns one [`Animation`].
///
/// Every edit re-derives timestamps, so the owned animation always satisfies the contiguity
/// invariant. Keyframe ids are allocated by the session and never reused within it.
#[derive(Clone, Debug, Default)]
pub struct AnimationSession {
    animation: Animation,
    next_id: u64,
}

impl AnimationSession {
    /// Start an empty session.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            animation: Animation::new(name, Vec::new()),
            next_id: 0,
        }
    }

    /// Resume editing an existing animation.
    pub fn from_animation(mut animation: Animation) -> Self {
        animation.retime();
        let next_id = animation
            .keyframes
            .iter()
            .map(|k| k.id.saturating_add(1))
            .max()
            .unwrap_or(0);
        Self { animation, next_id }
    }

    /// Borrow the animation being edited.
    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    /// End the session, returning the animation.
    pub fn into_animation(self) -> Animation {
        self.animation
    }

    /// Append a keyframe capturing `view` and return its id.
    pub fn capture(
        &mut self,
        view: RenderState,
        duration_ms: u64,
        easing: Ease,
        thumbnail: Option<String>,
    ) -> ReelResult<u64> {
        view.view_bounds.validate()?;
        if duration_ms == 0 {
            return Err(ReelError::validation("keyframe duration must be > 0"));
        }

        let id = self.next_id;
        self.next_id += 1;
        self.animation.keyframes.push(Keyframe {
            id,
            timestamp_ms: 0,
            duration_ms,
            easing,
            view_bounds: view.view_bounds,
            fractal_mode: view.fractal_mode,
            julia_constant: view.julia_constant,
            equation_id: view.equation_id,
            max_iterations: view.max_iterations.max(1),
            palette_id: view.palette_id,
            color_temperature: view.color_temperature.clamp(-1.0, 1.0),
            thumbnail,
        });
        self.animation.retime();
        tracing::debug!(id, keyframes = self.animation.keyframes.len(), "captured keyframe");
        Ok(id)
    }

    /// Remove a keyframe by id.
    pub fn remove(&mut self, id: u64) -> ReelResult<Keyframe> {
        let idx = self.index_of(id)?;
        let removed = self.animation.keyframes.remove(idx);
        self.animation.retime();
        Ok(removed)
    }

    /// Move the keyframe at `from` so it ends up at index `to`.
    pub fn move_keyframe(&mut self, from: usize, to: usize) -> ReelResult<()> {
        let len = self.animation.keyframes.len();
        if from >= len || to >= len {
            return Err(ReelError::validation(format!(
                "keyframe index out of range (from={from}, to={to}, len={len})"
            )));
        }
        let k = self.animation.keyframes.remove(from);
        self.animation.keyframes.insert(to, k);
        self.animation.retime();
        Ok(())
    }

    /// Change the length of the segment starting at keyframe `id`.
    pub fn set_duration(&mut self, id: u64, duration_ms: u64) -> ReelResult<()> {
        if duration_ms == 0 {
            return Err(ReelError::validation("keyframe duration must be > 0"));
        }
        let idx = self.index_of(id)?;
        self.animation.keyframes[idx].duration_ms = duration_ms;
        self.animation.retime();
        Ok(())
    }

    /// Change the easing of the segment starting at keyframe `id`.
    pub fn set_easing(&mut self, id: u64, easing: Ease) -> ReelResult<()> {
        let idx = self.index_of(id)?;
        self.animation.keyframes[idx].easing = easing;
        Ok(())
    }

    /// Drop all keyframes. Id allocation continues from where it was.
    pub fn clear(&mut self) {
        self.animation.keyframes.clear();
    }

    fn index_of(&self, id: u64) -> ReelResult<usize> {
        self.animation
            .keyframes
            .iter()
            .position(|k| k.id == id)
            .ok_or_else(|| ReelError::validation(format!("no keyframe with id {id}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/session.rs"]
mod tests;
