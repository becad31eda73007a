/// Convenience result type used across fractalreel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by the export pipeline.
///
/// User cancellation is deliberately absent: a cancelled export is a normal outcome
/// ([`crate::ExportOutcome::Cancelled`]), not a failure.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid animation, settings, or raster surface. Raised before any resource is acquired.
    #[error("validation error: {0}")]
    Validation(String),

    /// The video encoder rejected `start`, `add_frame`, or `finish`.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Neither rendering backend could be used for a requested frame.
    #[error("renderer unavailable: {0}")]
    RendererUnavailable(String),

    /// A backend failed while rendering a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`ReelError::RendererUnavailable`] value.
    pub fn renderer_unavailable(msg: impl Into<String>) -> Self {
        Self::RendererUnavailable(msg.into())
    }

    /// Build a [`ReelError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
