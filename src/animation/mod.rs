/// Easing curves applied to segment progress.
pub mod ease;
/// Keyframe and animation data model.
pub mod keyframe;
/// Owned keyframe editing session.
pub mod session;
/// Timeline sampling into renderer-ready states.
pub mod timeline;
