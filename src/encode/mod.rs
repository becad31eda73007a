//! Video encoding and delivery.
//!
//! Frames reach an encoder through [`stream::StreamingEncoder`], which runs it on its own thread
//! behind a bounded queue. Finished media is handed to a [`delivery::MediaDelivery`].

/// Saving finished media.
pub mod delivery;
/// Encoder trait, configuration and media types.
pub mod encoder;
/// `ffmpeg`-based encoder (system `ffmpeg` on `PATH`).
pub mod ffmpeg;
/// Bounded-queue adapter around an encoder.
pub mod stream;
