//! Audio helpers for the engine.
//!
//! The engine consumes raw **16 kHz mono f32** PCM in normalized range and
//! performs no capture, decoding or resampling itself — that is the
//! caller's responsibility.  What lives here is the small amount of signal
//! analysis the control plane does need: energy-based silence
//! classification used as an end-of-speech hint.

pub mod silence;

pub use silence::{SilenceDetector, SILENCE_THRESHOLD};

/// Sample rate the engine expects, in Hz.
pub const SAMPLE_RATE: u32 = 16_000;
