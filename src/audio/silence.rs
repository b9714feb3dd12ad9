//! Energy-based silence detection.
//!
//! [`SilenceDetector`] classifies a chunk of 16 kHz mono audio as silent
//! when its mean-squared energy falls below a fixed threshold.  Callers use
//! it as an end-of-speech heuristic (e.g. "finalize after 700 ms of
//! silence"); the engine state machine itself never acts on it.
//!
//! The default threshold of `1e-3` mean-squared energy corresponds to a
//! peak amplitude of roughly 0.03 in normalized float samples — quiet-room
//! background noise sits comfortably below it.

// ---------------------------------------------------------------------------
// SilenceDetector
// ---------------------------------------------------------------------------

/// Mean-squared-energy threshold below which a chunk counts as silent.
pub const SILENCE_THRESHOLD: f32 = 1e-3;

/// Classifies audio chunks as silent or voiced.
///
/// # Example
///
/// ```rust
/// use voxstream::audio::SilenceDetector;
///
/// let detector = SilenceDetector::default();
/// assert!(detector.is_silent(&vec![0.0_f32; 1600]));
/// assert!(!detector.is_silent(&vec![0.5_f32; 1600]));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SilenceDetector {
    threshold: f32,
}

impl SilenceDetector {
    /// Create a detector with a custom mean-squared-energy threshold.
    ///
    /// Prefer [`SilenceDetector::default`] unless the capture chain has an
    /// unusual noise floor.
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Threshold currently in use.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Returns `true` when `samples` carries no speech energy.
    ///
    /// Empty input is treated as silent.
    pub fn is_silent(&self, samples: &[f32]) -> bool {
        self.energy(samples) < self.threshold
    }

    /// Mean-squared energy of `samples` (0.0 for empty input).
    pub fn energy(&self, samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32
    }
}

impl Default for SilenceDetector {
    fn default() -> Self {
        Self::new(SILENCE_THRESHOLD)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_silent() {
        assert!(SilenceDetector::default().is_silent(&[]));
    }

    #[test]
    fn zeroed_audio_is_silent() {
        let detector = SilenceDetector::default();
        assert!(detector.is_silent(&vec![0.0_f32; 12_800]));
    }

    #[test]
    fn speech_level_audio_is_not_silent() {
        let detector = SilenceDetector::default();
        assert!(!detector.is_silent(&vec![0.1_f32; 12_800]));
    }

    #[test]
    fn just_below_threshold_is_silent() {
        // amplitude 0.03 → energy 9e-4 < 1e-3
        let detector = SilenceDetector::default();
        assert!(detector.is_silent(&vec![0.03_f32; 1_600]));
    }

    #[test]
    fn just_above_threshold_is_voiced() {
        // amplitude 0.04 → energy 1.6e-3 > 1e-3
        let detector = SilenceDetector::default();
        assert!(!detector.is_silent(&vec![0.04_f32; 1_600]));
    }

    #[test]
    fn energy_of_unit_signal_is_one() {
        let detector = SilenceDetector::default();
        let e = detector.energy(&vec![1.0_f32; 256]);
        assert!((e - 1.0).abs() < 1e-6);
    }

    #[test]
    fn custom_threshold_is_respected() {
        let strict = SilenceDetector::new(1e-6);
        assert!(!strict.is_silent(&vec![0.01_f32; 480]));
        assert!((strict.threshold() - 1e-6).abs() < f32::EPSILON);
    }
}
