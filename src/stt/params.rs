//! Transcription parameter types.
//!
//! [`TranscribeParams`] carries all settings that control a single
//! per-chunk inference run.

// ---------------------------------------------------------------------------
// TranscribeParams
// ---------------------------------------------------------------------------

/// All parameters for a single per-chunk transcription run.
///
/// Build with [`TranscribeParams::default()`] and override fields as needed:
///
/// ```
/// use voxstream::stt::TranscribeParams;
///
/// let params = TranscribeParams {
///     language: "en".into(),
///     ..TranscribeParams::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TranscribeParams {
    /// ISO-639-1 language code (e.g. `"en"`), or `"auto"` to let the model
    /// detect the language from the audio.
    pub language: String,

    /// Translate speech to English instead of transcribing verbatim.
    pub translate: bool,

    /// Number of CPU threads handed to inference.  Defaults to the
    /// machine's available parallelism, capped at 8.
    pub n_threads: i32,
}

impl Default for TranscribeParams {
    fn default() -> Self {
        Self {
            language: "auto".into(),
            translate: false,
            n_threads: optimal_threads(),
        }
    }
}

impl TranscribeParams {
    /// Build params for a session's language setting.
    pub fn for_language(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..Self::default()
        }
    }
}

/// Returns the number of CPU threads to use for inference, capped at 8 to
/// avoid diminishing returns on Whisper.
pub(crate) fn optimal_threads() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get().min(8) as i32)
        .unwrap_or(4)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_language_is_auto() {
        let p = TranscribeParams::default();
        assert_eq!(p.language, "auto");
        assert!(!p.translate);
    }

    #[test]
    fn for_language_overrides_only_language() {
        let p = TranscribeParams::for_language("en");
        assert_eq!(p.language, "en");
        assert!(!p.translate);
        assert_eq!(p.n_threads, TranscribeParams::default().n_threads);
    }

    #[test]
    fn optimal_threads_is_positive_and_at_most_8() {
        let t = optimal_threads();
        assert!(t >= 1 && t <= 8);
    }
}
