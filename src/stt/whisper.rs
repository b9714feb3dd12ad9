//! Production inference backend wrapping `whisper_rs`.
//!
//! [`WhisperBackend`] implements [`InferenceBackend`] over a
//! `whisper_rs::WhisperContext`.  Each [`transcribe`] call creates a fresh
//! `WhisperState` and decodes the chunk greedily with `no_context` set, so
//! chunks are fully independent: no decoder state survives between calls
//! and per-chunk latency stays bounded.
//!
//! [`transcribe`]: InferenceBackend::transcribe

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::stt::backend::{InferenceBackend, SttError};
use crate::stt::model::{ModelInfo, ModelPaths};
use crate::stt::params::TranscribeParams;

// ---------------------------------------------------------------------------
// WhisperBackend
// ---------------------------------------------------------------------------

/// Whisper-based [`InferenceBackend`].
///
/// Owned by the engine's worker thread; at most one model context is alive
/// at a time, and loading a new model frees the previous one.
pub struct WhisperBackend {
    ctx: Option<WhisperContext>,
    paths: ModelPaths,
    params: TranscribeParams,
}

impl std::fmt::Debug for WhisperBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperBackend")
            .field("paths", &self.paths)
            .field("params", &self.params)
            .field("model_loaded", &self.ctx.is_some())
            .finish()
    }
}

// `WhisperContext` holds a raw pointer internally but declares
// `unsafe impl Send` in whisper-rs — the model weights are read-only after
// loading, and this backend is only ever touched from the worker thread.
// SAFETY: WhisperContext is Send as declared by whisper-rs.
unsafe impl Send for WhisperBackend {}

impl WhisperBackend {
    /// Create a backend that resolves model files under `paths`.
    pub fn new(paths: ModelPaths, params: TranscribeParams) -> Self {
        Self {
            ctx: None,
            paths,
            params,
        }
    }

    /// Transcription parameters currently in use.
    pub fn params(&self) -> &TranscribeParams {
        &self.params
    }
}

impl InferenceBackend for WhisperBackend {
    /// Load the GGML file for `model`, replacing any loaded context.
    ///
    /// # Errors
    ///
    /// - [`SttError::ModelNotFound`]  — the file does not exist on disk.
    /// - [`SttError::ModelLoadFailed`] — whisper-rs rejected the file.
    fn load_model(&mut self, model: &ModelInfo) -> Result<(), SttError> {
        let path = self.paths.model_path(model);

        if !path.exists() {
            return Err(SttError::ModelNotFound(path.display().to_string()));
        }

        let path_str = path.to_str().ok_or_else(|| {
            SttError::ModelNotFound(format!(
                "model path contains non-UTF-8 characters: {}",
                path.display()
            ))
        })?;

        // Drop the previous context before loading so peak memory holds at
        // most one model.
        self.ctx = None;

        let ctx_params = WhisperContextParameters::default();
        let ctx = WhisperContext::new_with_params(path_str, ctx_params)
            .map_err(|e| SttError::ModelLoadFailed(e.to_string()))?;

        log::info!("whisper: loaded model '{}' from {}", model.id, path.display());
        self.ctx = Some(ctx);
        Ok(())
    }

    fn unload_model(&mut self) {
        if self.ctx.take().is_some() {
            log::info!("whisper: model unloaded");
        }
    }

    fn is_model_loaded(&self) -> bool {
        self.ctx.is_some()
    }

    fn transcribe(&mut self, samples: &[f32]) -> Result<String, SttError> {
        if samples.is_empty() {
            return Err(SttError::InvalidAudio);
        }

        let ctx = self.ctx.as_ref().ok_or(SttError::ModelNotLoaded)?;

        // Greedy single-segment decoding with no cross-chunk context — the
        // chunk is transcribed in isolation.
        let mut fp = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        fp.set_single_segment(true);
        fp.set_no_context(true);
        fp.set_translate(self.params.translate);
        fp.set_n_threads(self.params.n_threads);
        fp.set_print_progress(false);
        fp.set_print_realtime(false);
        fp.set_print_special(false);
        fp.set_print_timestamps(false);

        // set_language takes an Option<&str> whose lifetime is tied to fp.
        // Both `fp` and the borrow of `self.params.language` remain alive
        // until state.full() returns, so the borrow is valid.
        let lang: Option<&str> = if self.params.language == "auto" {
            None
        } else {
            Some(self.params.language.as_str())
        };
        fp.set_language(lang);

        let mut state = ctx
            .create_state()
            .map_err(|e| SttError::Inference(e.to_string()))?;

        state
            .full(fp, samples)
            .map_err(|e| SttError::Inference(e.to_string()))?;

        let n_segments = state
            .full_n_segments()
            .map_err(|e| SttError::Inference(e.to_string()))?;

        let mut text = String::new();
        for i in 0..n_segments {
            let seg_text = state
                .full_get_segment_text(i)
                .map_err(|e| SttError::Inference(format!("segment {i}: {e}")))?;
            text.push_str(&seg_text);
        }

        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stt::model::find_model_by_id;

    #[test]
    fn load_missing_model_returns_model_not_found() {
        let mut backend = WhisperBackend::new(
            ModelPaths::new("/nonexistent/models"),
            TranscribeParams::default(),
        );
        let result = backend.load_model(find_model_by_id("tiny").unwrap());
        assert!(
            matches!(result, Err(SttError::ModelNotFound(_))),
            "expected ModelNotFound, got: {result:?}"
        );
        assert!(!backend.is_model_loaded());
    }

    #[test]
    fn transcribe_without_model_is_model_not_loaded() {
        let mut backend = WhisperBackend::new(
            ModelPaths::new("/nonexistent/models"),
            TranscribeParams::default(),
        );
        let err = backend.transcribe(&[0.1; 16_000]).unwrap_err();
        assert_eq!(err, SttError::ModelNotLoaded);
    }

    #[test]
    fn transcribe_empty_audio_is_invalid() {
        let mut backend = WhisperBackend::new(
            ModelPaths::new("/nonexistent/models"),
            TranscribeParams::default(),
        );
        assert_eq!(backend.transcribe(&[]).unwrap_err(), SttError::InvalidAudio);
    }

    #[test]
    fn unload_without_model_is_noop() {
        let mut backend = WhisperBackend::new(
            ModelPaths::new("/nonexistent/models"),
            TranscribeParams::default(),
        );
        backend.unload_model();
        assert!(!backend.is_model_loaded());
    }
}
