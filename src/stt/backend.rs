//! The inference capability boundary.
//!
//! # Overview
//!
//! [`InferenceBackend`] is the narrow interface through which the worker
//! loop reaches the actual speech model.  The engine treats it as opaque:
//! it loads/unloads models, transcribes one chunk at a time, and answers
//! silence queries.  The worker thread exclusively owns the backend, so the
//! trait takes `&mut self` and only requires `Send`.
//!
//! [`WhisperBackend`](crate::stt::WhisperBackend) is the production
//! implementation wrapping `whisper_rs`.
//!
//! [`MockBackend`] (available under `#[cfg(test)]`) is a scriptable fake
//! that records every call — useful for unit-testing the controller and
//! worker without a real GGML model file.

use thiserror::Error;

use crate::audio::SilenceDetector;
use crate::stt::model::ModelInfo;

// ---------------------------------------------------------------------------
// SttError
// ---------------------------------------------------------------------------

/// All errors that can arise from the inference capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SttError {
    /// The GGML model file was not found on disk.
    #[error("model file not found: {0}")]
    ModelNotFound(String),

    /// The backend failed to load the model file.
    #[error("failed to load model: {0}")]
    ModelLoadFailed(String),

    /// `transcribe` was called with no model loaded — the capability is
    /// unusable until a model load succeeds.
    #[error("no model is loaded")]
    ModelNotLoaded,

    /// The inference pass itself failed.
    #[error("inference failed: {0}")]
    Inference(String),

    /// The supplied audio buffer is empty or unusable.
    #[error("invalid audio data")]
    InvalidAudio,
}

impl SttError {
    /// Whether this failure leaves the capability unusable.
    ///
    /// A fatal backend error forces the worker to abort the active session
    /// and surface a non-recoverable engine error; anything else drops the
    /// offending chunk and the session continues.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SttError::ModelNotLoaded)
    }
}

// ---------------------------------------------------------------------------
// InferenceBackend trait
// ---------------------------------------------------------------------------

/// Interface to the speech model, owned exclusively by the worker thread.
///
/// # Contract
///
/// * `transcribe` receives **16 kHz, mono, f32** PCM in normalized range.
/// * Each chunk is transcribed independently — implementations must not
///   carry decoding state across calls.
/// * `load_model` over an already-loaded model replaces it.
pub trait InferenceBackend: Send {
    /// Load the given model, replacing any previously loaded one.
    fn load_model(&mut self, model: &ModelInfo) -> Result<(), SttError>;

    /// Unload the current model.  No-op when nothing is loaded.
    fn unload_model(&mut self);

    /// Returns `true` while a model is loaded and usable.
    fn is_model_loaded(&self) -> bool;

    /// Transcribe one audio chunk and return its text (possibly empty for
    /// speechless audio).
    fn transcribe(&mut self, samples: &[f32]) -> Result<String, SttError>;

    /// Energy-based silence check, usable as an end-of-speech hint.
    fn is_silent(&self, samples: &[f32]) -> bool {
        SilenceDetector::default().is_silent(samples)
    }
}

// Compile-time assertion: Box<dyn InferenceBackend> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn InferenceBackend>) {}
};

// ---------------------------------------------------------------------------
// MockBackend  (test-only)
// ---------------------------------------------------------------------------

/// Scriptable test double for [`InferenceBackend`].
///
/// The backend itself moves into the engine's worker thread; tests keep a
/// [`MockHandle`] to script responses and observe calls from outside.
#[cfg(test)]
pub struct MockBackend {
    state: std::sync::Arc<std::sync::Mutex<MockState>>,
}

#[cfg(test)]
#[derive(Default)]
struct MockState {
    loaded: Option<String>,
    load_calls: Vec<String>,
    transcribe_count: usize,
    script: std::collections::VecDeque<Result<String, SttError>>,
    fail_next_load: Option<SttError>,
}

/// Shared observer/scripting handle for a [`MockBackend`].
#[cfg(test)]
#[derive(Clone)]
pub struct MockHandle {
    state: std::sync::Arc<std::sync::Mutex<MockState>>,
}

#[cfg(test)]
impl MockBackend {
    /// Create a mock and the handle used to script and observe it.
    pub fn new() -> (Self, MockHandle) {
        let state = std::sync::Arc::new(std::sync::Mutex::new(MockState::default()));
        (
            Self {
                state: std::sync::Arc::clone(&state),
            },
            MockHandle { state },
        )
    }
}

#[cfg(test)]
impl MockHandle {
    /// Queue a transcription result; results are consumed in FIFO order.
    /// When the script is empty, `transcribe` returns `Ok("chunk <n>")`.
    pub fn push_result(&self, result: Result<String, SttError>) {
        self.state.lock().unwrap().script.push_back(result);
    }

    /// Make the next `load_model` call fail with `error`.
    pub fn fail_next_load(&self, error: SttError) {
        self.state.lock().unwrap().fail_next_load = Some(error);
    }

    /// Model id currently loaded in the mock, if any.
    pub fn loaded(&self) -> Option<String> {
        self.state.lock().unwrap().loaded.clone()
    }

    /// Every model id `load_model` was called with, in order.
    pub fn load_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().load_calls.clone()
    }

    /// Number of `transcribe` calls observed so far.
    pub fn transcribe_count(&self) -> usize {
        self.state.lock().unwrap().transcribe_count
    }
}

#[cfg(test)]
impl InferenceBackend for MockBackend {
    fn load_model(&mut self, model: &ModelInfo) -> Result<(), SttError> {
        let mut st = self.state.lock().unwrap();
        st.load_calls.push(model.id.to_string());
        if let Some(err) = st.fail_next_load.take() {
            st.loaded = None;
            return Err(err);
        }
        st.loaded = Some(model.id.to_string());
        Ok(())
    }

    fn unload_model(&mut self) {
        self.state.lock().unwrap().loaded = None;
    }

    fn is_model_loaded(&self) -> bool {
        self.state.lock().unwrap().loaded.is_some()
    }

    fn transcribe(&mut self, samples: &[f32]) -> Result<String, SttError> {
        if samples.is_empty() {
            return Err(SttError::InvalidAudio);
        }
        let mut st = self.state.lock().unwrap();
        if st.loaded.is_none() {
            return Err(SttError::ModelNotLoaded);
        }
        st.transcribe_count += 1;
        let n = st.transcribe_count;
        st.script
            .pop_front()
            .unwrap_or_else(|| Ok(format!("chunk {n}")))
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
    fn mock_load_and_unload_track_state() {
        let (mut backend, handle) = MockBackend::new();
        let base = find_model_by_id("base").unwrap();

        assert!(!backend.is_model_loaded());
        backend.load_model(base).unwrap();
        assert!(backend.is_model_loaded());
        assert_eq!(handle.loaded().as_deref(), Some("base"));

        backend.unload_model();
        assert!(!backend.is_model_loaded());
        assert!(handle.loaded().is_none());
    }

    #[test]
    fn mock_transcribe_without_model_is_fatal() {
        let (mut backend, _handle) = MockBackend::new();
        let err = backend.transcribe(&[0.1; 160]).unwrap_err();
        assert_eq!(err, SttError::ModelNotLoaded);
        assert!(err.is_fatal());
    }

    #[test]
    fn mock_transcribe_follows_script_then_default() {
        let (mut backend, handle) = MockBackend::new();
        backend.load_model(find_model_by_id("tiny").unwrap()).unwrap();

        handle.push_result(Ok("hello".into()));
        handle.push_result(Err(SttError::Inference("noise".into())));

        assert_eq!(backend.transcribe(&[0.1; 160]).unwrap(), "hello");
        assert!(backend.transcribe(&[0.1; 160]).is_err());
        // Script exhausted — falls back to numbered default.
        assert_eq!(backend.transcribe(&[0.1; 160]).unwrap(), "chunk 3");
        assert_eq!(handle.transcribe_count(), 3);
    }

    #[test]
    fn mock_empty_audio_is_invalid() {
        let (mut backend, _handle) = MockBackend::new();
        backend.load_model(find_model_by_id("tiny").unwrap()).unwrap();
        assert_eq!(backend.transcribe(&[]).unwrap_err(), SttError::InvalidAudio);
    }

    #[test]
    fn mock_fail_next_load_is_one_shot() {
        let (mut backend, handle) = MockBackend::new();
        let base = find_model_by_id("base").unwrap();

        handle.fail_next_load(SttError::ModelLoadFailed("truncated".into()));
        assert!(backend.load_model(base).is_err());
        assert!(!backend.is_model_loaded());

        backend.load_model(base).unwrap();
        assert!(backend.is_model_loaded());
        assert_eq!(handle.load_calls(), vec!["base", "base"]);
    }

    #[test]
    fn default_is_silent_uses_energy_detector() {
        let (backend, _handle) = MockBackend::new();
        assert!(backend.is_silent(&vec![0.0; 1_600]));
        assert!(!backend.is_silent(&vec![0.5; 1_600]));
    }

    #[test]
    fn only_model_not_loaded_is_fatal() {
        assert!(SttError::ModelNotLoaded.is_fatal());
        assert!(!SttError::Inference("x".into()).is_fatal());
        assert!(!SttError::InvalidAudio.is_fatal());
        assert!(!SttError::ModelLoadFailed("x".into()).is_fatal());
    }
}
