//! Engine error taxonomy.
//!
//! Every public [`Engine`](crate::engine::Engine) operation returns
//! `Result<_, EngineError>`.  Errors fall into four groups:
//!
//! * **Lifecycle violations** — the operation is not valid in the current
//!   engine state (e.g. [`EngineError::SessionAlreadyActive`]).  Detected
//!   synchronously, always recoverable: fix the call order and retry.
//! * **Resource exhaustion** — [`EngineError::BackpressureLimit`] and
//!   [`EngineError::OutOfMemory`].  The caller decides whether to retry,
//!   back off, or drop.
//! * **Invalid input** — bad session id, empty audio.  Caller bugs.
//! * **Asynchronous failures** — inference errors inside the worker loop are
//!   *not* returned from any call; they are delivered as
//!   [`EngineEvent::Error`](crate::engine::EngineEvent::Error) carrying the
//!   same `code()` strings defined here.
//!
//! [`Engine::dispose`](crate::engine::Engine::dispose) is the one operation
//! with no error path at all.

use thiserror::Error;

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

/// All errors that the engine control plane can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// `init` was called while the engine is already initialized.
    #[error("engine is already initialized")]
    AlreadyInitialized,

    /// The operation requires `init` to have been called first.
    #[error("engine is not initialized")]
    NotInitialized,

    /// The engine has been disposed; only `init` (re-arm) is valid now.
    #[error("engine has been disposed")]
    Disposed,

    /// The configured compute device is not supported (CPU only).
    #[error("device '{0}' is not supported")]
    DeviceNotSupported(String),

    /// The model id is empty or not in the supported registry.
    #[error("model '{0}' not found")]
    ModelNotFound(String),

    /// The background model load failed (reported via the event sink; the
    /// variant exists so the failure carries the same code as sync errors).
    #[error("failed to load model '{model_id}': {reason}")]
    ModelLoadFailed { model_id: String, reason: String },

    /// `start_session` requires a loaded model.
    #[error("no model is currently loaded")]
    ModelNotLoaded,

    /// Insufficient memory to complete the operation.
    #[error("insufficient memory to complete operation")]
    OutOfMemory,

    /// A session is already active; end it before this operation.
    #[error("a session is already active")]
    SessionAlreadyActive,

    /// The supplied session id does not match the active session.
    #[error("invalid session id: {0}")]
    InvalidSession(String),

    /// No session is active (it already ended or never started).
    #[error("session has already ended")]
    SessionEnded,

    /// The work queue is full; the chunk was not queued.
    #[error("backpressure limit reached, audio chunk dropped")]
    BackpressureLimit,

    /// The audio payload is empty or otherwise unusable.
    #[error("audio stream error: {0}")]
    AudioStreamError(String),

    /// Unexpected internal failure (poisoned lock, worker panic).
    #[error("internal engine error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Stable machine-readable code for this error, matching the engine's
    /// wire-level error vocabulary.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::AlreadyInitialized => "ALREADY_INITIALIZED",
            EngineError::NotInitialized => "NOT_INITIALIZED",
            EngineError::Disposed => "DISPOSED",
            EngineError::DeviceNotSupported(_) => "DEVICE_NOT_SUPPORTED",
            EngineError::ModelNotFound(_) => "MODEL_NOT_FOUND",
            EngineError::ModelLoadFailed { .. } => "MODEL_LOAD_FAILED",
            EngineError::ModelNotLoaded => "MODEL_NOT_LOADED",
            EngineError::OutOfMemory => "OUT_OF_MEMORY",
            EngineError::SessionAlreadyActive => "SESSION_ALREADY_ACTIVE",
            EngineError::InvalidSession(_) => "INVALID_SESSION",
            EngineError::SessionEnded => "SESSION_ENDED",
            EngineError::BackpressureLimit => "BACKPRESSURE_LIMIT",
            EngineError::AudioStreamError(_) => "AUDIO_STREAM_ERROR",
            EngineError::Internal(_) => "INTERNAL_ENGINE_ERROR",
        }
    }

    /// Whether the caller can reasonably retry after this error.
    ///
    /// Non-recoverable: init/device failures, out-of-memory, disposal and
    /// internal errors.  Everything else is a call-ordering or input problem
    /// the caller can correct.
    pub fn recoverable(&self) -> bool {
        !matches!(
            self,
            EngineError::DeviceNotSupported(_)
                | EngineError::OutOfMemory
                | EngineError::Disposed
                | EngineError::Internal(_)
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(EngineError::NotInitialized.code(), "NOT_INITIALIZED");
        assert_eq!(EngineError::BackpressureLimit.code(), "BACKPRESSURE_LIMIT");
        assert_eq!(
            EngineError::InvalidSession("x".into()).code(),
            "INVALID_SESSION"
        );
        assert_eq!(
            EngineError::Internal("boom".into()).code(),
            "INTERNAL_ENGINE_ERROR"
        );
    }

    #[test]
    fn lifecycle_errors_are_recoverable() {
        assert!(EngineError::AlreadyInitialized.recoverable());
        assert!(EngineError::NotInitialized.recoverable());
        assert!(EngineError::SessionAlreadyActive.recoverable());
        assert!(EngineError::SessionEnded.recoverable());
        assert!(EngineError::ModelNotLoaded.recoverable());
        assert!(EngineError::BackpressureLimit.recoverable());
    }

    #[test]
    fn fatal_errors_are_not_recoverable() {
        assert!(!EngineError::DeviceNotSupported("gpu".into()).recoverable());
        assert!(!EngineError::OutOfMemory.recoverable());
        assert!(!EngineError::Disposed.recoverable());
        assert!(!EngineError::Internal("x".into()).recoverable());
    }

    #[test]
    fn display_includes_context() {
        let e = EngineError::InvalidSession("session_123_abc".into());
        assert!(e.to_string().contains("session_123_abc"));

        let e = EngineError::ModelLoadFailed {
            model_id: "base".into(),
            reason: "file truncated".into(),
        };
        assert!(e.to_string().contains("base"));
        assert!(e.to_string().contains("file truncated"));
    }
}
