//! Inference capability — the engine's boundary to the speech model.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │              InferenceBackend (trait)                  │
//! │                                                        │
//! │   ┌──────────────┐      ┌────────────────┐             │
//! │   │  ModelPaths  │      │ WhisperBackend │             │
//! │   │ - resolve    │─────▶│ - ctx (0..1)   │             │
//! │   │ - exists?    │      │ - params       │             │
//! │   └──────────────┘      └───────┬────────┘             │
//! │                                 │                      │
//! │                                 ▼                      │
//! │            load_model / unload_model / transcribe      │
//! │                     / is_silent                        │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! The worker thread owns the backend exclusively; the controller never
//! calls into it.  [`MockBackend`] (test-only) stands in for the whole
//! boundary so the control plane is testable without a GGML file.

pub mod backend;
pub mod model;
pub mod params;
pub mod whisper;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use backend::{InferenceBackend, SttError};
pub use model::{find_model_by_id, ModelInfo, ModelPaths, SUPPORTED_MODELS};
pub use params::TranscribeParams;
pub use whisper::WhisperBackend;

// test-only re-export so engine test modules can import the mock without
// `use voxstream::stt::backend::MockBackend`.
#[cfg(test)]
pub use backend::{MockBackend, MockHandle};
