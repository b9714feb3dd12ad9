//! voxstream — streaming speech-to-text engine control plane.
//!
//! The crate wraps a whisper.cpp inference backend in a small, strictly
//! ordered control plane: a lifecycle state machine, a bounded work queue
//! drained by a single worker thread, per-session transcript aggregation,
//! and asynchronous event delivery.
//!
//! ```text
//!  engine/   lifecycle, sessions, work queue, worker loop, events
//!  stt/      inference backend trait, whisper.cpp backend, model catalog
//!  audio/    silence detection, sample-format constants
//!  config/   engine + session settings, on-disk persistence, paths
//!  error.rs  public error type with stable error codes
//! ```
//!
//! The typical flow is `Engine::new` → `init` → `set_callback` →
//! `load_model` → `start_session` → `push_audio`* → `end_session` →
//! `dispose`; see [`engine::Engine`] for a runnable example.

pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod stt;

pub use config::{Device, EngineConfig, SessionConfig};
pub use engine::{Engine, EngineEvent, EngineLifecycle, EventSink, SessionId};
pub use error::EngineError;
pub use stt::{InferenceBackend, WhisperBackend};
