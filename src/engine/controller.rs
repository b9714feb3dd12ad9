//! The public engine controller.
//!
//! [`Engine`] is the caller-owned control plane of the transcription
//! engine: a state machine that validates every request against the
//! current [`EngineLifecycle`], mutates shared state, enqueues work for
//! the single worker thread, and returns without ever blocking on
//! inference.
//!
//! # Concurrency model
//!
//! All shared mutable state — lifecycle, loaded model, sessions, the work
//! queue, the event sink — lives in one [`Mutex`]-guarded [`Inner`] paired
//! with a [`Condvar`] for worker wakeups.  Producer threads share the
//! engine by reference (`Engine` is `Send + Sync`); the worker loop is the
//! only consumer.  No lock is ever held across a call into the inference
//! backend or the event sink.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use voxstream::config::{EngineConfig, SessionConfig};
//! use voxstream::engine::{Engine, EngineEvent};
//! use voxstream::stt::{ModelPaths, TranscribeParams, WhisperBackend};
//!
//! let engine = Engine::new();
//! let backend = WhisperBackend::new(
//!     ModelPaths::new("/opt/models"),
//!     TranscribeParams::default(),
//! );
//! engine.init(EngineConfig::default(), Box::new(backend)).unwrap();
//! engine.set_callback(Arc::new(|event: EngineEvent| {
//!     println!("{event:?}");
//! })).unwrap();
//!
//! engine.load_model("base").unwrap();
//! let session = engine.start_session(&SessionConfig::default()).unwrap();
//! engine.push_audio(&session, vec![0.0; 12_800]).unwrap();
//! engine.end_session(&session).unwrap();
//! engine.dispose();
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use crate::config::{Device, EngineConfig, SessionConfig};
use crate::engine::events::{EngineEvent, SharedSink};
use crate::engine::queue::{WorkItem, QUEUE_CAPACITY};
use crate::engine::session::{Session, SessionId};
use crate::engine::state::EngineLifecycle;
use crate::engine::worker;
use crate::error::EngineError;
use crate::stt::{find_model_by_id, InferenceBackend, ModelInfo};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Everything behind the engine's single exclusive-access region.
pub(crate) struct Inner {
    /// Current lifecycle state; transitions happen only under this lock.
    pub(crate) lifecycle: EngineLifecycle,
    /// Snapshot of the config passed to the most recent `init`.
    pub(crate) config: Option<EngineConfig>,
    /// The model callers observe as loaded (optimistically set by
    /// `load_model` before background preparation completes).
    pub(crate) loaded_model: Option<&'static ModelInfo>,
    /// Id of the session currently accepting audio.
    pub(crate) active_session: Option<SessionId>,
    /// Aggregation buffers, keyed by session id.  An ended session stays
    /// here until the worker processes its `EndSession` item, so chunks
    /// queued ahead of it still reach the final transcript.
    pub(crate) sessions: HashMap<SessionId, Session>,
    /// Bounded work FIFO drained by the worker loop.
    pub(crate) queue: VecDeque<WorkItem>,
    /// Set by `dispose`; the worker exits once the queue is drained.
    pub(crate) shutdown_requested: bool,
    /// Registered event sink (last-writer-wins).
    pub(crate) sink: Option<SharedSink>,
    /// Total chunks rejected by backpressure since `init`.
    pub(crate) dropped_chunks: u64,
}

impl Inner {
    fn fresh() -> Self {
        Self {
            lifecycle: EngineLifecycle::Uninitialized,
            config: None,
            loaded_model: None,
            active_session: None,
            sessions: HashMap::new(),
            queue: VecDeque::new(),
            shutdown_requested: false,
            sink: None,
            dropped_chunks: 0,
        }
    }
}

/// Lock + wakeup pair shared between the controller and the worker.
pub(crate) struct Shared {
    pub(crate) inner: Mutex<Inner>,
    pub(crate) work_ready: Condvar,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The engine controller.
///
/// Created inert with [`Engine::new`]; armed with [`Engine::init`], which
/// takes ownership of an [`InferenceBackend`] and starts the worker
/// thread.  A disposed engine can be re-initialized with a fresh backend.
///
/// Dropping the engine disposes it.
pub struct Engine {
    shared: Arc<Shared>,
    /// Worker join handle; populated by `init`, drained by `dispose`.
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Engine {
    /// Create an engine handle in the `Uninitialized` state.  No thread is
    /// started until [`Engine::init`].
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner::fresh()),
                work_ready: Condvar::new(),
            }),
            worker: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle operations
    // -----------------------------------------------------------------------

    /// Initialize the engine: validate `config`, take ownership of the
    /// inference backend, start the worker thread.
    ///
    /// # Errors
    ///
    /// - [`EngineError::AlreadyInitialized`] — lifecycle is not
    ///   `Uninitialized` or `Disposed`.
    /// - [`EngineError::DeviceNotSupported`] — `config.device` is not CPU.
    pub fn init(
        &self,
        config: EngineConfig,
        backend: Box<dyn InferenceBackend>,
    ) -> Result<(), EngineError> {
        // Lock order: worker slot first, then inner.  `dispose` never holds
        // inner while taking the worker slot, so the order cannot cycle.
        let mut worker_slot = self.worker.lock().unwrap();
        let mut inner = self.shared.inner.lock().unwrap();

        if !matches!(
            inner.lifecycle,
            EngineLifecycle::Uninitialized | EngineLifecycle::Disposed
        ) {
            return Err(EngineError::AlreadyInitialized);
        }

        if config.device != Device::Cpu {
            return Err(EngineError::DeviceNotSupported(
                config.device.name().to_string(),
            ));
        }

        *inner = Inner::fresh();
        inner.lifecycle = EngineLifecycle::Initialized;
        inner.config = Some(config);

        let shared = Arc::clone(&self.shared);
        let handle = std::thread::Builder::new()
            .name("voxstream-worker".into())
            .spawn(move || worker::run(shared, backend))
            .map_err(|e| EngineError::Internal(format!("failed to spawn worker: {e}")))?;
        *worker_slot = Some(handle);

        log::info!("engine: initialized");
        Ok(())
    }

    /// Register the event sink, replacing any previous one.
    ///
    /// # Errors
    ///
    /// [`EngineError::Disposed`] / [`EngineError::NotInitialized`] outside
    /// the `Initialized..SessionActive` states.
    pub fn set_callback(&self, sink: SharedSink) -> Result<(), EngineError> {
        let mut inner = self.shared.inner.lock().unwrap();
        match inner.lifecycle {
            EngineLifecycle::Disposed => return Err(EngineError::Disposed),
            EngineLifecycle::Uninitialized => return Err(EngineError::NotInitialized),
            _ => {}
        }
        inner.sink = Some(sink);
        Ok(())
    }

    /// Load a model by id.
    ///
    /// The lifecycle flips to `ModelLoaded` immediately while the actual
    /// backend load runs in the background — deliberately optimistic so
    /// `start_session` never blocks on the worker.  If the background load
    /// fails, the worker rolls the state back and reports a
    /// `MODEL_LOAD_FAILED` error event; a session started inside that
    /// window is force-aborted.
    ///
    /// Loading a new model implicitly replaces the previous one.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Disposed`] / [`EngineError::NotInitialized`]
    /// - [`EngineError::SessionAlreadyActive`] — end the session first.
    /// - [`EngineError::ModelNotFound`] — empty or unknown id.
    pub fn load_model(&self, model_id: &str) -> Result<(), EngineError> {
        let mut inner = self.shared.inner.lock().unwrap();
        match inner.lifecycle {
            EngineLifecycle::Disposed => return Err(EngineError::Disposed),
            EngineLifecycle::Uninitialized => return Err(EngineError::NotInitialized),
            EngineLifecycle::SessionActive => return Err(EngineError::SessionAlreadyActive),
            _ => {}
        }

        let model = find_model_by_id(model_id)
            .ok_or_else(|| EngineError::ModelNotFound(model_id.to_string()))?;

        inner.queue.push_back(WorkItem::LoadModel(model));
        inner.loaded_model = Some(model);
        inner.lifecycle = EngineLifecycle::ModelLoaded;
        drop(inner);
        self.shared.work_ready.notify_one();

        log::info!("engine: model '{model_id}' load requested");
        Ok(())
    }

    /// Unload the current model.  No-op success when nothing is loaded.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Disposed`] / [`EngineError::NotInitialized`]
    /// - [`EngineError::SessionAlreadyActive`] — end the session first.
    pub fn unload_model(&self) -> Result<(), EngineError> {
        let mut inner = self.shared.inner.lock().unwrap();
        match inner.lifecycle {
            EngineLifecycle::Disposed => return Err(EngineError::Disposed),
            EngineLifecycle::Uninitialized => return Err(EngineError::NotInitialized),
            EngineLifecycle::SessionActive => return Err(EngineError::SessionAlreadyActive),
            _ => {}
        }

        let had_model = inner.loaded_model.take().is_some();
        if had_model {
            inner.queue.push_back(WorkItem::UnloadModel);
        }
        if inner.lifecycle == EngineLifecycle::ModelLoaded {
            inner.lifecycle = EngineLifecycle::Initialized;
        }
        drop(inner);
        if had_model {
            self.shared.work_ready.notify_one();
            log::info!("engine: model unloaded");
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Session operations
    // -----------------------------------------------------------------------

    /// Start a streaming session and return its id.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Disposed`] / [`EngineError::NotInitialized`]
    /// - [`EngineError::ModelNotLoaded`] — load a model first.
    /// - [`EngineError::SessionAlreadyActive`] — one session at a time.
    pub fn start_session(&self, config: &SessionConfig) -> Result<SessionId, EngineError> {
        let mut inner = self.shared.inner.lock().unwrap();
        match inner.lifecycle {
            EngineLifecycle::Disposed => return Err(EngineError::Disposed),
            EngineLifecycle::Uninitialized => return Err(EngineError::NotInitialized),
            _ => {}
        }
        if inner.loaded_model.is_none() {
            return Err(EngineError::ModelNotLoaded);
        }
        if inner.active_session.is_some() {
            return Err(EngineError::SessionAlreadyActive);
        }

        let session = Session::new(config);
        let session_id = session.id.clone();
        let language = session.language.clone();
        inner.sessions.insert(session_id.clone(), session);
        inner.active_session = Some(session_id.clone());
        inner.lifecycle = EngineLifecycle::SessionActive;
        drop(inner);

        log::info!("engine: session {session_id} started (language {language})");
        Ok(session_id)
    }

    /// Submit one chunk of 16 kHz mono f32 audio for the active session.
    ///
    /// Non-blocking: the chunk is moved into the work queue and transcribed
    /// asynchronously.  When the queue already holds [`QUEUE_CAPACITY`]
    /// items the chunk is rejected with `BackpressureLimit` (and a
    /// `BackpressureWarning` event), not queued — retry or drop is the
    /// caller's policy.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Disposed`]
    /// - [`EngineError::SessionEnded`] — no session is active.
    /// - [`EngineError::InvalidSession`] — id does not match.
    /// - [`EngineError::AudioStreamError`] — empty `samples`.
    /// - [`EngineError::BackpressureLimit`] — queue full.
    pub fn push_audio(&self, session_id: &str, samples: Vec<f32>) -> Result<(), EngineError> {
        let mut inner = self.shared.inner.lock().unwrap();
        if inner.lifecycle == EngineLifecycle::Disposed {
            return Err(EngineError::Disposed);
        }
        let active = match inner.active_session.as_deref() {
            None => return Err(EngineError::SessionEnded),
            Some(active) => active,
        };
        if active != session_id {
            return Err(EngineError::InvalidSession(session_id.to_string()));
        }
        if samples.is_empty() {
            return Err(EngineError::AudioStreamError("empty audio buffer".into()));
        }

        if inner.queue.len() >= QUEUE_CAPACITY {
            inner.dropped_chunks += 1;
            let dropped = inner.dropped_chunks;
            let sink = inner.sink.clone();
            drop(inner);
            log::warn!("engine: backpressure limit reached, chunk dropped ({dropped} total)");
            if let Some(sink) = sink {
                sink.on_event(EngineEvent::BackpressureWarning {
                    dropped_chunks: dropped,
                });
            }
            return Err(EngineError::BackpressureLimit);
        }

        let session_id = session_id.to_string();
        inner.queue.push_back(WorkItem::ProcessAudio {
            session_id: session_id.clone(),
            samples,
        });
        if let Some(session) = inner.sessions.get_mut(&session_id) {
            session.chunk_count += 1;
        }
        drop(inner);
        self.shared.work_ready.notify_one();
        Ok(())
    }

    /// End the active session.
    ///
    /// Returns synchronously: session state is cleared and the lifecycle
    /// reverts to `ModelLoaded` immediately, while the merge and the
    /// `FinalTranscript` event happen asynchronously in the worker after
    /// all chunks queued before this call have been processed.
    ///
    /// # Errors
    ///
    /// Same id checks as [`Engine::push_audio`]: `Disposed`,
    /// `SessionEnded`, `InvalidSession`.
    pub fn end_session(&self, session_id: &str) -> Result<(), EngineError> {
        let mut inner = self.validate_session(session_id)?;

        inner.queue.push_back(WorkItem::EndSession {
            session_id: session_id.to_string(),
        });
        inner.active_session = None;
        inner.lifecycle = EngineLifecycle::ModelLoaded;
        drop(inner);
        self.shared.work_ready.notify_one();

        log::info!("engine: session {session_id} ended");
        Ok(())
    }

    /// Abort the active session, discarding all accumulated partials.
    ///
    /// No `FinalTranscript` is ever emitted for an aborted session; chunks
    /// still sitting in the queue become worker no-ops.
    ///
    /// # Errors
    ///
    /// Same id checks as [`Engine::end_session`].
    pub fn abort_session(&self, session_id: &str) -> Result<(), EngineError> {
        let mut inner = self.validate_session(session_id)?;

        inner.sessions.remove(session_id);
        inner.active_session = None;
        inner.lifecycle = EngineLifecycle::ModelLoaded;
        drop(inner);

        log::info!("engine: session {session_id} aborted");
        Ok(())
    }

    /// Tear the engine down.  Infallible and idempotent.
    ///
    /// Requests worker shutdown, drains the queue gracefully (a `Shutdown`
    /// item marks the hard stop), joins the worker thread, then clears all
    /// state.  The join happens with the state lock released, so the
    /// worker can always finish its drain.
    pub fn dispose(&self) {
        {
            let mut inner = self
                .shared
                .inner
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            match inner.lifecycle {
                EngineLifecycle::Disposed => return,
                EngineLifecycle::Uninitialized => {
                    inner.lifecycle = EngineLifecycle::Disposed;
                    return;
                }
                _ => {}
            }

            inner.shutdown_requested = true;
            inner.queue.push_back(WorkItem::Shutdown);
        }
        self.shared.work_ready.notify_one();

        let handle = self
            .worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }

        let mut inner = self
            .shared
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *inner = Inner::fresh();
        inner.lifecycle = EngineLifecycle::Disposed;

        log::info!("engine: disposed");
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> EngineLifecycle {
        self.shared.inner.lock().unwrap().lifecycle
    }

    /// Returns `true` between a successful `init` and `dispose`.
    pub fn is_initialized(&self) -> bool {
        self.lifecycle().is_operational()
    }

    /// Id of the most recently loaded model, if any.
    pub fn loaded_model(&self) -> Option<&'static str> {
        self.shared.inner.lock().unwrap().loaded_model.map(|m| m.id)
    }

    /// Id of the active session, if any.
    pub fn active_session(&self) -> Option<SessionId> {
        self.shared.inner.lock().unwrap().active_session.clone()
    }

    /// Number of chunks accepted for the given session so far, or `None`
    /// when the session is unknown.
    pub fn chunk_count(&self, session_id: &str) -> Option<u64> {
        self.shared
            .inner
            .lock()
            .unwrap()
            .sessions
            .get(session_id)
            .map(|s| s.chunk_count)
    }

    /// Config snapshot captured by the most recent `init`, if any.
    pub fn config(&self) -> Option<EngineConfig> {
        self.shared.inner.lock().unwrap().config.clone()
    }

    /// Total chunks rejected by backpressure since `init`.
    pub fn dropped_chunks(&self) -> u64 {
        self.shared.inner.lock().unwrap().dropped_chunks
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Shared `Disposed` / `SessionEnded` / `InvalidSession` validation for
    /// session-scoped operations.  Returns the still-held guard on success.
    fn validate_session(
        &self,
        session_id: &str,
    ) -> Result<std::sync::MutexGuard<'_, Inner>, EngineError> {
        let inner = self.shared.inner.lock().unwrap();
        if inner.lifecycle == EngineLifecycle::Disposed {
            return Err(EngineError::Disposed);
        }
        match inner.active_session.as_deref() {
            None => Err(EngineError::SessionEnded),
            Some(active) if active != session_id => {
                Err(EngineError::InvalidSession(session_id.to_string()))
            }
            Some(_) => Ok(inner),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("lifecycle", &self.lifecycle())
            .finish_non_exhaustive()
    }
}
