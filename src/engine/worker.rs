//! The single consumer of the work queue.
//!
//! One thread, spawned by `Engine::init`, owns the inference backend for
//! its whole lifetime.  It sleeps on the condvar while the queue is empty,
//! pops items FIFO, and runs every backend call with the state lock
//! released.  Shutdown is graceful: items enqueued before `dispose` are
//! still drained, a `Shutdown` item (or an empty queue with the shutdown
//! flag set) ends the loop.

use std::sync::Arc;

use crate::engine::controller::Shared;
use crate::engine::events::EngineEvent;
use crate::engine::queue::WorkItem;
use crate::engine::session::SessionId;
use crate::engine::state::EngineLifecycle;
use crate::stt::{InferenceBackend, ModelInfo, SttError};

pub(crate) fn run(shared: Arc<Shared>, mut backend: Box<dyn InferenceBackend>) {
    log::info!("worker: started");
    loop {
        let item = {
            let mut inner = shared.inner.lock().unwrap();
            loop {
                if let Some(item) = inner.queue.pop_front() {
                    break item;
                }
                if inner.shutdown_requested {
                    log::info!("worker: queue drained, stopping");
                    return;
                }
                inner = shared.work_ready.wait(inner).unwrap();
            }
        };

        log::debug!("worker: handling {}", item.kind());
        match item {
            WorkItem::LoadModel(model) => load_model(&shared, backend.as_mut(), model),
            WorkItem::UnloadModel => backend.unload_model(),
            WorkItem::ProcessAudio { session_id, samples } => {
                process_audio(&shared, backend.as_mut(), session_id, &samples);
            }
            WorkItem::EndSession { session_id } => end_session(&shared, session_id),
            WorkItem::Shutdown => {
                log::info!("worker: shutdown requested, stopping");
                return;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Item handlers
// ---------------------------------------------------------------------------

fn load_model(shared: &Shared, backend: &mut dyn InferenceBackend, model: &'static ModelInfo) {
    emit(shared, EngineEvent::ModelProgress {
        model_id: model.id.to_string(),
        percent: 0,
    });

    match backend.load_model(model) {
        Ok(()) => {
            log::info!("worker: model '{}' loaded", model.id);
            emit(shared, EngineEvent::ModelProgress {
                model_id: model.id.to_string(),
                percent: 100,
            });
        }
        Err(e) => {
            log::error!("worker: model '{}' load failed: {e}", model.id);
            roll_back_failed_load(shared, model);
            emit(shared, EngineEvent::Error {
                code: "MODEL_LOAD_FAILED",
                message: format!("failed to load model '{}': {e}", model.id),
                recoverable: true,
            });
        }
    }
}

/// Undo the optimistic state flip `load_model` performed, unless a newer
/// model request has superseded this one in the meantime.  A session
/// started against the phantom model is force-aborted.
fn roll_back_failed_load(shared: &Shared, failed: &'static ModelInfo) {
    let mut inner = shared.inner.lock().unwrap();
    if inner.loaded_model.map(|m| m.id) != Some(failed.id) {
        return;
    }
    inner.loaded_model = None;
    if let Some(session_id) = inner.active_session.take() {
        log::warn!("worker: aborting session {session_id} after failed model load");
        inner.sessions.remove(&session_id);
    }
    if inner.lifecycle.is_operational() {
        inner.lifecycle = EngineLifecycle::Initialized;
    }
}

fn process_audio(
    shared: &Shared,
    backend: &mut dyn InferenceBackend,
    session_id: SessionId,
    samples: &[f32],
) {
    // Aborted or removed sessions leave their queued chunks behind; skip
    // them without touching the backend.
    let vad_enabled = {
        let inner = shared.inner.lock().unwrap();
        match inner.sessions.get(&session_id) {
            Some(session) => session.vad_enabled,
            None => {
                log::debug!("worker: dropping chunk for stale session {session_id}");
                return;
            }
        }
    };

    if vad_enabled && backend.is_silent(samples) {
        log::trace!("worker: silent chunk for session {session_id}");
        return;
    }

    match backend.transcribe(samples) {
        Ok(text) => {
            if text.is_empty() {
                return;
            }
            let mut inner = shared.inner.lock().unwrap();
            match inner.sessions.get_mut(&session_id) {
                Some(session) => session.push_partial(text.clone()),
                // Session finalized while we were transcribing.
                None => return,
            }
            drop(inner);
            emit(shared, EngineEvent::PartialTranscript {
                session_id,
                text,
                is_stable: true,
            });
        }
        Err(e) if e.is_fatal() => {
            log::error!("worker: fatal inference error for session {session_id}: {e}");
            let mut inner = shared.inner.lock().unwrap();
            inner.sessions.remove(&session_id);
            if inner.active_session.as_deref() == Some(session_id.as_str()) {
                inner.active_session = None;
            }
            inner.loaded_model = None;
            if inner.lifecycle.is_operational() {
                inner.lifecycle = EngineLifecycle::Initialized;
            }
            drop(inner);
            emit(shared, EngineEvent::Error {
                code: stt_error_code(&e),
                message: format!("session {session_id} aborted: {e}"),
                recoverable: false,
            });
        }
        Err(e) => {
            // Recoverable: report, drop this chunk, keep the session alive.
            log::warn!("worker: chunk dropped for session {session_id}: {e}");
            emit(shared, EngineEvent::Error {
                code: stt_error_code(&e),
                message: e.to_string(),
                recoverable: true,
            });
        }
    }
}

fn end_session(shared: &Shared, session_id: SessionId) {
    let session = shared.inner.lock().unwrap().sessions.remove(&session_id);
    let Some(session) = session else {
        log::debug!("worker: end of already-removed session {session_id}");
        return;
    };

    let elapsed = session.started_at.elapsed();
    let text = session.finalize();
    log::info!(
        "worker: session {session_id} finalized after {:.1}s ({} chars)",
        elapsed.as_secs_f32(),
        text.len()
    );
    emit(shared, EngineEvent::FinalTranscript { session_id, text });
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Deliver an event through the registered sink, if any.  The state lock
/// is released before the sink runs.
fn emit(shared: &Shared, event: EngineEvent) {
    let sink = shared.inner.lock().unwrap().sink.clone();
    if let Some(sink) = sink {
        sink.on_event(event);
    }
}

fn stt_error_code(e: &SttError) -> &'static str {
    match e {
        SttError::ModelNotFound(_) => "MODEL_NOT_FOUND",
        SttError::ModelLoadFailed(_) => "MODEL_LOAD_FAILED",
        SttError::ModelNotLoaded => "MODEL_NOT_LOADED",
        SttError::Inference(_) => "INFERENCE_FAILED",
        SttError::InvalidAudio => "AUDIO_STREAM_ERROR",
    }
}
