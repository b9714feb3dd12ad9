//! Engine events and the sink that receives them.
//!
//! Transcripts, errors and progress are delivered asynchronously as
//! [`EngineEvent`] values through a caller-registered [`EventSink`].
//! Events are immutable snapshots — once emitted they share no state with
//! the engine.
//!
//! # Delivery contract
//!
//! The engine never invokes the sink while holding its internal lock, so a
//! sink may freely call back into the engine (e.g. `end_session` upon
//! detecting silence) without deadlocking.  The sink must be safe to invoke
//! from the worker thread concurrently with producer-thread operations.

use std::sync::Arc;

use crate::engine::session::SessionId;

// ---------------------------------------------------------------------------
// EngineEvent
// ---------------------------------------------------------------------------

/// All events the engine can deliver to the registered sink.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Transcript of one processed chunk, in arrival order.
    PartialTranscript {
        session_id: SessionId,
        text: String,
        /// Whether this partial can still be revised.  Chunks are decoded
        /// independently here, so partials are always stable; the flag
        /// stays for sinks that also consume overlapping decoders.
        is_stable: bool,
    },

    /// The merged transcript, emitted exactly once per finalized session.
    FinalTranscript {
        session_id: SessionId,
        text: String,
    },

    /// An asynchronous failure.  `recoverable` failures drop the offending
    /// chunk and the session continues; non-recoverable ones force-abort
    /// the session.
    Error {
        code: &'static str,
        message: String,
        recoverable: bool,
    },

    /// Background model preparation progress, 0–100.
    ModelProgress {
        model_id: String,
        percent: u8,
    },

    /// A chunk was rejected because the work queue was full.
    BackpressureWarning {
        /// Total chunks dropped this way since `init`.
        dropped_chunks: u64,
    },
}

// ---------------------------------------------------------------------------
// EventSink
// ---------------------------------------------------------------------------

/// Receiver for [`EngineEvent`]s.
///
/// Registered via `Engine::set_callback`; replaced wholesale on each call
/// (last-writer-wins).  Any `Fn(EngineEvent) + Send + Sync` closure is a
/// sink:
///
/// ```rust
/// use voxstream::engine::{EngineEvent, EventSink};
///
/// let sink: std::sync::Arc<dyn EventSink> =
///     std::sync::Arc::new(|event: EngineEvent| {
///         if let EngineEvent::FinalTranscript { text, .. } = event {
///             println!("{text}");
///         }
///     });
/// ```
pub trait EventSink: Send + Sync {
    /// Deliver one event.  Called outside the engine's internal lock.
    fn on_event(&self, event: EngineEvent);
}

impl<F> EventSink for F
where
    F: Fn(EngineEvent) + Send + Sync,
{
    fn on_event(&self, event: EngineEvent) {
        self(event)
    }
}

/// Shared handle to a registered sink.
pub type SharedSink = Arc<dyn EventSink>;

// ---------------------------------------------------------------------------
// RecordingSink  (test-only)
// ---------------------------------------------------------------------------

/// Test sink that records every event it receives, in delivery order.
#[cfg(test)]
pub(crate) struct RecordingSink {
    events: std::sync::Mutex<Vec<EngineEvent>>,
}

#[cfg(test)]
impl RecordingSink {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            events: std::sync::Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl EventSink for RecordingSink {
    fn on_event(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
