//! Session and worker-queue control plane.
//!
//! ```text
//!  caller threads                        worker thread
//!  ┌────────────────────┐               ┌──────────────────────┐
//!  │ Engine             │   WorkItem    │ worker::run          │
//!  │  init/load_model   │──▶ VecDeque ─▶│  owns the backend    │
//!  │  start/push/end    │   (cap 10)    │  transcribe chunks   │
//!  │  dispose           │               │  merge on EndSession │
//!  └────────────────────┘               └─────────┬────────────┘
//!            ▲                                    │ EngineEvent
//!            │ accessors                          ▼
//!       EngineLifecycle                      EventSink
//! ```
//!
//! Producers validate and enqueue under one lock and return immediately;
//! the worker is the only consumer and the only thread that touches the
//! inference backend.  Transcript fragments accumulate per session and are
//! merged into exactly one `FinalTranscript` when the session's
//! `EndSession` item is reached — after every chunk queued before it.

mod controller;
mod events;
mod queue;
mod session;
mod state;
mod worker;

pub use controller::Engine;
pub use events::{EngineEvent, EventSink, SharedSink};
pub use queue::QUEUE_CAPACITY;
pub use session::{merge_partials, SessionId};
pub use state::EngineLifecycle;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
