//! Work items flowing from the controller to the worker loop.
//!
//! The queue itself is a `VecDeque<WorkItem>` living inside the
//! controller's single critical section, paired with a `Condvar` for
//! wakeups — one producer-side bounded FIFO, one consumer.  The capacity
//! is enforced only by `push_audio`: lifecycle items (`LoadModel`,
//! `EndSession`, `Shutdown`) are always accepted, or sessions could not
//! end and shutdown could not be requested under sustained backpressure.

use crate::engine::session::SessionId;
use crate::stt::ModelInfo;

/// Maximum number of pending work items before `push_audio` starts
/// rejecting chunks with `BackpressureLimit`.
pub const QUEUE_CAPACITY: usize = 10;

// ---------------------------------------------------------------------------
// WorkItem
// ---------------------------------------------------------------------------

/// One unit of work for the worker loop.
///
/// Produced by controller operations, consumed exactly once by the single
/// worker thread.  `ProcessAudio` owns its samples: the producer moves the
/// buffer in, and nothing else observes it after dequeue.
#[derive(Debug)]
pub enum WorkItem {
    /// Prepare `model` in the backend.
    LoadModel(&'static ModelInfo),

    /// Release the backend's model resources.
    UnloadModel,

    /// Transcribe one chunk for the given session.
    ProcessAudio {
        session_id: SessionId,
        samples: Vec<f32>,
    },

    /// Finalize the session: merge partials, emit the final transcript.
    EndSession { session_id: SessionId },

    /// Stop the worker loop unconditionally, regardless of remaining items.
    Shutdown,
}

impl WorkItem {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkItem::LoadModel(_) => "LoadModel",
            WorkItem::UnloadModel => "UnloadModel",
            WorkItem::ProcessAudio { .. } => "ProcessAudio",
            WorkItem::EndSession { .. } => "EndSession",
            WorkItem::Shutdown => "Shutdown",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stt::find_model_by_id;

    #[test]
    fn kind_names() {
        let load = WorkItem::LoadModel(find_model_by_id("tiny").unwrap());
        assert_eq!(load.kind(), "LoadModel");
        assert_eq!(WorkItem::UnloadModel.kind(), "UnloadModel");
        assert_eq!(
            WorkItem::ProcessAudio {
                session_id: "s".into(),
                samples: vec![0.0],
            }
            .kind(),
            "ProcessAudio"
        );
        assert_eq!(
            WorkItem::EndSession {
                session_id: "s".into()
            }
            .kind(),
            "EndSession"
        );
        assert_eq!(WorkItem::Shutdown.kind(), "Shutdown");
    }

    #[test]
    fn capacity_is_ten() {
        assert_eq!(QUEUE_CAPACITY, 10);
    }
}
