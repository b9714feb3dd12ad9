//! Streaming session aggregate.
//!
//! A [`Session`] collects the per-chunk partial transcripts of one
//! streaming interaction in arrival order and merges them into the final
//! transcript on finalize.  The merge is intentionally simple and
//! order-preserving: chunks are assumed non-overlapping and already
//! segmented, so concatenation with whitespace normalisation is all that
//! is needed — no semantic stitching.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use rand::Rng;

use crate::config::SessionConfig;

/// Opaque session identifier, unique for the process lifetime.
pub type SessionId = String;

// ---------------------------------------------------------------------------
// Session id generation
// ---------------------------------------------------------------------------

/// Generate a collision-free session id: the current Unix time in
/// milliseconds plus nine random base-36 characters, e.g.
/// `session_1714651200123_k3f9x0q2m`.
pub(crate) fn generate_session_id() -> SessionId {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| {
            let r = rng.gen_range(0..36u32);
            char::from_digit(r, 36).unwrap_or('0')
        })
        .collect();

    format!("session_{millis}_{suffix}")
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One bounded unit of streaming transcription work.
///
/// At most one session is *active* engine-wide at any time; an ended
/// session may briefly outlive its active phase while the worker drains
/// the chunks queued ahead of the `EndSession` item.
#[derive(Debug)]
pub struct Session {
    /// Unique token handed to the caller by `start_session`.
    pub id: SessionId,
    /// ISO-639-1 language code or `"auto"`.
    pub language: String,
    /// Whether VAD hints are enabled for this session.
    pub vad_enabled: bool,
    /// Number of chunks accepted by `push_audio` so far.
    pub chunk_count: u64,
    /// Per-chunk transcripts in arrival order.  Empty results are never
    /// stored.
    partials: Vec<String>,
    /// When the session was started.
    pub started_at: Instant,
}

impl Session {
    /// Create a session with a freshly generated id.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            id: generate_session_id(),
            language: config.language.clone(),
            vad_enabled: config.vad_enabled,
            chunk_count: 0,
            partials: Vec::new(),
            started_at: Instant::now(),
        }
    }

    /// Append one chunk transcript.  Empty fragments are discarded so the
    /// merge never has to handle them.
    pub fn push_partial(&mut self, text: String) {
        if !text.is_empty() {
            self.partials.push(text);
        }
    }

    /// Number of stored partials.
    pub fn partial_count(&self) -> usize {
        self.partials.len()
    }

    /// Merge all partials into the final transcript, consuming the session.
    ///
    /// A session is finalized at most once: the worker removes it from the
    /// aggregation map before calling this, so a second finalize is
    /// impossible by construction.
    pub fn finalize(self) -> String {
        merge_partials(&self.partials)
    }
}

// ---------------------------------------------------------------------------
// Merge rule
// ---------------------------------------------------------------------------

/// Concatenate fragments in order with whitespace normalisation.
///
/// Between consecutive fragments exactly one space is inserted unless
/// either adjacent boundary already provides one: the accumulated text
/// ends with `' '` or the next fragment starts with `' '`.  Only a plain
/// space counts as boundary whitespace.  The final result is trimmed of
/// spaces, tabs and newlines at both ends.
pub fn merge_partials(partials: &[String]) -> String {
    let mut merged = String::new();

    for partial in partials {
        if partial.is_empty() {
            continue;
        }
        if !merged.is_empty() && !merged.ends_with(' ') && !partial.starts_with(' ') {
            merged.push(' ');
        }
        merged.push_str(partial);
    }

    merged.trim_matches([' ', '\t', '\n']).to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
