//! Engine lifecycle state machine.
//!
//! [`EngineLifecycle`] is the coarse-grained state every controller
//! operation validates against.  Exactly one lifecycle value exists per
//! engine, and it only changes inside the controller's critical section.

// ---------------------------------------------------------------------------
// EngineLifecycle
// ---------------------------------------------------------------------------

/// States of the engine control plane.
///
/// The transitions are:
///
/// ```text
/// Uninitialized ──init(ok)─────────▶ Initialized
/// Initialized   ──load_model(ok)───▶ ModelLoaded
/// ModelLoaded   ──unload_model─────▶ Initialized
/// ModelLoaded   ──start_session(ok)▶ SessionActive
/// SessionActive ──end_session(ok)──▶ ModelLoaded
/// any non-Disposed ──dispose───────▶ Disposed
/// Disposed      ──init(ok)─────────▶ Initialized
/// ```
///
/// There is no direct `SessionActive → Initialized` transition: switching
/// or unloading models requires ending the session first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineLifecycle {
    /// Handle exists but `init` has not been called.
    Uninitialized,

    /// Worker thread running, no model loaded.
    Initialized,

    /// A model is loaded (possibly still being prepared in the background).
    ModelLoaded,

    /// Exactly one streaming session is accepting audio.
    SessionActive,

    /// Torn down.  Only `init` (re-arm) and `dispose` (no-op) are valid.
    Disposed,
}

impl EngineLifecycle {
    /// Returns `true` while the engine accepts operations at all, i.e.
    /// between a successful `init` and `dispose`.
    pub fn is_operational(&self) -> bool {
        matches!(
            self,
            EngineLifecycle::Initialized
                | EngineLifecycle::ModelLoaded
                | EngineLifecycle::SessionActive
        )
    }

    /// A short human-readable label suitable for logs.
    pub fn label(&self) -> &'static str {
        match self {
            EngineLifecycle::Uninitialized => "Uninitialized",
            EngineLifecycle::Initialized => "Initialized",
            EngineLifecycle::ModelLoaded => "ModelLoaded",
            EngineLifecycle::SessionActive => "SessionActive",
            EngineLifecycle::Disposed => "Disposed",
        }
    }
}

impl Default for EngineLifecycle {
    fn default() -> Self {
        EngineLifecycle::Uninitialized
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
