//! Model registry, metadata and path resolution.
//!
//! [`SUPPORTED_MODELS`] is the fixed set of model ids the engine accepts;
//! `Engine::load_model` rejects anything else with `ModelNotFound`.
//! [`ModelPaths`] resolves the on-disk location of a model's GGML file.

use std::path::PathBuf;

// ---------------------------------------------------------------------------
// ModelInfo
// ---------------------------------------------------------------------------

/// Static metadata for a single GGML model file.
#[derive(Debug, PartialEq, Eq)]
pub struct ModelInfo {
    /// Unique identifier passed to `Engine::load_model` (e.g. `"base"`).
    pub id: &'static str,
    /// Human-readable display name.
    pub display_name: &'static str,
    /// File name under the models directory (e.g. `"ggml-base.bin"`).
    pub file_name: &'static str,
    /// Approximate file size in megabytes.
    pub file_size_mb: u64,
    /// Minimum RAM required to run this model (megabytes).
    pub ram_required_mb: u64,
}

// ---------------------------------------------------------------------------
// Supported models
// ---------------------------------------------------------------------------

/// The fixed set of models this engine generation supports.
///
/// All are standard multilingual Whisper GGML files; larger tiers trade
/// latency for accuracy.
pub const SUPPORTED_MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "tiny",
        display_name: "Whisper Tiny",
        file_name: "ggml-tiny.bin",
        file_size_mb: 75,
        ram_required_mb: 390,
    },
    ModelInfo {
        id: "base",
        display_name: "Whisper Base",
        file_name: "ggml-base.bin",
        file_size_mb: 142,
        ram_required_mb: 500,
    },
    ModelInfo {
        id: "small",
        display_name: "Whisper Small",
        file_name: "ggml-small.bin",
        file_size_mb: 466,
        ram_required_mb: 1_000,
    },
    ModelInfo {
        id: "medium",
        display_name: "Whisper Medium",
        file_name: "ggml-medium.bin",
        file_size_mb: 1_500,
        ram_required_mb: 2_600,
    },
];

/// Find a [`ModelInfo`] by its `id` string.
///
/// Returns `None` for unknown ids, including the empty string.
pub fn find_model_by_id(id: &str) -> Option<&'static ModelInfo> {
    SUPPORTED_MODELS.iter().find(|m| m.id == id)
}

// ---------------------------------------------------------------------------
// ModelPaths
// ---------------------------------------------------------------------------

/// Resolves the on-disk location of model files.
///
/// ```rust,no_run
/// use voxstream::config::EnginePaths;
/// use voxstream::stt::{ModelPaths, SUPPORTED_MODELS};
///
/// let paths = ModelPaths::new(EnginePaths::new().models_dir);
/// let available: Vec<_> = SUPPORTED_MODELS.iter()
///     .filter(|m| paths.is_available(m))
///     .collect();
/// ```
#[derive(Debug, Clone)]
pub struct ModelPaths {
    /// Directory that contains (or will contain) GGML `.bin` files.
    pub models_dir: PathBuf,
}

impl ModelPaths {
    /// Construct from a models directory path.
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
        }
    }

    /// Full path to the GGML file for the given model.
    pub fn model_path(&self, model: &ModelInfo) -> PathBuf {
        self.models_dir.join(model.file_name)
    }

    /// Returns `true` if the model file exists on disk.
    pub fn is_available(&self, model: &ModelInfo) -> bool {
        self.model_path(model).exists()
    }

    /// Returns all supported models whose files are present on disk.
    pub fn list_local_models(&self) -> Vec<&'static ModelInfo> {
        SUPPORTED_MODELS
            .iter()
            .filter(|m| self.is_available(m))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_four_tiers() {
        let ids: Vec<_> = SUPPORTED_MODELS.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["tiny", "base", "small", "medium"]);
    }

    #[test]
    fn find_model_by_id_known() {
        let m = find_model_by_id("base").expect("base is supported");
        assert_eq!(m.file_name, "ggml-base.bin");
    }

    #[test]
    fn find_model_by_id_unknown() {
        assert!(find_model_by_id("does-not-exist").is_none());
    }

    #[test]
    fn find_model_by_id_empty() {
        assert!(find_model_by_id("").is_none());
    }

    #[test]
    fn model_paths_non_existent_returns_false() {
        let mp = ModelPaths::new("/nonexistent/path");
        assert!(!mp.is_available(&SUPPORTED_MODELS[0]));
        assert!(mp.list_local_models().is_empty());
    }

    #[test]
    fn model_paths_correct_file_name() {
        let mp = ModelPaths::new("/models");
        let p = mp.model_path(&SUPPORTED_MODELS[3]); // medium
        assert!(p.to_str().unwrap().ends_with("ggml-medium.bin"));
    }
}
