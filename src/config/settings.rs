//! Engine and session settings, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::EnginePaths;

// ---------------------------------------------------------------------------
// Device
// ---------------------------------------------------------------------------

/// Compute device requested for inference.
///
/// Only [`Device::Cpu`] is supported in this design generation; requesting
/// [`Device::Gpu`] makes `Engine::init` fail with `DeviceNotSupported`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// CPU inference — the only supported device.
    Cpu,
    /// GPU inference — reserved, currently rejected at init.
    Gpu,
}

impl Device {
    /// Lowercase name as it appears in config files and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Device::Cpu => "cpu",
            Device::Gpu => "gpu",
        }
    }
}

impl Default for Device {
    fn default() -> Self {
        Device::Cpu
    }
}

// ---------------------------------------------------------------------------
// LogLevel
// ---------------------------------------------------------------------------

/// Verbosity of the engine's internal logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings.
    Warn,
    /// Normal operational logging (default).
    Info,
    /// Per-chunk tracing — noisy, for development.
    Debug,
}

impl LogLevel {
    /// Map to a [`log::LevelFilter`] for wiring into the `log` facade.
    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Settings passed to `Engine::init`, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use voxstream::config::EngineConfig;
///
/// // Load (returns Default when file is missing)
/// let config = EngineConfig::load().unwrap();
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Compute device for inference.
    pub device: Device,
    /// Engine logging verbosity.
    pub log_level: LogLevel,
    /// Override for the GGML models directory.  `None` means the platform
    /// default from [`EnginePaths`].
    pub models_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            device: Device::default(),
            log_level: LogLevel::default(),
            models_dir: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(EngineConfig::default())` when the file does not exist
    /// yet (first-run scenario) so callers never need to special-case a
    /// missing file.
    pub fn load() -> Result<Self> {
        Self::load_from(&EnginePaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&EnginePaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The models directory this config resolves to.
    pub fn resolved_models_dir(&self) -> PathBuf {
        self.models_dir
            .clone()
            .unwrap_or_else(|| EnginePaths::new().models_dir)
    }
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Settings for one streaming session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// ISO-639-1 language code (e.g. `"en"`), or `"auto"` for built-in
    /// language detection.
    pub language: String,
    /// Whether voice-activity detection hints are enabled for this session.
    pub vad_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            language: "auto".into(),
            vad_enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `EngineConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = EngineConfig::default();
        original.save_to(&path).expect("save");

        let loaded = EngineConfig::load_from(&path).expect("load");

        assert_eq!(original.device, loaded.device);
        assert_eq!(original.log_level, loaded.log_level);
        assert_eq!(original.models_dir, loaded.models_dir);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = EngineConfig::load_from(&path).expect("should not error");
        assert_eq!(config.device, Device::Cpu);
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.models_dir.is_none());
    }

    /// Verify that modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let cfg = EngineConfig {
            device: Device::Gpu,
            log_level: LogLevel::Debug,
            models_dir: Some(PathBuf::from("/opt/models")),
        };

        cfg.save_to(&path).expect("save");
        let loaded = EngineConfig::load_from(&path).expect("load");

        assert_eq!(loaded.device, Device::Gpu);
        assert_eq!(loaded.log_level, LogLevel::Debug);
        assert_eq!(loaded.models_dir, Some(PathBuf::from("/opt/models")));
    }

    #[test]
    fn device_names() {
        assert_eq!(Device::Cpu.name(), "cpu");
        assert_eq!(Device::Gpu.name(), "gpu");
    }

    #[test]
    fn log_level_maps_to_filter() {
        assert_eq!(LogLevel::Error.to_filter(), log::LevelFilter::Error);
        assert_eq!(LogLevel::Debug.to_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn session_config_defaults() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.language, "auto");
        assert!(cfg.vad_enabled);
    }

    #[test]
    fn resolved_models_dir_prefers_override() {
        let cfg = EngineConfig {
            models_dir: Some(PathBuf::from("/custom/models")),
            ..EngineConfig::default()
        };
        assert_eq!(cfg.resolved_models_dir(), PathBuf::from("/custom/models"));
    }
}
