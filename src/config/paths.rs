//! Cross-platform engine paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\voxstream\
//!   macOS:   ~/Library/Application Support/voxstream/
//!   Linux:   ~/.config/voxstream/
//!
//! Data dir (GGML model files):
//!   Windows: %LOCALAPPDATA%\voxstream\
//!   macOS:   ~/Library/Application Support/voxstream/
//!   Linux:   ~/.local/share/voxstream/

use std::path::PathBuf;

/// Holds all resolved engine directory/file paths.
#[derive(Debug, Clone)]
pub struct EnginePaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Directory for downloaded GGML model files.
    pub models_dir: PathBuf,
}

impl EnginePaths {
    const APP_NAME: &'static str = "voxstream";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let models_dir = data_dir.join("models");

        Self {
            config_dir,
            settings_file,
            models_dir,
        }
    }
}

impl Default for EnginePaths {
    fn default() -> Self {
        Self::new()
    }
}
