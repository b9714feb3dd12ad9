//! Configuration module for the voxstream engine.
//!
//! Provides [`EngineConfig`] (init-time settings), [`SessionConfig`]
//! (per-session settings), [`EnginePaths`] for cross-platform data
//! directories, and TOML persistence via `EngineConfig::load` /
//! `EngineConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::EnginePaths;
pub use settings::{Device, EngineConfig, LogLevel, SessionConfig};
