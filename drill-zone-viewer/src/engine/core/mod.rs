//! Core application setup and state management.
//!
//! Handles application lifecycle, runtime configuration, window setup,
//! and the loading state machine for both native and WASM targets.

/// Application setup and plugin configuration for the Bevy engine.
///
/// Creates the main app with the zone tooling, mesh loading systems,
/// and platform-specific configuration.
pub mod app_setup;

/// Application state machine from mesh loading to runtime or inert mode.
pub mod app_state;

/// Runtime configuration resolved from the command line or page URL.
pub mod config;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
