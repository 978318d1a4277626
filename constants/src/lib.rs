//! Shared constants for the drill zone viewer: asset paths, render settings,
//! and the geometric limits of a drill zone.

pub mod path;
pub mod render_settings;
pub mod zone;
