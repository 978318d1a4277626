//! Viewport camera for mesh inspection.
//!
//! Orbit controls around a focus point with scroll zoom and smooth
//! interpolation. Zones can move the focus point to themselves.

/// Viewport camera resource and controller system.
pub mod viewport_camera;
