use bevy::prelude::*;

/// Flat colour of a zone that is not selected.
pub const ZONE_COLOUR: Color = Color::srgb(1.0, 0.0, 0.0);

/// Flat colour of the active zone.
pub const ZONE_HIGHLIGHT_COLOUR: Color = Color::srgb(1.0, 1.0, 0.0);

/// Unlit colour applied to every part of the loaded mesh.
pub const MESH_COLOUR: Color = Color::WHITE;

/// Uniform scale applied to the mesh root after loading.
pub const MESH_ROOT_SCALE: f32 = 2.0;

/// Vertical field of view of the viewport camera, in degrees.
pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 5000.0;

/// Initial camera position; the camera looks at the origin.
pub const CAMERA_START_POSITION: Vec3 = Vec3::new(-100.0, -100.0, -200.0);

/// Closest and furthest the orbit camera may get to its focus point.
pub const CAMERA_MIN_DISTANCE: f32 = 1.0;
pub const CAMERA_MAX_DISTANCE: f32 = 4000.0;

/// Distance the camera settles at when focusing a zone.
pub const CAMERA_FOCUS_DISTANCE: f32 = 60.0;

/// Lifetime of an on-screen notification, in seconds.
pub const TOAST_DURATION_SECS: f32 = 4.0;
