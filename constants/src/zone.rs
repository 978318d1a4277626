use std::f32::consts::PI;

/// Shape of a zone placed by clicking the mesh surface.
pub const DEFAULT_ZONE_RADIUS: f32 = 1.0;
pub const DEFAULT_ZONE_HEIGHT: f32 = 15.0;

/// Editor bounds. Imported records are only required to be positive.
pub const MIN_ZONE_RADIUS: f32 = 0.1;
pub const MAX_ZONE_RADIUS: f32 = 100.0;
pub const MIN_ZONE_HEIGHT: f32 = 1.0;
pub const MAX_ZONE_HEIGHT: f32 = 100.0;
pub const POSITION_LIMIT: f32 = 1000.0;
pub const ROTATION_LIMIT: f32 = PI;

/// Stepper increments used by the native parameter panel.
pub const RADIUS_STEP: f32 = 0.1;
pub const HEIGHT_STEP: f32 = 1.0;
pub const POSITION_STEP: f32 = 0.5;
pub const ROTATION_STEP: f32 = PI / 36.0;

/// Tessellation of the zone cylinder. Regenerated geometry keeps these.
pub const ZONE_RADIAL_SEGMENTS: u32 = 32;
pub const ZONE_HEIGHT_SEGMENTS: u32 = 1;
