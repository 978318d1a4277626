use std::ops::RangeInclusive;

use bevy::prelude::*;
use constants::zone::{
    HEIGHT_STEP, MAX_ZONE_HEIGHT, MAX_ZONE_RADIUS, MIN_ZONE_HEIGHT, MIN_ZONE_RADIUS,
    POSITION_LIMIT, POSITION_STEP, RADIUS_STEP, ROTATION_LIMIT, ROTATION_STEP,
};
use thiserror::Error;

use super::state::{DrillZone, ZoneId, ZonePlacement, ZoneShape};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("no drill zone is selected")]
    NoActiveZone,

    #[error("{parameter} must be a finite number")]
    NotFinite { parameter: &'static str },

    #[error("'{0}' is not a number")]
    NotNumeric(String),

    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("zone radius and height must be positive, got radius {radius} and height {height}")]
    InvalidShape { radius: f32, height: f32 },
}

/// One editable field of the active zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneParameter {
    Radius,
    Height,
    PositionX,
    PositionY,
    PositionZ,
    RotationX,
    RotationY,
    RotationZ,
}

impl ZoneParameter {
    pub const ALL: [Self; 8] = [
        Self::Radius,
        Self::Height,
        Self::PositionX,
        Self::PositionY,
        Self::PositionZ,
        Self::RotationX,
        Self::RotationY,
        Self::RotationZ,
    ];

    /// Wire name used by the RPC bridge.
    pub fn name(self) -> &'static str {
        match self {
            Self::Radius => "radius",
            Self::Height => "height",
            Self::PositionX => "position.x",
            Self::PositionY => "position.y",
            Self::PositionZ => "position.z",
            Self::RotationX => "rotation.x",
            Self::RotationY => "rotation.y",
            Self::RotationZ => "rotation.z",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Radius => "Radius",
            Self::Height => "Height",
            Self::PositionX => "Pos X",
            Self::PositionY => "Pos Y",
            Self::PositionZ => "Pos Z",
            Self::RotationX => "Rot X",
            Self::RotationY => "Rot Y",
            Self::RotationZ => "Rot Z",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ParameterError> {
        Self::ALL
            .into_iter()
            .find(|parameter| parameter.name() == name)
            .ok_or_else(|| ParameterError::UnknownParameter(name.to_string()))
    }

    /// Accepted editor range. Both ends are inclusive.
    pub fn range(self) -> RangeInclusive<f32> {
        match self {
            Self::Radius => MIN_ZONE_RADIUS..=MAX_ZONE_RADIUS,
            Self::Height => MIN_ZONE_HEIGHT..=MAX_ZONE_HEIGHT,
            Self::PositionX | Self::PositionY | Self::PositionZ => -POSITION_LIMIT..=POSITION_LIMIT,
            Self::RotationX | Self::RotationY | Self::RotationZ => -ROTATION_LIMIT..=ROTATION_LIMIT,
        }
    }

    pub fn step(self) -> f32 {
        match self {
            Self::Radius => RADIUS_STEP,
            Self::Height => HEIGHT_STEP,
            Self::PositionX | Self::PositionY | Self::PositionZ => POSITION_STEP,
            Self::RotationX | Self::RotationY | Self::RotationZ => ROTATION_STEP,
        }
    }

    /// Reject non-finite input and clamp into range.
    pub fn sanitize(self, raw: f32) -> Result<f32, ParameterError> {
        if !raw.is_finite() {
            return Err(ParameterError::NotFinite {
                parameter: self.name(),
            });
        }
        let range = self.range();
        Ok(raw.clamp(*range.start(), *range.end()))
    }

    /// Parse free text from an input field.
    pub fn parse(self, text: &str) -> Result<f32, ParameterError> {
        let raw: f32 = text
            .trim()
            .parse()
            .map_err(|_| ParameterError::NotNumeric(text.to_string()))?;
        self.sanitize(raw)
    }

    pub fn read(self, shape: &ZoneShape, placement: &ZonePlacement) -> f32 {
        match self {
            Self::Radius => shape.radius,
            Self::Height => shape.height,
            Self::PositionX => placement.position.x,
            Self::PositionY => placement.position.y,
            Self::PositionZ => placement.position.z,
            Self::RotationX => placement.rotation.x,
            Self::RotationY => placement.rotation.y,
            Self::RotationZ => placement.rotation.z,
        }
    }

    /// Rotations are stored in radians and shown in degrees.
    pub fn display(self, value: f32) -> String {
        match self {
            Self::RotationX | Self::RotationY | Self::RotationZ => {
                format!("{:.1}°", value.to_degrees())
            }
            _ => format!("{value:.2}"),
        }
    }
}

/// Result of applying one edit to a zone's current values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoneEdit {
    /// Geometry must be rebuilt.
    Shape(ZoneShape),
    /// Only the transform changes.
    Placement(ZonePlacement),
}

/// `value` must already be sanitized for `parameter`.
pub fn apply_edit(
    parameter: ZoneParameter,
    value: f32,
    shape: ZoneShape,
    placement: ZonePlacement,
) -> Result<ZoneEdit, ParameterError> {
    let mut placement = placement;
    match parameter {
        ZoneParameter::Radius => return ZoneShape::new(value, shape.height).map(ZoneEdit::Shape),
        ZoneParameter::Height => return ZoneShape::new(shape.radius, value).map(ZoneEdit::Shape),
        ZoneParameter::PositionX => placement.position.x = value,
        ZoneParameter::PositionY => placement.position.y = value,
        ZoneParameter::PositionZ => placement.position.z = value,
        ZoneParameter::RotationX => placement.rotation.x = value,
        ZoneParameter::RotationY => placement.rotation.y = value,
        ZoneParameter::RotationZ => placement.rotation.z = value,
    }
    Ok(ZoneEdit::Placement(placement))
}

/// Editor fields, bound to the active zone's current values.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub enum ParameterFields {
    #[default]
    Detached,
    Bound {
        zone: ZoneId,
        shape: ZoneShape,
        placement: ZonePlacement,
    },
}

impl ParameterFields {
    pub fn bind(&mut self, zone: &DrillZone) {
        *self = Self::Bound {
            zone: zone.id,
            shape: zone.shape,
            placement: zone.placement,
        };
    }

    pub fn detach(&mut self) {
        *self = Self::Detached;
    }

    pub fn target(&self) -> Option<ZoneId> {
        match self {
            Self::Detached => None,
            Self::Bound { zone, .. } => Some(*zone),
        }
    }

    pub fn value(&self, parameter: ZoneParameter) -> Option<f32> {
        match self {
            Self::Detached => None,
            Self::Bound {
                shape, placement, ..
            } => Some(parameter.read(shape, placement)),
        }
    }
}
