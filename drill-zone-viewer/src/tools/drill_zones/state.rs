use bevy::prelude::*;
use constants::render_settings::{ZONE_COLOUR, ZONE_HIGHLIGHT_COLOUR};

use super::parameters::ParameterError;

/// Stable identity of a drill zone. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(pub u32);

/// Cylinder dimensions of a zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneShape {
    pub radius: f32,
    pub height: f32,
}

impl ZoneShape {
    /// Geometry is only ever built from a shape that passed this check.
    pub fn new(radius: f32, height: f32) -> Result<Self, ParameterError> {
        let valid = radius.is_finite() && height.is_finite() && radius > 0.0 && height > 0.0;
        if !valid {
            return Err(ParameterError::InvalidShape { radius, height });
        }
        Ok(Self { radius, height })
    }
}

/// Zone transform in the mesh root's local frame. Rotation is XYZ Euler, radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ZonePlacement {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl ZonePlacement {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
        }
    }

    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).with_rotation(self.rotation_quat())
    }
}

/// A placed zone and the scene resources it exclusively owns.
#[derive(Debug, Clone)]
pub struct DrillZone {
    pub id: ZoneId,
    pub shape: ZoneShape,
    pub placement: ZonePlacement,
    pub visual: Entity,
    pub geometry: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

/// Ordered, authoritative list of zones. Insertion order is display order.
///
/// Updated synchronously by [`super::store::ZoneEditor`]; the scene graph is a
/// deferred projection of it and may lag by one command flush.
#[derive(Resource, Default, Debug)]
pub struct DrillZoneStore {
    zones: Vec<DrillZone>,
    next_id: u32,
}

impl DrillZoneStore {
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrillZone> {
        self.zones.iter()
    }

    pub fn get(&self, id: ZoneId) -> Option<&DrillZone> {
        self.zones.iter().find(|zone| zone.id == id)
    }

    pub fn get_mut(&mut self, id: ZoneId) -> Option<&mut DrillZone> {
        self.zones.iter_mut().find(|zone| zone.id == id)
    }

    /// 1-based position of a zone in the display list.
    pub fn display_index(&self, id: ZoneId) -> Option<usize> {
        self.zones.iter().position(|zone| zone.id == id).map(|i| i + 1)
    }

    /// Zone at a 1-based display position.
    pub fn id_at(&self, display_index: usize) -> Option<ZoneId> {
        display_index
            .checked_sub(1)
            .and_then(|i| self.zones.get(i))
            .map(|zone| zone.id)
    }

    pub(crate) fn allocate_id(&mut self) -> ZoneId {
        let id = ZoneId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn push(&mut self, zone: DrillZone) {
        debug_assert!(self.get(zone.id).is_none());
        self.zones.push(zone);
    }

    pub(crate) fn remove(&mut self, id: ZoneId) -> Option<DrillZone> {
        let index = self.zones.iter().position(|zone| zone.id == id)?;
        Some(self.zones.remove(index))
    }

    pub(crate) fn take_all(&mut self) -> Vec<DrillZone> {
        std::mem::take(&mut self.zones)
    }
}

/// Flat colours used for zone materials.
#[derive(Resource, Debug, Clone, Copy)]
pub struct ZonePalette {
    pub default: Color,
    pub highlight: Color,
}

impl Default for ZonePalette {
    fn default() -> Self {
        Self {
            default: ZONE_COLOUR,
            highlight: ZONE_HIGHLIGHT_COLOUR,
        }
    }
}

/// Set while the pointer is over the zone panel so clicks do not reach the mesh.
#[derive(Resource, Default)]
pub struct PointerCapture {
    pub over_ui: bool,
}

// Components
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrillZoneVisual(pub ZoneId);

#[derive(Component)]
pub struct ZonePanelRoot;
#[derive(Component)]
pub struct ZoneListContainer;
#[derive(Component)]
pub struct ClearZonesButton;
#[derive(Component)]
pub struct SubmitZonesButton;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Highlight,
    Focus,
    Delete,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct ZoneRowButton {
    pub zone: ZoneId,
    pub action: RowAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(store: &mut DrillZoneStore) -> ZoneId {
        let id = store.allocate_id();
        store.push(DrillZone {
            id,
            shape: ZoneShape::new(1.0, 1.0).unwrap(),
            placement: ZonePlacement::default(),
            visual: Entity::PLACEHOLDER,
            geometry: Handle::default(),
            material: Handle::default(),
        });
        id
    }

    #[test]
    fn shape_rejects_non_positive_dimensions() {
        assert!(ZoneShape::new(0.0, 10.0).is_err());
        assert!(ZoneShape::new(1.0, -1.0).is_err());
        assert!(ZoneShape::new(f32::NAN, 1.0).is_err());
        assert!(ZoneShape::new(f32::INFINITY, 1.0).is_err());
        assert_eq!(
            ZoneShape::new(0.5, 0.25).unwrap(),
            ZoneShape {
                radius: 0.5,
                height: 0.25
            }
        );
    }

    #[test]
    fn ids_stay_unique_after_removal() {
        let mut store = DrillZoneStore::default();
        let first = zone(&mut store);
        let second = zone(&mut store);
        store.remove(first);
        let third = zone(&mut store);

        assert_ne!(third, first);
        assert_ne!(third, second);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn display_index_is_one_based_insertion_order() {
        let mut store = DrillZoneStore::default();
        let first = zone(&mut store);
        let second = zone(&mut store);

        assert_eq!(store.display_index(first), Some(1));
        assert_eq!(store.id_at(2), Some(second));
        assert_eq!(store.id_at(0), None);
        assert_eq!(store.id_at(3), None);

        store.remove(first);
        assert_eq!(store.display_index(second), Some(1));
    }

    #[test]
    fn placement_rotation_is_xyz_euler() {
        let placement = ZonePlacement {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::new(0.3, -0.2, 0.1),
        };
        let expected =
            Quat::from_rotation_x(0.3) * Quat::from_rotation_y(-0.2) * Quat::from_rotation_z(0.1);
        assert!(placement.rotation_quat().angle_between(expected) < 1e-5);
        assert_eq!(placement.transform().translation, placement.position);
    }
}
