use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use thiserror::Error;

use super::factory::{spawn_zone_visual, zone_geometry, zone_material};
use super::parameters::{apply_edit, ParameterError, ParameterFields, ZoneEdit, ZoneParameter};
use super::persistence::{serialize_zones, DrillZoneRecord};
use super::ray::{nearest_hit, PickTarget, SurfaceContact};
use super::selection::{SelectionChange, ZoneSelection};
use super::state::{DrillZone, DrillZoneStore, ZoneId, ZonePalette, ZonePlacement, ZoneShape};
use crate::engine::loading::mesh_loader::AnnotatedMesh;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ZoneError {
    #[error("no mesh is loaded")]
    NoMesh,

    #[error("drill zone {0:?} does not exist")]
    UnknownZone(ZoneId),

    #[error("record {index}: {source}")]
    InvalidRecord {
        index: usize,
        source: ParameterError,
    },

    #[error(transparent)]
    Parameter(#[from] ParameterError),
}

/// What a click on the viewport did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    Placed(ZoneId),
    Deleted(ZoneId),
    Missed,
}

/// Single entry point for every zone mutation.
///
/// The store, selection and editor fields change immediately; entity spawns and despawns go
/// through `Commands` and land at the next flush. Anything that must see the latest zones in
/// the same frame (hit tests included) reads the store, never the scene graph.
#[derive(SystemParam)]
pub struct ZoneEditor<'w, 's> {
    commands: Commands<'w, 's>,
    store: ResMut<'w, DrillZoneStore>,
    selection: ResMut<'w, ZoneSelection>,
    fields: ResMut<'w, ParameterFields>,
    meshes: ResMut<'w, Assets<Mesh>>,
    materials: ResMut<'w, Assets<StandardMaterial>>,
    palette: Res<'w, ZonePalette>,
    mesh_root: Query<'w, 's, (Entity, &'static GlobalTransform), With<AnnotatedMesh>>,
}

impl ZoneEditor<'_, '_> {
    pub fn store(&self) -> &DrillZoneStore {
        &self.store
    }

    pub fn selection(&self) -> ZoneSelection {
        *self.selection
    }

    fn root(&self) -> Result<(Entity, GlobalTransform), ZoneError> {
        self.mesh_root
            .single()
            .map(|(entity, transform)| (entity, *transform))
            .map_err(|_| ZoneError::NoMesh)
    }

    /// Place a zone at a world-space surface point. The stored position is in the mesh frame.
    pub fn add_zone(&mut self, world_point: Vec3, shape: ZoneShape) -> Result<ZoneId, ZoneError> {
        let (_, root) = self.root()?;
        let local = root.affine().inverse().transform_point3(world_point);
        self.insert(ZonePlacement::at(local), shape)
    }

    fn insert(&mut self, placement: ZonePlacement, shape: ZoneShape) -> Result<ZoneId, ZoneError> {
        let (root, _) = self.root()?;
        let id = self.store.allocate_id();
        let geometry = self.meshes.add(zone_geometry(shape));
        let material = self.materials.add(zone_material(self.palette.default));
        let visual = spawn_zone_visual(
            &mut self.commands,
            root,
            id,
            placement,
            geometry.clone(),
            material.clone(),
        );
        self.store.push(DrillZone {
            id,
            shape,
            placement,
            visual,
            geometry,
            material,
        });
        debug!("Drill zone {:?} added at {:?}", id, placement.position);
        Ok(id)
    }

    pub fn remove_zone(&mut self, id: ZoneId) -> Result<(), ZoneError> {
        let zone = self.store.remove(id).ok_or(ZoneError::UnknownZone(id))?;
        if self.selection.forget(id) {
            self.fields.detach();
        }
        self.dispose(zone);
        debug!("Drill zone {:?} removed", id);
        Ok(())
    }

    fn dispose(&mut self, zone: DrillZone) {
        self.commands.entity(zone.visual).despawn();
        self.meshes.remove(&zone.geometry);
        self.materials.remove(&zone.material);
    }

    /// Remove every zone. Returns how many were removed.
    pub fn clear_all(&mut self) -> usize {
        let zones = self.store.take_all();
        let count = zones.len();
        for zone in zones {
            self.dispose(zone);
        }
        self.selection.clear();
        self.fields.detach();
        count
    }

    /// Replace all zones with stored records. Nothing changes if any record is invalid.
    pub fn import(&mut self, records: &[DrillZoneRecord]) -> Result<usize, ZoneError> {
        self.root()?;
        let zones = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                record
                    .shape()
                    .map(|shape| (record.placement(), shape))
                    .map_err(|source| ZoneError::InvalidRecord { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.clear_all();
        for (placement, shape) in zones {
            self.insert(placement, shape)?;
        }
        Ok(records.len())
    }

    pub fn records(&self) -> Vec<DrillZoneRecord> {
        serialize_zones(&self.store)
    }

    /// Toggle the highlight of a zone.
    pub fn select(&mut self, id: ZoneId) -> Result<SelectionChange, ZoneError> {
        self.store.get(id).ok_or(ZoneError::UnknownZone(id))?;
        let change = self.selection.toggle(id);
        self.apply_selection(change);
        Ok(change)
    }

    fn activate(&mut self, id: ZoneId) {
        let change = self.selection.activate(id);
        self.apply_selection(change);
    }

    pub fn deselect(&mut self) {
        if let Some(id) = self.selection.clear() {
            self.recolour(id, self.palette.default);
        }
        self.fields.detach();
    }

    fn apply_selection(&mut self, change: SelectionChange) {
        if let Some(id) = change.released {
            self.recolour(id, self.palette.default);
        }
        match change.activated {
            Some(id) => {
                self.recolour(id, self.palette.highlight);
                if let Some(zone) = self.store.get(id) {
                    self.fields.bind(zone);
                }
            }
            None if change.released.is_some() => self.fields.detach(),
            None => {}
        }
    }

    fn recolour(&mut self, id: ZoneId, colour: Color) {
        let Some(zone) = self.store.get(id) else { return; };
        if let Some(material) = self.materials.get_mut(&zone.material) {
            material.base_color = colour;
        }
    }

    /// Apply an editor value to the active zone. Shape edits rebuild its geometry.
    pub fn edit(&mut self, parameter: ZoneParameter, raw: f32) -> Result<(), ZoneError> {
        let id = self.selection.active().ok_or(ParameterError::NoActiveZone)?;
        let value = parameter.sanitize(raw)?;
        let zone = self.store.get_mut(id).ok_or(ZoneError::UnknownZone(id))?;

        match apply_edit(parameter, value, zone.shape, zone.placement)? {
            ZoneEdit::Shape(shape) => {
                let geometry = self.meshes.add(zone_geometry(shape));
                let previous = std::mem::replace(&mut zone.geometry, geometry.clone());
                zone.shape = shape;
                self.commands.entity(zone.visual).insert(Mesh3d(geometry));
                self.meshes.remove(&previous);
            }
            ZoneEdit::Placement(placement) => {
                zone.placement = placement;
                self.commands.entity(zone.visual).insert(placement.transform());
            }
        }
        self.fields.bind(zone);
        Ok(())
    }

    /// World position of a zone's centre.
    pub fn world_position(&self, id: ZoneId) -> Option<Vec3> {
        let (_, root) = self.root().ok()?;
        let zone = self.store.get(id)?;
        Some(root.transform_point(zone.placement.position))
    }

    /// Nearest contact of `ray` with a zone or a surface mesh part.
    pub fn resolve_pointer<'a>(
        &self,
        ray: Ray3d,
        surfaces: impl IntoIterator<Item = (Entity, &'a GlobalTransform, &'a Mesh3d)>,
    ) -> Option<SurfaceContact> {
        let (_, root) = self.root().ok()?;
        let root_affine = root.affine();

        let zones = self.store.iter().filter_map(|zone| {
            Some(PickTarget {
                entity: zone.visual,
                zone: Some(zone.id),
                world_from_local: root_affine * zone.placement.transform().compute_affine(),
                mesh: self.meshes.get(&zone.geometry)?,
            })
        });
        let parts = surfaces.into_iter().filter_map(|(entity, transform, mesh)| {
            Some(PickTarget {
                entity,
                zone: None,
                world_from_local: transform.affine(),
                mesh: self.meshes.get(&mesh.0)?,
            })
        });

        let hit = nearest_hit(ray, zones.chain(parts))?;
        Some(SurfaceContact::from_hit(&hit, &root))
    }

    /// A click deletes the zone under the pointer, or places and selects a new one on the surface.
    pub fn handle_pointer<'a>(
        &mut self,
        ray: Ray3d,
        surfaces: impl IntoIterator<Item = (Entity, &'a GlobalTransform, &'a Mesh3d)>,
        shape: ZoneShape,
    ) -> PointerOutcome {
        let Some(contact) = self.resolve_pointer(ray, surfaces) else {
            return PointerOutcome::Missed;
        };

        if let Some(id) = contact.hit_zone {
            return match self.remove_zone(id) {
                Ok(()) => PointerOutcome::Deleted(id),
                Err(e) => {
                    warn!("Could not delete drill zone: {}", e);
                    PointerOutcome::Missed
                }
            };
        }

        match self.add_zone(contact.world_point, shape) {
            Ok(id) => {
                self.activate(id);
                PointerOutcome::Placed(id)
            }
            Err(e) => {
                warn!("Could not place drill zone: {}", e);
                PointerOutcome::Missed
            }
        }
    }
}
