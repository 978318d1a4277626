use bevy::prelude::*;
use constants::zone::{ZONE_HEIGHT_SEGMENTS, ZONE_RADIAL_SEGMENTS};

use super::state::{DrillZoneVisual, ZoneId, ZonePlacement, ZoneShape};

/// Upright cylinder centred on its local origin.
pub fn zone_geometry(shape: ZoneShape) -> Mesh {
    Cylinder::new(shape.radius, shape.height)
        .mesh()
        .resolution(ZONE_RADIAL_SEGMENTS)
        .segments(ZONE_HEIGHT_SEGMENTS)
        .build()
}

/// Flat, unlit colour. Each zone owns its material so highlighting never bleeds across zones.
pub fn zone_material(colour: Color) -> StandardMaterial {
    StandardMaterial {
        base_color: colour,
        unlit: true,
        ..default()
    }
}

pub fn spawn_zone_visual(
    commands: &mut Commands,
    mesh_root: Entity,
    id: ZoneId,
    placement: ZonePlacement,
    geometry: Handle<Mesh>,
    material: Handle<StandardMaterial>,
) -> Entity {
    commands
        .spawn((
            Name::new(format!("drill_zone_{}", id.0)),
            DrillZoneVisual(id),
            Mesh3d(geometry),
            MeshMaterial3d(material),
            placement.transform(),
            ChildOf(mesh_root),
        ))
        .id()
}

/// Largest horizontal distance of any vertex from the axis.
#[cfg(test)]
pub(crate) fn measured_radius(mesh: &Mesh) -> f32 {
    use bevy::render::mesh::VertexAttributeValues;

    match mesh.attribute(Mesh::ATTRIBUTE_POSITION) {
        Some(VertexAttributeValues::Float32x3(positions)) => positions
            .iter()
            .map(|[x, _, z]| Vec2::new(*x, *z).length())
            .fold(0.0, f32::max),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use bevy::render::mesh::MeshAabb;

    use super::*;

    #[test]
    fn geometry_matches_shape() {
        let mesh = zone_geometry(ZoneShape::new(2.5, 12.0).unwrap());
        assert!((measured_radius(&mesh) - 2.5).abs() < 1e-4);

        let aabb = mesh.compute_aabb().unwrap();
        assert!((aabb.max().y - 6.0).abs() < 1e-4);
        assert!((aabb.min().y + 6.0).abs() < 1e-4);
    }

    #[test]
    fn material_is_unlit_flat_colour() {
        let material = zone_material(Color::srgb(1.0, 0.0, 0.0));
        assert!(material.unlit);
        assert_eq!(material.base_color, Color::srgb(1.0, 0.0, 0.0));
    }
}
