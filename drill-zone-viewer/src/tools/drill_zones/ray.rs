use bevy::math::Affine3A;
use bevy::prelude::*;
use bevy::render::mesh::{MeshAabb, PrimitiveTopology, VertexAttributeValues};

use super::state::ZoneId;

// Distance within which a zone hit beats a surface hit, so a cap flush with the mesh still deletes
const ZONE_TIE_EPSILON: f32 = 1e-4;
const PARALLEL_EPSILON: f32 = 1e-8;

/// A mesh the pointer ray is tested against.
pub struct PickTarget<'a> {
    pub entity: Entity,
    pub zone: Option<ZoneId>,
    pub world_from_local: Affine3A,
    pub mesh: &'a Mesh,
}

/// Closest intersection along a ray, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub zone: Option<ZoneId>,
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

/// Nearest intersection of the pointer ray with the mesh or a zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceContact {
    pub world_point: Vec3,
    /// Same point in the mesh root's frame.
    pub local_point: Vec3,
    pub normal: Vec3,
    /// Set when the nearest hit is a zone rather than the mesh surface.
    pub hit_zone: Option<ZoneId>,
}

impl SurfaceContact {
    pub fn from_hit(hit: &RayHit, mesh_root: &GlobalTransform) -> Self {
        Self {
            world_point: hit.point,
            local_point: mesh_root.affine().inverse().transform_point3(hit.point),
            normal: hit.normal,
            hit_zone: hit.zone,
        }
    }
}

// Slab-method ray–AABB intersection, returns Some(t) or None
pub fn ray_aabb_hit_t(ray_origin: Vec3, ray_direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let inv = Vec3::new(
        if ray_direction.x != 0.0 { 1.0 / ray_direction.x } else { f32::INFINITY },
        if ray_direction.y != 0.0 { 1.0 / ray_direction.y } else { f32::INFINITY },
        if ray_direction.z != 0.0 { 1.0 / ray_direction.z } else { f32::INFINITY },
    );
    let near = (min - ray_origin) * inv;
    let far = (max - ray_origin) * inv;

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    for axis in 0..3 {
        // Origin inside a slab the ray runs parallel to: 0 * inf is NaN, treat the axis as unbounded
        let (a, b) = (near[axis], far[axis]);
        if a.is_nan() || b.is_nan() { continue; }
        t_enter = t_enter.max(a.min(b));
        t_exit = t_exit.min(a.max(b));
        if t_enter > t_exit { return None; }
    }

    if t_exit < 0.0 { return None; }
    Some(if t_enter >= 0.0 { t_enter } else { t_exit })
}

/// Möller–Trumbore, double sided. Returns the ray parameter of the hit.
pub fn ray_triangle_t(origin: Vec3, direction: Vec3, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let p = direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < PARALLEL_EPSILON { return None; }

    let inv_det = 1.0 / det;
    let s = origin - v0;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) { return None; }

    let q = s.cross(edge1);
    let v = direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 { return None; }

    let t = edge2.dot(q) * inv_det;
    (t >= 0.0).then_some(t)
}

/// Closest hit of a world ray against a triangle mesh placed by `world_from_local`.
///
/// The ray is moved into the mesh frame rather than the mesh into world space. An affine map
/// keeps the ray parameter, so `t` found locally is also the world distance along `ray`.
pub fn ray_mesh_hit(ray: Ray3d, world_from_local: Affine3A, mesh: &Mesh) -> Option<(f32, Vec3, Vec3)> {
    if mesh.primitive_topology() != PrimitiveTopology::TriangleList { return None; }
    let Some(VertexAttributeValues::Float32x3(positions)) = mesh.attribute(Mesh::ATTRIBUTE_POSITION) else { return None; };

    let local_from_world = world_from_local.inverse();
    let origin = local_from_world.transform_point3(ray.origin);
    let direction = local_from_world.transform_vector3(*ray.direction);

    // Broad phase against the mesh bounds
    if let Some(aabb) = mesh.compute_aabb() {
        ray_aabb_hit_t(origin, direction, Vec3::from(aabb.min()), Vec3::from(aabb.max()))?;
    }

    let vertex = |i: usize| positions.get(i).map(|p| Vec3::from_array(*p));
    let mut closest: Option<(f32, [Vec3; 3])> = None;
    let mut test = |a: Option<Vec3>, b: Option<Vec3>, c: Option<Vec3>| {
        let (Some(v0), Some(v1), Some(v2)) = (a, b, c) else { return; };
        if let Some(t) = ray_triangle_t(origin, direction, v0, v1, v2) {
            if closest.is_none_or(|(best, _)| t < best) { closest = Some((t, [v0, v1, v2])); }
        }
    };

    match mesh.indices() {
        Some(indices) => {
            let indices: Vec<usize> = indices.iter().collect();
            for tri in indices.chunks_exact(3) { test(vertex(tri[0]), vertex(tri[1]), vertex(tri[2])); }
        }
        None => {
            for tri in (0..positions.len()).collect::<Vec<_>>().chunks_exact(3) { test(vertex(tri[0]), vertex(tri[1]), vertex(tri[2])); }
        }
    }

    let (t, [v0, v1, v2]) = closest?;
    let point = ray.get_point(t);

    // Face normal via the inverse transpose so non-uniform scale stays correct
    let local_normal = (v1 - v0).cross(v2 - v0);
    let normal_matrix = Mat3::from(world_from_local.matrix3).inverse().transpose();
    let mut normal = (normal_matrix * local_normal).normalize_or_zero();
    if normal.dot(*ray.direction) > 0.0 { normal = -normal; }

    Some((t, point, normal))
}

/// Nearest hit across all targets. Zones win ties with the surface.
pub fn nearest_hit<'a>(ray: Ray3d, targets: impl IntoIterator<Item = PickTarget<'a>>) -> Option<RayHit> {
    let mut best: Option<RayHit> = None;
    for target in targets {
        let Some((distance, point, normal)) = ray_mesh_hit(ray, target.world_from_local, target.mesh) else { continue; };
        let hit = RayHit { entity: target.entity, zone: target.zone, distance, point, normal };
        best = match best {
            Some(current) if !supersedes(&hit, &current) => Some(current),
            _ => Some(hit),
        };
    }
    best
}

fn supersedes(candidate: &RayHit, current: &RayHit) -> bool {
    match (candidate.zone.is_some(), current.zone.is_some()) {
        (true, false) => candidate.distance <= current.distance + ZONE_TIE_EPSILON,
        (false, true) => candidate.distance < current.distance - ZONE_TIE_EPSILON,
        _ => candidate.distance < current.distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane() -> Mesh {
        Plane3d::new(Vec3::Y, Vec2::splat(50.0)).mesh().build()
    }

    fn down_ray(x: f32, z: f32) -> Ray3d {
        Ray3d::new(Vec3::new(x, 10.0, z), Dir3::NEG_Y)
    }

    #[test]
    fn aabb_slab_hits_and_misses() {
        let (min, max) = (Vec3::splat(-1.0), Vec3::splat(1.0));
        assert_eq!(ray_aabb_hit_t(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, min, max), Some(4.0));
        assert_eq!(ray_aabb_hit_t(Vec3::ZERO, Vec3::X, min, max), Some(1.0));
        assert_eq!(ray_aabb_hit_t(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z, min, max), None);
        assert_eq!(ray_aabb_hit_t(Vec3::new(0.0, 0.0, 5.0), Vec3::Z, min, max), None);
    }

    #[test]
    fn triangle_hit_is_double_sided() {
        let (v0, v1, v2) = (Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(ray_triangle_t(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, v0, v1, v2), Some(2.0));
        assert_eq!(ray_triangle_t(Vec3::new(0.0, -3.0, 0.0), Vec3::Y, v0, v1, v2), Some(3.0));
        assert_eq!(ray_triangle_t(Vec3::new(5.0, 2.0, 0.0), Vec3::NEG_Y, v0, v1, v2), None);
        assert_eq!(ray_triangle_t(Vec3::new(0.0, 2.0, 0.0), Vec3::X, v0, v1, v2), None);
    }

    #[test]
    fn mesh_hit_respects_target_transform() {
        let cube = Cuboid::new(2.0, 2.0, 2.0).mesh().build();
        let world_from_local = Transform::from_xyz(0.0, 0.0, -5.0).with_scale(Vec3::splat(2.0)).compute_affine();
        let ray = Ray3d::new(Vec3::new(0.3, 0.2, 0.0), Dir3::NEG_Z);

        let (distance, point, normal) = ray_mesh_hit(ray, world_from_local, &cube).unwrap();
        assert!((distance - 3.0).abs() < 1e-4);
        assert!((point - Vec3::new(0.3, 0.2, -3.0)).length() < 1e-4);
        assert!(normal.dot(Vec3::Z) > 0.9999);

        let away = Ray3d::new(Vec3::new(0.3, 0.2, 0.0), Dir3::Z);
        assert!(ray_mesh_hit(away, world_from_local, &cube).is_none());
    }

    #[test]
    fn flush_zone_cap_wins_the_tie() {
        let surface = plane();
        let zone = Cylinder::new(1.0, 2.0).mesh().build();
        // Top cap at y = 0, level with the plane
        let zone_affine = Affine3A::from_translation(Vec3::new(0.0, -1.0, 0.0));
        let ray = down_ray(0.3, 0.2);

        let surface_target = || PickTarget { entity: Entity::from_raw(1), zone: None, world_from_local: Affine3A::IDENTITY, mesh: &surface };
        let zone_target = || PickTarget { entity: Entity::from_raw(2), zone: Some(ZoneId(7)), world_from_local: zone_affine, mesh: &zone };

        let hit = nearest_hit(ray, [surface_target(), zone_target()]).unwrap();
        assert_eq!(hit.zone, Some(ZoneId(7)));
        let hit = nearest_hit(ray, [zone_target(), surface_target()]).unwrap();
        assert_eq!(hit.zone, Some(ZoneId(7)));
        assert!((hit.distance - 10.0).abs() < 1e-4);
    }

    #[test]
    fn surface_in_front_of_buried_zone_wins() {
        let surface = plane();
        let zone = Cylinder::new(1.0, 2.0).mesh().build();
        let targets = [
            PickTarget { entity: Entity::from_raw(2), zone: Some(ZoneId(0)), world_from_local: Affine3A::from_translation(Vec3::new(0.0, -5.0, 0.0)), mesh: &zone },
            PickTarget { entity: Entity::from_raw(1), zone: None, world_from_local: Affine3A::IDENTITY, mesh: &surface },
        ];

        let hit = nearest_hit(down_ray(0.3, 0.2), targets).unwrap();
        assert_eq!(hit.zone, None);
        assert_eq!(hit.entity, Entity::from_raw(1));
        assert!(hit.normal.dot(Vec3::Y) > 0.9999);
    }

    #[test]
    fn empty_space_is_a_miss() {
        let surface = plane();
        let target = PickTarget { entity: Entity::from_raw(1), zone: None, world_from_local: Affine3A::IDENTITY, mesh: &surface };
        assert!(nearest_hit(down_ray(80.0, 0.0), [target]).is_none());
    }

    #[test]
    fn contact_reports_point_in_root_frame() {
        let root = GlobalTransform::from(Transform::from_xyz(10.0, 0.0, 0.0).with_scale(Vec3::splat(2.0)));
        let hit = RayHit { entity: Entity::from_raw(1), zone: None, distance: 1.0, point: Vec3::new(12.0, 4.0, -2.0), normal: Vec3::Y };

        let contact = SurfaceContact::from_hit(&hit, &root);
        assert!((contact.local_point - Vec3::new(1.0, 2.0, -1.0)).length() < 1e-5);
        assert_eq!(contact.world_point, hit.point);
    }
}
