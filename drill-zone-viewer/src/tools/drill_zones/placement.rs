use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use super::state::{PointerCapture, ZoneShape};
use super::store::{PointerOutcome, ZoneEditor};
use crate::engine::core::config::ViewerConfig;
use crate::engine::loading::mesh_loader::PickableSurface;

/// Left click on the viewport, in logical window pixels.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PointerClick {
    pub position: Vec2,
}

// Left click that did not land on the panel
pub fn emit_pointer_clicks(
    buttons: Res<ButtonInput<MouseButton>>,
    capture: Res<PointerCapture>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut clicks: EventWriter<PointerClick>,
) {
    if !buttons.just_pressed(MouseButton::Left) || capture.over_ui { return; }
    let Ok(window) = windows.single() else { return; };
    let Some(position) = window.cursor_position() else { return; };
    clicks.write(PointerClick { position });
}

// Every click in the frame is resolved against the store as left by the previous one
pub fn handle_zone_clicks(
    mut clicks: EventReader<PointerClick>,
    cameras: Query<(&GlobalTransform, &Camera), With<Camera3d>>,
    surfaces: Query<(Entity, &GlobalTransform, &Mesh3d), With<PickableSurface>>,
    config: Res<ViewerConfig>,
    mut zones: ZoneEditor,
) {
    if clicks.is_empty() { return; }
    let Ok((cam_xform, camera)) = cameras.single() else { clicks.clear(); return; };
    let Some(viewport) = camera.logical_viewport_rect() else { clicks.clear(); return; };
    let shape = match ZoneShape::new(config.default_radius, config.default_height) {
        Ok(shape) => shape,
        Err(e) => { error!("Default zone size is invalid: {}", e); clicks.clear(); return; }
    };

    for click in clicks.read() {
        let cast = |position| camera.viewport_to_world(cam_xform, position).ok();
        let Some(ray) = click_ray(click.position, viewport, cast) else { continue; };

        match zones.handle_pointer(ray, surfaces.iter(), shape) {
            PointerOutcome::Placed(id) => info!("Placed drill zone {:?}", id),
            PointerOutcome::Deleted(id) => info!("Deleted drill zone {:?}", id),
            PointerOutcome::Missed => debug!("Click at {:?} missed the mesh", click.position),
        }
    }
}

/// Ray under a click, `None` when the click lies outside the viewport.
fn click_ray(position: Vec2, viewport: Rect, cast: impl FnOnce(Vec2) -> Option<Ray3d>) -> Option<Ray3d> {
    if !viewport.contains(position) { return None; }
    cast(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::drill_zones::state::DrillZoneStore;
    use crate::tools::drill_zones::store::tests::zone_app;

    #[test]
    fn clicks_outside_the_viewport_cast_nothing() {
        let viewport = Rect::new(100.0, 50.0, 500.0, 450.0);
        let down = Ray3d::new(Vec3::new(0.0, 10.0, 0.0), Dir3::NEG_Y);

        let mut cast_called = false;
        let outside = click_ray(Vec2::new(99.0, 250.0), viewport, |_| {
            cast_called = true;
            Some(down)
        });
        assert!(outside.is_none());
        assert!(!cast_called);

        assert!(click_ray(Vec2::new(300.0, 451.0), viewport, |_| Some(down)).is_none());
        assert_eq!(click_ray(Vec2::new(300.0, 250.0), viewport, |_| Some(down)), Some(down));
    }

    #[test]
    fn click_the_camera_cannot_cast_changes_nothing() {
        let mut app = zone_app(Transform::IDENTITY);
        app.init_resource::<ViewerConfig>()
            .add_event::<PointerClick>()
            .add_systems(Update, handle_zone_clicks);

        let plane = app
            .world_mut()
            .resource_mut::<Assets<Mesh>>()
            .add(Plane3d::new(Vec3::Y, Vec2::splat(50.0)).mesh().build());
        app.world_mut().spawn((PickableSurface, Mesh3d(plane), GlobalTransform::IDENTITY));
        app.world_mut().spawn((
            Camera3d::default(),
            GlobalTransform::from(Transform::from_xyz(0.0, 20.0, 0.0).looking_at(Vec3::ZERO, Vec3::Z)),
        ));

        app.world_mut().send_event(PointerClick { position: Vec2::new(-40.0, -40.0) });
        app.update();

        app.update();
        assert!(app.world().resource::<DrillZoneStore>().is_empty());
    }
}
