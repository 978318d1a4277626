use bevy::input::mouse::MouseScrollUnit;
use bevy::math::EulerRot;
use bevy::{
    input::mouse::{MouseMotion, MouseWheel},
    prelude::*,
};
use constants::render_settings::{
    CAMERA_FOCUS_DISTANCE, CAMERA_MAX_DISTANCE, CAMERA_MIN_DISTANCE, CAMERA_START_POSITION,
};

const YAW_SENSITIVITY: f32 = 0.0035;
const PITCH_SENSITIVITY: f32 = 0.0030;
const PITCH_LIMIT: f32 = 1.55;
const ZOOM_FACTOR: f32 = 0.9;

/// Orbit camera state; the Camera3d transform follows it.
#[derive(Resource, Debug, Clone)]
pub struct ViewportCamera {
    pub focus_point: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl ViewportCamera {
    /// Orbit state that puts the eye at `eye` looking at `focus`.
    pub fn looking_from(eye: Vec3, focus: Vec3) -> Self {
        let offset = eye - focus;
        let distance = offset.length().clamp(CAMERA_MIN_DISTANCE, CAMERA_MAX_DISTANCE);
        let dir = offset.normalize_or(Vec3::Z);

        Self {
            focus_point: focus,
            distance,
            yaw: dir.x.atan2(dir.z),
            pitch: (-dir.y).clamp(-1.0, 1.0).asin().clamp(-PITCH_LIMIT, PITCH_LIMIT),
        }
    }

    pub fn view_rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    pub fn eye(&self) -> Vec3 {
        self.focus_point + self.view_rotation() * Vec3::Z * self.distance
    }

    pub fn transform(&self) -> Transform {
        Transform {
            translation: self.eye(),
            rotation: self.view_rotation(),
            ..default()
        }
    }

    pub fn orbit(&mut self, delta: Vec2) {
        self.yaw -= delta.x * YAW_SENSITIVITY;
        self.pitch = (self.pitch - delta.y * PITCH_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Positive steps move towards the focus point.
    pub fn zoom(&mut self, steps: f32) {
        self.distance =
            (self.distance * ZOOM_FACTOR.powf(steps)).clamp(CAMERA_MIN_DISTANCE, CAMERA_MAX_DISTANCE);
    }

    /// Centre the view on `point`, closing in if the camera is far away.
    pub fn focus_on(&mut self, point: Vec3) {
        self.focus_point = point;
        self.distance = self.distance.min(CAMERA_FOCUS_DISTANCE);
    }
}

impl Default for ViewportCamera {
    fn default() -> Self {
        Self::looking_from(CAMERA_START_POSITION, Vec3::ZERO)
    }
}

pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut viewport_camera: ResMut<ViewportCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    // Right drag orbits around the focus point
    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    if mouse_button.pressed(MouseButton::Right) && mouse_delta != Vec2::ZERO {
        viewport_camera.orbit(mouse_delta);
    }

    let scroll_accum: f32 = scroll_events
        .read()
        .map(|ev| match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        })
        .sum();
    if scroll_accum.abs() > f32::EPSILON {
        viewport_camera.zoom(scroll_accum);
    }

    // Keyboard movement of the focus point
    let mut move_input = Vec3::ZERO;
    if keyboard.pressed(KeyCode::KeyW) { move_input.z -= 1.0; }
    if keyboard.pressed(KeyCode::KeyS) { move_input.z += 1.0; }
    if keyboard.pressed(KeyCode::KeyD) { move_input.x += 1.0; }
    if keyboard.pressed(KeyCode::KeyA) { move_input.x -= 1.0; }
    if keyboard.pressed(KeyCode::KeyE) { move_input.y += 1.0; }
    if keyboard.pressed(KeyCode::KeyQ) { move_input.y -= 1.0; }

    if move_input != Vec3::ZERO {
        let view_rot = viewport_camera.view_rotation();
        let world_delta = view_rot * Vec3::X * move_input.x
            + Vec3::Y * move_input.y
            + view_rot * Vec3::Z * move_input.z;

        // Shift = faster, ctrl = slower
        let mut speed = (viewport_camera.distance * 0.5).clamp(2.0, 200.0);
        if keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) { speed *= 3.5; }
        if keyboard.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]) { speed *= 0.25; }

        viewport_camera.focus_point += world_delta.normalize_or_zero() * speed * time.delta_secs();
    }

    let target = viewport_camera.transform();
    let lerp_speed = (12.0 * time.delta_secs()).min(1.0);
    camera_transform.translation = camera_transform.translation.lerp(target.translation, lerp_speed);
    camera_transform.rotation = camera_transform.rotation.slerp(target.rotation, lerp_speed);
}
