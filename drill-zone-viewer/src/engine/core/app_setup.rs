// Standard library and external crates
use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy::render::camera::PerspectiveProjection;
use bevy_common_assets::json::JsonAssetPlugin;
use constants::path::{NATIVE_ASSET_ROOT, RECORD_EXTENSION};
use constants::render_settings::{CAMERA_FAR, CAMERA_FOV_DEGREES, CAMERA_NEAR};

// Crate engine modules
use crate::engine::camera::viewport_camera::{ViewportCamera, camera_controller};
use crate::engine::core::app_state::{
    AppState, announce_mesh_ready, announce_mesh_unavailable,
    hide_loading_indicator, transition_from_loading,
};
use crate::engine::core::config::ViewerConfig;
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::mesh_loader::{MeshLoader, check_mesh_loading, start_mesh_loading};
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::loading::record_loader::{
    RecordLoader, check_record_loading, import_pending_records, start_record_loading,
};
use crate::engine::systems::notifications::{
    NotificationEvent, expire_toasts, forward_notifications,
};

// Crate tools modules
use crate::tools::drill_zones::DrillZonePlugin;
use crate::tools::drill_zones::persistence::FileRecord;

// Web RPC
use crate::rpc::web_rpc::WebRpcPlugin;

pub fn create_app() -> App {
    // Logging is not up yet, so report straight to stderr
    let config = ViewerConfig::from_environment().unwrap_or_else(|e| {
        eprintln!("Invalid arguments ({e}); using the default file");
        ViewerConfig::default()
    });

    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        // Registers FileRecord as a loadable asset type from record JSON files.
        .add_plugins(JsonAssetPlugin::<FileRecord>::new(&[RECORD_EXTENSION]))
        .add_plugins(WebRpcPlugin)
        .add_plugins(DrillZonePlugin);

    // Initialise resources early
    app.insert_resource(config)
        .init_resource::<LoadingProgress>()
        .init_resource::<MeshLoader>()
        .init_resource::<RecordLoader>()
        .init_resource::<ViewportCamera>()
        .add_event::<NotificationEvent>();

    // State-based system scheduling
    app.add_systems(Startup, (setup, start_mesh_loading, start_record_loading).chain())
        .add_systems(
            Update,
            (check_mesh_loading, transition_from_loading)
                .chain()
                .run_if(in_state(AppState::Loading)),
        )
        .add_systems(Update, check_record_loading)
        .add_systems(
            Update,
            import_pending_records.run_if(in_state(AppState::Running)),
        )
        .add_systems(OnExit(AppState::Loading), hide_loading_indicator)
        .add_systems(OnEnter(AppState::Running), announce_mesh_ready)
        .add_systems(OnEnter(AppState::MeshUnavailable), announce_mesh_unavailable);

    // Base runtime systems that run on all platforms and in every state.
    app.add_systems(
        Update,
        (
            camera_controller,
            forward_notifications,
            expire_toasts,
        ),
    );

    app
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
}

fn spawn_viewport_camera(commands: &mut Commands, viewport_camera: &ViewportCamera) {
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV_DEGREES.to_radians(),
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            ..default()
        }),
        viewport_camera.transform(),
    ));
}

// Startup system that only handles basic initialisation
fn setup(mut commands: Commands, viewport_camera: Res<ViewportCamera>) {
    spawn_lighting(&mut commands);
    spawn_viewport_camera(&mut commands, &viewport_camera);

    #[cfg(not(target_arch = "wasm32"))]
    {
        create_native_overlays(&mut commands);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn create_native_overlays(commands: &mut Commands) {
    use crate::engine::core::app_state::LoadingIndicator;
    use crate::engine::systems::notifications::spawn_toast_stack;

    commands
        .spawn((
            LoadingIndicator,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Loading mesh..."),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(Color::srgb(0.85, 0.85, 0.85)),
            ));
        });

    spawn_toast_stack(commands);
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        file_path: NATIVE_ASSET_ROOT.to_string(),
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
