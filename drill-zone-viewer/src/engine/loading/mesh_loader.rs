use bevy::asset::LoadState;
use bevy::gltf::Gltf;
use bevy::prelude::*;
use bevy::scene::SceneInstanceReady;
use constants::render_settings::{MESH_COLOUR, MESH_ROOT_SCALE};
use serde_json::json;

use crate::engine::core::config::ViewerConfig;
use crate::engine::loading::progress::LoadingProgress;
use crate::rpc::web_rpc::WebRpcInterface;
use crate::tools::drill_zones::state::DrillZoneVisual;

/// Root of the loaded mesh. Zone positions are stored in its local frame.
#[derive(Component, Debug)]
pub struct AnnotatedMesh;

/// Mesh part that pointer rays are tested against.
#[derive(Component, Debug)]
pub struct PickableSurface;

#[derive(Resource, Default)]
pub struct MeshLoader {
    handle: Option<Handle<Gltf>>,
}

// Spawn the mesh root and start loading its scene
pub fn start_mesh_loading(
    mut commands: Commands,
    mut mesh_loader: ResMut<MeshLoader>,
    asset_server: Res<AssetServer>,
    config: Res<ViewerConfig>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    info!("Loading mesh {}", config.model_path);

    // Same path, so the scene comes out of the one glTF load.
    mesh_loader.handle = Some(asset_server.load(config.model_path.clone()));
    let scene = asset_server.load(GltfAssetLabel::Scene(0).from_asset(config.model_path.clone()));

    commands
        .spawn((
            Name::new("AnnotatedMesh"),
            AnnotatedMesh,
            SceneRoot(scene),
            Transform::from_scale(Vec3::splat(MESH_ROOT_SCALE)),
        ))
        .observe(prepare_loaded_mesh);

    rpc_interface.send_notification("mesh_loading", json!({ "status": "loading" }));
}

// Flat white surface on every part of the scene, all of it pickable
fn prepare_loaded_mesh(
    trigger: Trigger<SceneInstanceReady>,
    mut commands: Commands,
    children: Query<&Children>,
    parts: Query<(), (With<Mesh3d>, Without<DrillZoneVisual>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut loading_progress: ResMut<LoadingProgress>,
) {
    let material = materials.add(StandardMaterial {
        base_color: MESH_COLOUR,
        unlit: true,
        ..default()
    });

    let mut count = 0;
    for entity in children.iter_descendants(trigger.target()) {
        if parts.contains(entity) {
            commands
                .entity(entity)
                .insert((PickableSurface, MeshMaterial3d(material.clone())));
            count += 1;
        }
    }

    if count == 0 {
        warn!("Loaded scene contains no meshes; nothing can be annotated");
    }
    info!("✓ Mesh ready with {} surface parts", count);
    loading_progress.mesh_ready = true;
}

pub fn check_mesh_loading(
    mesh_loader: Res<MeshLoader>,
    asset_server: Res<AssetServer>,
    mut loading_progress: ResMut<LoadingProgress>,
) {
    if loading_progress.mesh_ready || loading_progress.mesh_failed.is_some() {
        return;
    }
    let Some(handle) = &mesh_loader.handle else {
        return;
    };

    if let Some(LoadState::Failed(err)) = asset_server.get_load_state(handle) {
        loading_progress.mesh_failed = Some(err.to_string());
    }
}
