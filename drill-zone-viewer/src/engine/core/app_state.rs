use bevy::prelude::*;
use serde_json::json;

use crate::engine::loading::progress::LoadingProgress;
use crate::engine::systems::notifications::NotificationEvent;
use crate::rpc::web_rpc::WebRpcInterface;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    Running,
    /// The mesh failed to load; hit testing stays inert.
    MeshUnavailable,
}

/// "Loading mesh..." overlay, removed when loading ends either way.
#[derive(Component)]
pub struct LoadingIndicator;

pub fn transition_from_loading(
    loading_progress: Res<LoadingProgress>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if loading_progress.mesh_ready {
        info!("→ Mesh ready, transitioning to Running state");
        next_state.set(AppState::Running);
    } else if let Some(reason) = &loading_progress.mesh_failed {
        error!("→ Mesh failed to load ({}), transitioning to MeshUnavailable state", reason);
        next_state.set(AppState::MeshUnavailable);
    }
}

pub fn announce_mesh_ready(mut rpc_interface: ResMut<WebRpcInterface>) {
    rpc_interface.send_notification("mesh_loading", json!({ "status": "ready" }));
}

pub fn announce_mesh_unavailable(
    mut loading_progress: ResMut<LoadingProgress>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    loading_progress.pending_records = None;
    let reason = loading_progress.mesh_failed.clone().unwrap_or_default();

    rpc_interface.send_notification(
        "mesh_loading",
        json!({ "status": "failed", "reason": reason }),
    );
    notifications.write(NotificationEvent::error(format!("Could not load mesh: {reason}")));
}

pub fn hide_loading_indicator(mut commands: Commands, indicators: Query<Entity, With<LoadingIndicator>>) {
    for entity in &indicators {
        commands.entity(entity).despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::StatesPlugin;

    use crate::tools::drill_zones::persistence::DrillZoneRecord;

    fn state_app(progress: LoadingProgress) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .init_state::<AppState>()
            .insert_resource(progress)
            .init_resource::<WebRpcInterface>()
            .add_event::<NotificationEvent>()
            .add_systems(Update, transition_from_loading.run_if(in_state(AppState::Loading)))
            .add_systems(OnEnter(AppState::Running), announce_mesh_ready)
            .add_systems(OnEnter(AppState::MeshUnavailable), announce_mesh_unavailable)
            .add_systems(OnExit(AppState::Loading), hide_loading_indicator);
        app.world_mut().spawn(LoadingIndicator);
        app
    }

    fn statuses(app: &App) -> Vec<String> {
        app.world()
            .resource::<WebRpcInterface>()
            .pending_notifications()
            .iter()
            .filter(|n| n.method == "mesh_loading")
            .map(|n| n.params["status"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    fn indicator_count(app: &mut App) -> usize {
        app.world_mut()
            .query_filtered::<Entity, With<LoadingIndicator>>()
            .iter(app.world())
            .count()
    }

    #[test]
    fn stays_loading_until_the_mesh_resolves() {
        let mut app = state_app(LoadingProgress::default());
        app.update();
        app.update();

        assert_eq!(*app.world().resource::<State<AppState>>().get(), AppState::Loading);
        assert_eq!(indicator_count(&mut app), 1);
    }

    #[test]
    fn ready_mesh_starts_running() {
        let mut app = state_app(LoadingProgress { mesh_ready: true, ..default() });
        app.update();
        app.update();

        assert_eq!(*app.world().resource::<State<AppState>>().get(), AppState::Running);
        assert_eq!(statuses(&app), vec!["ready"]);
        assert_eq!(indicator_count(&mut app), 0);
    }

    #[test]
    fn failed_mesh_is_inert_and_drops_records() {
        let mut app = state_app(LoadingProgress {
            mesh_failed: Some("Path not found: models/missing.glb".into()),
            pending_records: Some(Vec::<DrillZoneRecord>::new()),
            ..default()
        });
        app.update();
        app.update();

        assert_eq!(*app.world().resource::<State<AppState>>().get(), AppState::MeshUnavailable);
        assert_eq!(statuses(&app), vec!["failed"]);
        assert!(app.world().resource::<LoadingProgress>().pending_records.is_none());
        assert_eq!(indicator_count(&mut app), 0);

        let events = app.world().resource::<Events<NotificationEvent>>();
        let sent: Vec<_> = events.get_cursor().read(events).cloned().collect();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].message.contains("models/missing.glb"));
    }
}
