use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::engine::core::config::ViewerConfig;
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::systems::notifications::NotificationEvent;
use crate::tools::drill_zones::persistence::FileRecord;
use crate::tools::drill_zones::store::ZoneEditor;

#[derive(Resource, Default)]
pub struct RecordLoader {
    handle: Option<Handle<FileRecord>>,
}

pub fn start_record_loading(
    mut record_loader: ResMut<RecordLoader>,
    asset_server: Res<AssetServer>,
    config: Res<ViewerConfig>,
) {
    record_loader.handle = Some(asset_server.load(config.record_path.clone()));
}

// A record that is missing or unreadable counts as a file with no zones
pub fn check_record_loading(
    record_loader: Res<RecordLoader>,
    asset_server: Res<AssetServer>,
    records: Res<Assets<FileRecord>>,
    config: Res<ViewerConfig>,
    mut loading_progress: ResMut<LoadingProgress>,
) {
    if loading_progress.record_resolved {
        return;
    }
    let Some(handle) = &record_loader.handle else {
        return;
    };

    let zones = if let Some(record) = records.get(handle) {
        info!("✓ Record for {} holds {} drill zones", record.name, record.drill_zones.len());
        record.drill_zones.clone()
    } else if let Some(LoadState::Failed(err)) = asset_server.get_load_state(handle) {
        warn!("No drill zone record for {}: {}", config.file_name, err);
        Vec::new()
    } else {
        return;
    };

    loading_progress.record_resolved = true;
    // Records are dropped for a mesh that never loads.
    if loading_progress.mesh_failed.is_none() {
        loading_progress.pending_records = Some(zones);
    }
}

pub fn import_pending_records(
    mut loading_progress: ResMut<LoadingProgress>,
    mut zones: ZoneEditor,
    mut notifications: EventWriter<NotificationEvent>,
) {
    let Some(records) = loading_progress.pending_records.take() else {
        return;
    };

    match zones.import(&records) {
        Ok(count) => info!("Imported {} stored drill zones", count),
        Err(e) => {
            error!("Stored drill zones rejected: {}", e);
            notifications.write(NotificationEvent::error(format!("Could not load drill zones: {e}")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    use crate::engine::systems::notifications::NotificationLevel;
    use crate::tools::drill_zones::persistence::{DrillZoneRecord, Vec3Record};
    use crate::tools::drill_zones::state::DrillZoneStore;
    use crate::tools::drill_zones::store::tests::zone_app;

    fn record(radius: f32) -> DrillZoneRecord {
        DrillZoneRecord {
            position: Vec3Record { x: 1.0, y: 2.0, z: 3.0 },
            rotation: Vec3::ZERO.into(),
            height: 15.0,
            radius,
        }
    }

    fn loading_app(pending: Vec<DrillZoneRecord>) -> App {
        let mut app = zone_app(Transform::IDENTITY);
        app.add_event::<NotificationEvent>().insert_resource(LoadingProgress {
            mesh_ready: true,
            pending_records: Some(pending),
            ..default()
        });
        app
    }

    #[test]
    fn pending_records_are_imported_once() {
        let mut app = loading_app(vec![record(1.0), record(2.0)]);

        app.world_mut().run_system_once(import_pending_records).unwrap();
        app.world_mut().run_system_once(import_pending_records).unwrap();

        assert_eq!(app.world().resource::<DrillZoneStore>().len(), 2);
        assert!(app.world().resource::<LoadingProgress>().pending_records.is_none());
    }

    #[test]
    fn invalid_record_is_reported_and_nothing_imported() {
        let mut app = loading_app(vec![record(1.0), record(0.0)]);

        app.world_mut().run_system_once(import_pending_records).unwrap();

        assert!(app.world().resource::<DrillZoneStore>().is_empty());
        let events = app.world().resource::<Events<NotificationEvent>>();
        let sent: Vec<_> = events.get_cursor().read(events).cloned().collect();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].level, NotificationLevel::Error);
    }
}
