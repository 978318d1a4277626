use bevy::prelude::*;

use super::parameters::ZoneParameter;
use super::persistence::{submit_zones, DrillZoneRecord, ZoneGateway};
use super::state::ZoneId;
use super::store::ZoneEditor;
use crate::engine::camera::viewport_camera::ViewportCamera;
use crate::engine::core::config::ViewerConfig;
use crate::engine::systems::notifications::NotificationEvent;

/// A zone operation requested by the panel, the keyboard or the host page.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum ZoneAction {
    /// Toggle the highlight of a zone.
    Highlight(ZoneId),
    Focus(ZoneId),
    Delete(ZoneId),
    Deselect,
    ClearAll,
    Edit { parameter: ZoneParameter, value: f32 },
    /// Replace every zone with stored records.
    Replace(Vec<DrillZoneRecord>),
    Submit,
}

// Applies queued zone actions in order through the editor
pub fn apply_zone_actions(
    mut actions: EventReader<ZoneAction>,
    mut zones: ZoneEditor,
    gateway: Option<Res<ZoneGateway>>,
    config: Res<ViewerConfig>,
    mut viewport_camera: Option<ResMut<ViewportCamera>>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    for action in actions.read() {
        match action {
            ZoneAction::Highlight(id) => {
                if let Err(e) = zones.select(*id) { warn!("Highlight ignored: {}", e); }
            }
            ZoneAction::Focus(id) => {
                let Some(point) = zones.world_position(*id) else { continue; };
                if let Some(camera) = viewport_camera.as_deref_mut() { camera.focus_on(point); }
            }
            ZoneAction::Delete(id) => {
                if let Err(e) = zones.remove_zone(*id) { warn!("Delete ignored: {}", e); }
            }
            ZoneAction::Deselect => zones.deselect(),
            ZoneAction::ClearAll => {
                let removed = zones.clear_all();
                info!("Cleared {} drill zones", removed);
            }
            ZoneAction::Edit { parameter, value } => {
                if let Err(e) = zones.edit(*parameter, *value) {
                    notifications.write(NotificationEvent::error(format!("Cannot set {}: {}", parameter.label(), e)));
                }
            }
            ZoneAction::Replace(records) => match zones.import(records) {
                Ok(count) => info!("Loaded {} drill zones for {}", count, config.file_name),
                Err(e) => {
                    error!("Rejected drill zone records: {}", e);
                    notifications.write(NotificationEvent::error(format!("Could not load drill zones: {e}")));
                }
            },
            ZoneAction::Submit => {
                let Some(gateway) = gateway.as_deref() else {
                    notifications.write(NotificationEvent::error("No persistence backend configured"));
                    continue;
                };
                // Failures leave the zones as they are so the user can retry
                match submit_zones(zones.store(), &config.file_name, gateway.0.as_ref()) {
                    Ok(count) => {
                        info!("Submitted {} drill zones for {}", count, config.file_name);
                        notifications.write(NotificationEvent::info(format!("Saved {count} drill zones")));
                    }
                    Err(e) => {
                        error!("Submitting drill zones failed: {}", e);
                        notifications.write(NotificationEvent::error(format!("Error saving drill zones: {e}")));
                    }
                }
            }
        }
    }
}
