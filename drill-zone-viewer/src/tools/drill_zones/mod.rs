//! Drill zone annotation tool.
//!
//! Cylinders placed on the loaded mesh mark drill locations. A zone lives in the
//! mesh root's local frame so its stored position survives any root transform.
//!
//! ## Interaction
//!
//! - Left click on the mesh places a zone at the nearest surface hit and selects it
//! - Left click on a zone deletes it; zones win ties with the surface they sit on
//! - The panel (native only) lists zones with Highlight / Focus / Delete buttons,
//!   parameter steppers for the active zone, and Clear All / Submit
//! - Delete removes the active zone, Escape releases it
//!
//! ## Data Flow
//!
//! ```text
//! PointerClick (Event) ──> handle_zone_clicks ──┐
//! Panel / keys / RPC ──> ZoneAction (Event) ────┤
//!                                               v
//!                                  ZoneEditor (SystemParam)
//!                                    ├─> DrillZoneStore   (authoritative, synchronous)
//!                                    ├─> ZoneSelection + ParameterFields
//!                                    └─> Commands / Assets (visual, geometry, material)
//! ```
//!
//! Hit tests read zone transforms and geometry from the store rather than the
//! scene graph, so several clicks in one frame each see the previous one's result.

/// Queued zone actions and the system that applies them.
pub mod actions;

/// Cylinder mesh and material construction for zone visuals.
pub mod factory;

/// Keyboard shortcuts, pointer capture and panel buttons.
pub mod interactions;

/// Editable zone parameters, ranges and the editor field state.
pub mod parameters;

/// Wire records, file records and backend gateways.
pub mod persistence;

/// Pointer clicks on the viewport.
pub mod placement;

/// Pointer ray construction and ray/mesh intersection.
pub mod ray;

/// Active zone state machine.
pub mod selection;

/// Zone data model, resources and marker components.
pub mod state;

/// `ZoneEditor`, the mutation entry point over store, selection and scene.
pub mod store;

/// Panel spawning and readout systems (native only).
pub mod ui;

use bevy::prelude::*;

use crate::engine::core::app_state::AppState;
use crate::engine::core::config::ViewerConfig;
use crate::rpc::web_rpc::RpcOutbox;

pub use state::{DrillZoneStore, ZoneId};

use actions::{ZoneAction, apply_zone_actions};
use interactions::{track_pointer_capture, zone_keyboard_shortcuts};
use parameters::ParameterFields;
use persistence::ZoneGateway;
use placement::{PointerClick, emit_pointer_clicks, handle_zone_clicks};
use selection::ZoneSelection;
use state::{PointerCapture, ZonePalette};
use store::ZoneEditor;

// Registers zone resources, events and systems.
pub struct DrillZonePlugin;

impl Plugin for DrillZonePlugin {
    fn build(&self, app: &mut App) {
        app
            // init resources
            .init_resource::<DrillZoneStore>()
            .init_resource::<ZoneSelection>()
            .init_resource::<ParameterFields>()
            .init_resource::<ZonePalette>()
            .init_resource::<PointerCapture>()
            .add_event::<PointerClick>()
            .add_event::<ZoneAction>()
            .add_systems(Startup, install_gateway)
            .add_systems(
                Update,
                (
                    track_pointer_capture,
                    zone_keyboard_shortcuts,
                    emit_pointer_clicks,
                    handle_zone_clicks,
                    apply_zone_actions,
                )
                    .chain()
                    .run_if(in_state(AppState::Running)),
            )
            .add_systems(Last, dispose_zones_on_exit);

        // Panel only for native builds; the host page draws its own on the web.
        #[cfg(not(target_arch = "wasm32"))]
        {
            use interactions::{
                clear_zones_button_interaction,
                parameter_step_interaction, submit_zones_button_interaction,
                zone_row_button_interaction,
            };
            use ui::{rebuild_zone_list, reflect_parameter_fields, spawn_zone_panel};

            app.add_systems(
                Update,
                (
                    // Native Only UI
                    zone_row_button_interaction,
                    parameter_step_interaction,
                    clear_zones_button_interaction,
                    submit_zones_button_interaction,
                    rebuild_zone_list,
                    reflect_parameter_fields,
                ),
            );
            app.add_systems(Startup, spawn_zone_panel);
        }
    }
}

// JSON record files on native, the host page on the web
fn install_gateway(mut commands: Commands, config: Res<ViewerConfig>, outbox: Res<RpcOutbox>) {
    #[cfg(target_arch = "wasm32")]
    let gateway = {
        let _ = &config;
        ZoneGateway(Box::new(persistence::RpcGateway::new(outbox.clone())))
    };

    #[cfg(not(target_arch = "wasm32"))]
    let gateway = {
        let _ = &outbox;
        ZoneGateway(Box::new(persistence::JsonFileGateway::new(config.records_dir.clone())))
    };

    commands.insert_resource(gateway);
}

// Releases every zone's visual, geometry and material on shutdown
fn dispose_zones_on_exit(mut exits: EventReader<AppExit>, mut zones: ZoneEditor) {
    if exits.is_empty() { return; }
    exits.clear();
    let removed = zones.clear_all();
    if removed > 0 { info!("Disposed {} drill zones on exit", removed); }
}
