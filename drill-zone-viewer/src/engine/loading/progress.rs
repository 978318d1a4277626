use bevy::prelude::*;

use crate::tools::drill_zones::persistence::DrillZoneRecord;

#[derive(Resource, Default, Debug)]
pub struct LoadingProgress {
    pub mesh_ready: bool,
    /// Load error of the mesh, if it failed.
    pub mesh_failed: Option<String>,
    pub record_resolved: bool,
    /// Stored zones waiting for the mesh; taken once imported.
    pub pending_records: Option<Vec<DrillZoneRecord>>,
}
