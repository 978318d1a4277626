use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use constants::path::RECORD_EXTENSION;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use super::parameters::ParameterError;
use super::state::{DrillZone, DrillZoneStore, ZonePlacement, ZoneShape};
use crate::rpc::web_rpc::{RpcNotification, RpcOutbox};

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("file '{0}' not found")]
    FileNotFound(String),

    #[error("transport unavailable: {0}")]
    Transport(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Vec3Record {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3> for Vec3Record {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

impl From<Vec3Record> for Vec3 {
    fn from(r: Vec3Record) -> Self {
        Vec3::new(r.x, r.y, r.z)
    }
}

/// XYZ Euler angles in radians. Older records carry a quaternion, marked by `w`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct RotationRecord {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f32>,
}

impl RotationRecord {
    pub fn euler(&self) -> Vec3 {
        let Some(w) = self.w else {
            return Vec3::new(self.x, self.y, self.z);
        };
        let quat = Quat::from_xyzw(self.x, self.y, self.z, w);
        if !quat.is_finite() || quat.length_squared() < f32::EPSILON {
            return Vec3::ZERO;
        }
        let (x, y, z) = quat.normalize().to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }
}

impl From<Vec3> for RotationRecord {
    fn from(euler: Vec3) -> Self {
        Self {
            x: euler.x,
            y: euler.y,
            z: euler.z,
            w: None,
        }
    }
}

/// One zone as stored in a file record. Position is in the mesh root's frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct DrillZoneRecord {
    pub position: Vec3Record,
    pub rotation: RotationRecord,
    pub height: f32,
    pub radius: f32,
}

impl DrillZoneRecord {
    pub fn from_zone(zone: &DrillZone) -> Self {
        Self {
            position: zone.placement.position.into(),
            rotation: zone.placement.rotation.into(),
            height: zone.shape.height,
            radius: zone.shape.radius,
        }
    }

    pub fn placement(&self) -> ZonePlacement {
        ZonePlacement {
            position: self.position.into(),
            rotation: self.rotation.euler(),
        }
    }

    pub fn shape(&self) -> Result<ZoneShape, ParameterError> {
        ZoneShape::new(self.radius, self.height)
    }
}

/// Records in display order.
pub fn serialize_zones(store: &DrillZoneStore) -> Vec<DrillZoneRecord> {
    store.iter().map(DrillZoneRecord::from_zone).collect()
}

/// Stored metadata for an uploaded file.
#[derive(Asset, TypePath, Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub name: String,
    #[serde(default)]
    pub clean_name: String,
    #[serde(default, rename = "downloadURL")]
    pub download_url: String,
    #[serde(default)]
    pub drill_zones: Vec<DrillZoneRecord>,
}

/// Backend sink for a file's zones.
pub trait PersistenceGateway: Send + Sync + 'static {
    /// Replace the stored zone list for `file_name`.
    fn update(&self, file_name: &str, zones: &[DrillZoneRecord]) -> Result<(), PersistenceError>;
}

#[derive(Resource)]
pub struct ZoneGateway(pub Box<dyn PersistenceGateway>);

/// Rewrites `drillZones` inside `<dir>/<file>.record.json`, keeping the other fields.
pub struct JsonFileGateway {
    dir: PathBuf,
}

impl JsonFileGateway {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn record_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(format!("{file_name}.{RECORD_EXTENSION}"))
    }

    pub fn read(&self, file_name: &str) -> Result<FileRecord, PersistenceError> {
        read_record(&self.record_path(file_name), file_name)
    }
}

fn read_record(path: &Path, file_name: &str) -> Result<FileRecord, PersistenceError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(serde_json::from_str(&text)?),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(PersistenceError::FileNotFound(file_name.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

impl PersistenceGateway for JsonFileGateway {
    fn update(&self, file_name: &str, zones: &[DrillZoneRecord]) -> Result<(), PersistenceError> {
        let path = self.record_path(file_name);
        let mut record = read_record(&path, file_name)?;
        record.drill_zones = zones.to_vec();
        fs::write(&path, serde_json::to_string_pretty(&record)?)?;
        Ok(())
    }
}

/// Hands the zone list to the host page as a `drill_zones_submitted` notification.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub struct RpcGateway {
    outbox: RpcOutbox,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
impl RpcGateway {
    pub fn new(outbox: RpcOutbox) -> Self {
        Self { outbox }
    }
}

impl PersistenceGateway for RpcGateway {
    fn update(&self, file_name: &str, zones: &[DrillZoneRecord]) -> Result<(), PersistenceError> {
        let params = json!({ "file": file_name, "drillZones": zones });
        self.outbox
            .push(RpcNotification::new("drill_zones_submitted", params))
            .map_err(PersistenceError::Transport)
    }
}

/// Serialise the store and hand it to the gateway. Returns how many zones were sent.
pub fn submit_zones(
    store: &DrillZoneStore,
    file_name: &str,
    gateway: &dyn PersistenceGateway,
) -> Result<usize, PersistenceError> {
    let records = serialize_zones(store);
    gateway.update(file_name, &records)?;
    Ok(records.len())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::tools::drill_zones::state::ZoneId;

    /// Keeps every update in memory.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingGateway {
        pub(crate) updates: Arc<Mutex<Vec<(String, Vec<DrillZoneRecord>)>>>,
    }

    impl PersistenceGateway for RecordingGateway {
        fn update(&self, file_name: &str, zones: &[DrillZoneRecord]) -> Result<(), PersistenceError> {
            self.updates
                .lock()
                .map_err(|e| PersistenceError::Transport(e.to_string()))?
                .push((file_name.to_string(), zones.to_vec()));
            Ok(())
        }
    }

    struct FailingGateway;

    impl PersistenceGateway for FailingGateway {
        fn update(&self, _: &str, _: &[DrillZoneRecord]) -> Result<(), PersistenceError> {
            Err(PersistenceError::Transport("offline".into()))
        }
    }

    fn record(position: [f32; 3], radius: f32, height: f32) -> DrillZoneRecord {
        DrillZoneRecord {
            position: Vec3::from_array(position).into(),
            rotation: Vec3::ZERO.into(),
            height,
            radius,
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("drill-zone-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn record_json_shape() {
        let value = serde_json::to_value(record([1.0, 2.0, 3.0], 1.0, 15.0)).unwrap();
        assert_eq!(
            value,
            json!({
                "position": { "x": 1.0, "y": 2.0, "z": 3.0 },
                "rotation": { "x": 0.0, "y": 0.0, "z": 0.0 },
                "height": 15.0,
                "radius": 1.0
            })
        );
    }

    #[test]
    fn quaternion_rotation_is_converted_to_euler() {
        let quat = Quat::from_euler(EulerRot::XYZ, 0.2, -0.4, 0.6);
        let rotation: RotationRecord = serde_json::from_value(json!({
            "x": quat.x, "y": quat.y, "z": quat.z, "w": quat.w
        }))
        .unwrap();

        let euler = rotation.euler();
        assert!((euler - Vec3::new(0.2, -0.4, 0.6)).length() < 1e-4);

        let degenerate = RotationRecord { x: 0.0, y: 0.0, z: 0.0, w: Some(0.0) };
        assert_eq!(degenerate.euler(), Vec3::ZERO);
    }

    #[test]
    fn file_record_defaults_missing_zones() {
        let record: FileRecord = serde_json::from_str(
            r#"{ "name": "pump-1", "cleanName": "pump", "downloadURL": "models/pump-1.glb" }"#,
        )
        .unwrap();
        assert_eq!(record.download_url, "models/pump-1.glb");
        assert!(record.drill_zones.is_empty());
    }

    #[test]
    fn invalid_record_shape_is_rejected() {
        assert!(record([0.0; 3], 0.0, 5.0).shape().is_err());
        assert!(record([0.0; 3], 1.0, f32::NAN).shape().is_err());
        assert!(record([0.0; 3], 0.05, 0.5).shape().is_ok());
    }

    #[test]
    fn submit_sends_records_in_display_order() {
        let mut store = DrillZoneStore::default();
        for (x, radius) in [(1.0, 1.0), (2.0, 3.0)] {
            let id = store.allocate_id();
            store.push(DrillZone {
                id,
                shape: ZoneShape::new(radius, 10.0).unwrap(),
                placement: ZonePlacement::at(Vec3::new(x, 0.0, 0.0)),
                visual: Entity::PLACEHOLDER,
                geometry: Handle::default(),
                material: Handle::default(),
            });
        }
        store.remove(ZoneId(0));

        let gateway = RecordingGateway::default();
        assert_eq!(submit_zones(&store, "pump-1", &gateway).unwrap(), 1);

        let updates = gateway.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, "pump-1");
        assert_eq!(updates[0].1, vec![record([2.0, 0.0, 0.0], 3.0, 10.0)]);
    }

    #[test]
    fn failed_submit_reports_error() {
        let store = DrillZoneStore::default();
        assert!(matches!(
            submit_zones(&store, "pump-1", &FailingGateway),
            Err(PersistenceError::Transport(_))
        ));
    }

    #[test]
    fn json_gateway_replaces_zones_and_keeps_metadata() {
        let dir = scratch_dir("gateway");
        let gateway = JsonFileGateway::new(&dir);
        let original = FileRecord {
            name: "bracket-9".into(),
            clean_name: "bracket".into(),
            download_url: "models/bracket-9.glb".into(),
            drill_zones: vec![record([9.0, 9.0, 9.0], 1.0, 1.0)],
        };
        fs::write(gateway.record_path("bracket-9"), serde_json::to_string(&original).unwrap()).unwrap();

        let zones = vec![record([1.0, 2.0, 3.0], 1.0, 15.0)];
        gateway.update("bracket-9", &zones).unwrap();

        let stored = gateway.read("bracket-9").unwrap();
        assert_eq!(stored.clean_name, "bracket");
        assert_eq!(stored.download_url, "models/bracket-9.glb");
        assert_eq!(stored.drill_zones, zones);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn json_gateway_reports_unknown_file() {
        let dir = scratch_dir("missing");
        let gateway = JsonFileGateway::new(&dir);
        assert!(matches!(
            gateway.update("nope", &[]),
            Err(PersistenceError::FileNotFound(name)) if name == "nope"
        ));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn rpc_gateway_posts_notification() {
        let outbox = RpcOutbox::default();
        let gateway = RpcGateway::new(outbox.clone());
        gateway.update("pump-1", &[record([1.0, 2.0, 3.0], 1.0, 15.0)]).unwrap();

        let sent = outbox.drain();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, "drill_zones_submitted");
        let params = &sent[0].params;
        assert_eq!(params["file"], "pump-1");
        assert_eq!(params["drillZones"][0]["radius"], 1.0);
    }
}
