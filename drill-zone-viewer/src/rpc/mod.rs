//! JSON-RPC 2.0 bridge to the host page.
//!
//! On the web the viewer runs in an iframe and talks to its parent via
//! postMessage. On native builds outgoing messages are dropped and no listener
//! is installed.
//!
//! ## Message Flow
//!
//! ```text
//! Host page (parent window)  <──postMessage──>  Bevy (iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │                                        ├─ ZoneAction queued
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        │ <────────── Notification (no ID) ──────┤
//! ```
//!
//! ## Methods
//!
//! Zones are addressed by their 1-based position in the zone list.
//!
//! - `get_drill_zones`: current records and the active index
//! - `select_zone { index }`: toggle highlight
//! - `focus_zone { index }`: move the camera focus to the zone
//! - `delete_zone { index }`
//! - `clear_zones`
//! - `submit_zones`: persist through the configured gateway
//! - `set_zone_parameter { parameter, value }`: edit the active zone; `parameter` is
//!   one of `radius`, `height`, `position.x|y|z`, `rotation.x|y|z` (radians)
//! - `load_drill_zones { drillZones }`: replace every zone with the given records
//!
//! ## Notifications
//!
//! - `zones_changed`: zone list or selection changed
//! - `mesh_loading`: `{ status: "loading" | "ready" | "failed" }`
//! - `notification`: user-facing `{ level, message }`
//! - `drill_zones_submitted`: `{ file, drillZones }`, sent by the web gateway
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32601`: Method not found
//! - `-32602`: Invalid params

/// JSON-RPC 2.0 messaging, request dispatch and the notification outbox.
pub mod web_rpc;
