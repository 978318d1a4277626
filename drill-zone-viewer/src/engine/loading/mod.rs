//! Asset loading for the annotated mesh and its persisted file record.
//!
//! The mesh and the record load in parallel. The mesh decides the state
//! transition; the record is held back until the mesh is ready and then
//! imported through the zone editor.

/// glTF scene loading, surface preparation and failure detection.
///
/// Marks every mesh in the loaded scene as pickable and applies the flat surface material.
pub mod mesh_loader;

/// Loading progress tracking resource for state transitions.
pub mod progress;

/// File record loading and the deferred import of its drill zones.
pub mod record_loader;
