//! Shared document backed by a Loro CRDT.
//!
//! # Schema
//!
//! ```text
//! LoroDoc
//! ├── "canvasObjects": LoroMap<ObjectId, LoroMap> (shape records)
//! └── "zOrder": LoroList<String> (object ids, back to front)
//! ```
//!
//! Each record is the shape's own serialization plus `objectId` and `type`.
//! Scalar fields are plain map values, so Loro's last-writer-wins applies per
//! field. `points` and other arrays are child containers.

mod convert;
mod schema;

pub use convert::{loro_to_json, write_field};
pub use schema::{DocumentError, ShapeStore, SharedDocument, SnapshotMap, SHAPES_KEY, Z_ORDER_KEY};

// Re-export Loro types hosts need to relay updates.
pub use loro::{ExportMode, VersionVector};
