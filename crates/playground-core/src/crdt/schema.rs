//! Loro document schema and operations.

use super::convert::{loro_to_json, loro_to_object, write_field};
use loro::{
    Container, ExportMode, LoroDoc, LoroError, LoroList, LoroMap, LoroResult, LoroValue, UndoManager,
    ValueOrContainer, VersionVector,
};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Key for the shape map in the document.
pub const SHAPES_KEY: &str = "canvasObjects";
/// Key for the z-order list in the document.
pub const Z_ORDER_KEY: &str = "zOrder";

/// Errors raised by the shared document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document error: {0}")]
    Loro(#[from] LoroError),
    #[error("export failed: {0}")]
    Export(String),
}

/// Point-in-time copy of the shape map and its stacking order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotMap {
    /// Records keyed by object id.
    pub records: BTreeMap<String, Value>,
    /// Ids back to front. May name ids without a record.
    pub z_order: Vec<String>,
}

impl SnapshotMap {
    /// Build a map from records alone, ordered by key.
    pub fn from_records(records: impl IntoIterator<Item = (String, Value)>) -> Self {
        let records: BTreeMap<String, Value> = records.into_iter().collect();
        let z_order = records.keys().cloned().collect();
        Self { records, z_order }
    }

    /// Records back to front: ids in z-order first, then records missing
    /// from the order by key. Each record appears once.
    pub fn iter_ordered(&self) -> impl Iterator<Item = (&str, &Value)> {
        let mut seen = HashSet::new();
        let mut ordered = Vec::with_capacity(self.records.len());
        for key in self.z_order.iter().chain(self.records.keys()) {
            if let Some((key, value)) = self.records.get_key_value(key) {
                if seen.insert(key.as_str()) {
                    ordered.push((key.as_str(), value));
                }
            }
        }
        ordered.into_iter()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Batched writes against the shape map, committed as one transaction.
pub struct ShapeStore<'a> {
    shapes: LoroMap,
    z_order: LoroList,
    doc: &'a LoroDoc,
}

impl ShapeStore<'_> {
    /// Upsert a record. Only fields that differ from the stored record are
    /// written, so concurrent edits to different fields both survive.
    pub fn put(&self, key: &str, record: &Map<String, Value>) -> LoroResult<()> {
        let shape_map = match self.shapes.get(key) {
            Some(ValueOrContainer::Container(Container::Map(map))) => map,
            _ => self.shapes.insert_container(key, LoroMap::new())?,
        };
        let current = loro_to_object(&shape_map.get_deep_value()).unwrap_or_default();

        for (field, value) in record {
            if current.get(field) != Some(value) {
                write_field(&shape_map, field, value)?;
            }
        }
        for stale in current.keys().filter(|field| !record.contains_key(*field)) {
            shape_map.delete(stale)?;
        }

        if self.position(key).is_none() {
            self.z_order.push(LoroValue::from(key))?;
        }
        Ok(())
    }

    /// Delete a record and its stacking entries. Returns false if absent.
    pub fn remove(&self, key: &str) -> LoroResult<bool> {
        let existed = self.shapes.get(key).is_some();
        if existed {
            self.shapes.delete(key)?;
        }
        self.drop_from_order(key)?;
        Ok(existed)
    }

    /// Delete every record. Returns true if the map was already empty.
    pub fn clear(&self) -> LoroResult<bool> {
        let keys = self.keys();
        let was_empty = keys.is_empty();
        for key in keys {
            self.shapes.delete(&key)?;
        }
        let len = self.z_order.len();
        if len > 0 {
            self.z_order.delete(0, len)?;
        }
        Ok(was_empty)
    }

    /// Move a record to the top of the stack.
    pub fn bring_to_front(&self, key: &str) -> LoroResult<()> {
        self.drop_from_order(key)?;
        self.z_order.push(LoroValue::from(key))?;
        Ok(())
    }

    /// Move a record to the bottom of the stack.
    pub fn send_to_back(&self, key: &str) -> LoroResult<()> {
        self.drop_from_order(key)?;
        self.z_order.insert(0, LoroValue::from(key))?;
        Ok(())
    }

    pub fn keys(&self) -> Vec<String> {
        match self.shapes.get_deep_value() {
            LoroValue::Map(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        (0..self.z_order.len()).find(|&i| self.order_entry_is(i, key))
    }

    fn order_entry_is(&self, index: usize, key: &str) -> bool {
        matches!(
            self.z_order.get(index),
            Some(ValueOrContainer::Value(LoroValue::String(s))) if s.as_ref() == key
        )
    }

    fn drop_from_order(&self, key: &str) -> LoroResult<()> {
        // Concurrent pushes can leave duplicates; remove them all.
        for i in (0..self.z_order.len()).rev() {
            if self.order_entry_is(i, key) {
                self.z_order.delete(i, 1)?;
            }
        }
        Ok(())
    }

    fn commit(&self) {
        self.doc.commit();
    }
}

/// The shared document: a Loro CRDT holding the shape map and z-order,
/// plus the local undo history.
pub struct SharedDocument {
    doc: LoroDoc,
    undo_manager: UndoManager,
    /// Bumped on every change, local or imported.
    revision: u64,
}

impl SharedDocument {
    /// Create an empty document with default history settings.
    pub fn new() -> Self {
        Self::with_history(100, 0)
    }

    /// Create an empty document with explicit undo limits.
    pub fn with_history(max_undo_steps: usize, merge_interval_ms: i64) -> Self {
        let doc = LoroDoc::new();
        let mut undo_manager = UndoManager::new(&doc);
        undo_manager.set_max_undo_steps(max_undo_steps);
        undo_manager.set_merge_interval(merge_interval_ms);
        Self {
            doc,
            undo_manager,
            revision: 0,
        }
    }

    /// Create a document from a snapshot. The imported state is not undoable.
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self, DocumentError> {
        let mut document = Self::new();
        document.import(bytes)?;
        Ok(document)
    }

    fn store(&self) -> ShapeStore<'_> {
        ShapeStore {
            shapes: self.doc.get_map(SHAPES_KEY),
            z_order: self.doc.get_list(Z_ORDER_KEY),
            doc: &self.doc,
        }
    }

    /// Run several writes as a single transaction (and a single undo step).
    pub fn mutate<T>(&mut self, f: impl FnOnce(&ShapeStore<'_>) -> LoroResult<T>) -> Result<T, DocumentError> {
        let store = self.store();
        let result = f(&store);
        store.commit();
        self.revision += 1;
        Ok(result?)
    }

    pub fn put(&mut self, key: &str, record: &Map<String, Value>) -> Result<(), DocumentError> {
        self.mutate(|store| store.put(key, record))
    }

    pub fn remove(&mut self, key: &str) -> Result<bool, DocumentError> {
        self.mutate(|store| store.remove(key))
    }

    /// Remove every record. Returns true if the document was already empty.
    pub fn clear(&mut self) -> Result<bool, DocumentError> {
        self.mutate(|store| store.clear())
    }

    pub fn bring_to_front(&mut self, key: &str) -> Result<(), DocumentError> {
        self.mutate(|store| store.bring_to_front(key))
    }

    pub fn send_to_back(&mut self, key: &str) -> Result<(), DocumentError> {
        self.mutate(|store| store.send_to_back(key))
    }

    /// Current records and z-order.
    pub fn snapshot_map(&self) -> SnapshotMap {
        let records = match self.doc.get_map(SHAPES_KEY).get_deep_value() {
            LoroValue::Map(map) => map
                .iter()
                .map(|(key, value)| (key.to_string(), loro_to_json(value)))
                .collect(),
            _ => BTreeMap::new(),
        };
        SnapshotMap {
            records,
            z_order: self.z_order(),
        }
    }

    /// Get a record by key.
    pub fn get(&self, key: &str) -> Option<Map<String, Value>> {
        match self.doc.get_map(SHAPES_KEY).get(key)? {
            ValueOrContainer::Container(Container::Map(map)) => loro_to_object(&map.get_deep_value()),
            ValueOrContainer::Value(value) => loro_to_object(&value),
            _ => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.doc.get_map(SHAPES_KEY).get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.doc.get_map(SHAPES_KEY).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The z-order as a list of ids.
    pub fn z_order(&self) -> Vec<String> {
        let list = self.doc.get_list(Z_ORDER_KEY);
        let mut result = Vec::with_capacity(list.len());
        for i in 0..list.len() {
            if let Some(ValueOrContainer::Value(LoroValue::String(id))) = list.get(i) {
                result.push(id.to_string());
            }
        }
        result
    }

    /// Change counter. Differs from a previously read value whenever the
    /// document may have changed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // --- Sync ---

    /// Export the document as a snapshot (full state).
    pub fn export_snapshot(&self) -> Result<Vec<u8>, DocumentError> {
        self.doc
            .export(ExportMode::Snapshot)
            .map_err(|e| DocumentError::Export(e.to_string()))
    }

    /// Export incremental updates since a version.
    pub fn export_updates(&self, since: &VersionVector) -> Result<Vec<u8>, DocumentError> {
        self.doc
            .export(ExportMode::updates(since))
            .map_err(|e| DocumentError::Export(e.to_string()))
    }

    /// Import a snapshot or updates from another peer.
    pub fn import(&mut self, bytes: &[u8]) -> Result<(), DocumentError> {
        self.doc.import(bytes)?;
        self.revision += 1;
        Ok(())
    }

    /// Get the current version vector.
    pub fn version(&self) -> VersionVector {
        self.doc.oplog_vv()
    }

    // --- Undo/Redo API ---

    /// Undo the last local change. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> Result<bool, DocumentError> {
        let undone = self.undo_manager.undo()?;
        if undone {
            self.revision += 1;
        }
        Ok(undone)
    }

    /// Redo the last undone change. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> Result<bool, DocumentError> {
        let redone = self.undo_manager.redo()?;
        if redone {
            self.revision += 1;
        }
        Ok(redone)
    }

    pub fn can_undo(&self) -> bool {
        self.undo_manager.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo_manager.can_redo()
    }
}

impl Default for SharedDocument {
    fn default() -> Self {
        Self::new()
    }
}
