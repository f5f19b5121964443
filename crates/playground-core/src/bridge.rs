//! Synchronization between the local canvas and the shared document.
//!
//! Writes go through [`SyncBridge`] and are fire-and-forget: document errors
//! are logged and swallowed. Reads go through [`render`], which reconciles the
//! canvas with a snapshot of the shape map.

use crate::canvas::{Canvas, Handle};
use crate::codec::{self, ShapeSnapshot};
use crate::config::WhiteboardConfig;
use crate::crdt::{DocumentError, SharedDocument, SnapshotMap, VersionVector};
use crate::shapes::ObjectId;

/// What a reconciliation pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    /// Records that failed to decode.
    pub skipped: usize,
    /// Objects left alone because the local user is dragging or resizing them.
    pub exempt: usize,
}

impl RenderReport {
    /// True if the local object set or any object's properties changed.
    pub fn changed(&self) -> bool {
        self.added + self.updated + self.removed > 0
    }
}

/// Reconcile the canvas with `snapshot`.
///
/// Identified objects missing from the snapshot are removed, new records are
/// decoded and added, and changed records are applied in place. Unidentified
/// objects (drawings still in progress) are never touched. Running it twice
/// with the same snapshot changes nothing the second time.
pub fn render(canvas: &mut Canvas, snapshot: &SnapshotMap) -> RenderReport {
    let mut report = RenderReport::default();

    for (id, handle) in canvas.identified() {
        if !snapshot.contains(&id.to_string()) {
            canvas.remove(handle);
            report.removed += 1;
        }
    }

    let mut order: Vec<Handle> = Vec::with_capacity(snapshot.len());
    for (key, value) in snapshot.iter_ordered() {
        let (id, shape) = match codec::decode_record(key, value) {
            Ok(decoded) => decoded,
            Err(err) => {
                log::warn!("Skipping shape {}: {}", key, err);
                report.skipped += 1;
                // Keep whatever local copy exists, in place.
                if let Some(handle) = key.parse::<ObjectId>().ok().and_then(|id| canvas.handle_of(id)) {
                    order.push(handle);
                }
                continue;
            }
        };

        match canvas.handle_of(id) {
            Some(handle) => {
                order.push(handle);
                if canvas.is_transforming(handle) {
                    report.exempt += 1;
                } else if canvas.get(handle) != Some(&shape) {
                    canvas.replace(handle, shape);
                    report.updated += 1;
                }
            }
            None => {
                order.push(canvas.add_with_id(id, shape));
                report.added += 1;
            }
        }
    }

    canvas.restack(&order);
    report
}

/// Write side of the synchronization layer, owning the shared document.
pub struct SyncBridge {
    doc: SharedDocument,
    /// Document revision the canvas last reflected.
    rendered_revision: Option<u64>,
}

impl Default for SyncBridge {
    fn default() -> Self {
        Self::new(SharedDocument::new())
    }
}

impl SyncBridge {
    pub fn new(doc: SharedDocument) -> Self {
        Self {
            doc,
            rendered_revision: None,
        }
    }

    /// Create a bridge over an empty document with the configured history.
    pub fn with_config(config: &WhiteboardConfig) -> Self {
        Self::new(SharedDocument::with_history(
            config.max_undo_steps,
            config.undo_merge_interval_ms,
        ))
    }

    pub fn document(&self) -> &SharedDocument {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut SharedDocument {
        &mut self.doc
    }

    // --- Writes ---

    /// Upsert one snapshot.
    pub fn put(&mut self, snapshot: &ShapeSnapshot) {
        let key = snapshot.object_id.to_string();
        let record = snapshot.to_record();
        if let Err(e) = self.doc.put(&key, &record) {
            log::error!("Failed to store shape {}: {}", key, e);
        }
    }

    /// Upsert several snapshots as one transaction.
    pub fn put_all(&mut self, snapshots: &[ShapeSnapshot]) {
        if snapshots.is_empty() {
            return;
        }
        let result = self.doc.mutate(|store| {
            for snapshot in snapshots {
                store.put(&snapshot.object_id.to_string(), &snapshot.to_record())?;
            }
            Ok(())
        });
        if let Err(e) = result {
            log::error!("Failed to store {} shapes: {}", snapshots.len(), e);
        }
    }

    /// Delete one record. Absent ids are ignored.
    pub fn remove(&mut self, id: ObjectId) {
        match self.doc.remove(&id.to_string()) {
            Ok(true) => {}
            Ok(false) => log::debug!("Shape {} already absent", id),
            Err(e) => log::error!("Failed to delete shape {}: {}", id, e),
        }
    }

    /// Delete several records as one transaction.
    pub fn remove_all(&mut self, ids: &[ObjectId]) {
        if ids.is_empty() {
            return;
        }
        let result = self.doc.mutate(|store| {
            for id in ids {
                store.remove(&id.to_string())?;
            }
            Ok(())
        });
        if let Err(e) = result {
            log::error!("Failed to delete {} shapes: {}", ids.len(), e);
        }
    }

    /// Delete every record. Returns true if the document was already empty.
    pub fn clear_all(&mut self) -> bool {
        match self.doc.clear() {
            Ok(was_empty) => was_empty,
            Err(e) => {
                log::error!("Failed to clear document: {}", e);
                self.doc.is_empty()
            }
        }
    }

    pub fn bring_to_front(&mut self, id: ObjectId) {
        if let Err(e) = self.doc.bring_to_front(&id.to_string()) {
            log::error!("Failed to restack shape {}: {}", id, e);
        }
    }

    pub fn send_to_back(&mut self, id: ObjectId) {
        if let Err(e) = self.doc.send_to_back(&id.to_string()) {
            log::error!("Failed to restack shape {}: {}", id, e);
        }
    }

    /// Encode a canvas object and store it, binding a fresh id if it has none.
    pub fn commit(&mut self, canvas: &mut Canvas, handle: Handle) -> Option<ObjectId> {
        let snapshot = Self::snapshot_of(canvas, handle)?;
        self.put(&snapshot);
        Some(snapshot.object_id)
    }

    /// Encode and store several canvas objects as one transaction.
    pub fn commit_all(&mut self, canvas: &mut Canvas, handles: &[Handle]) -> Vec<ObjectId> {
        let snapshots: Vec<ShapeSnapshot> = handles
            .iter()
            .filter_map(|handle| Self::snapshot_of(canvas, *handle))
            .collect();
        self.put_all(&snapshots);
        snapshots.iter().map(|snapshot| snapshot.object_id).collect()
    }

    fn snapshot_of(canvas: &mut Canvas, handle: Handle) -> Option<ShapeSnapshot> {
        let id = canvas.ensure_id(handle)?;
        let shape = canvas.get(handle)?;
        match codec::encode(id, shape) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::error!("Failed to encode shape {}: {}", id, e);
                None
            }
        }
    }

    // --- Reads ---

    /// True if the document changed since the canvas was last reconciled.
    pub fn needs_render(&self) -> bool {
        self.rendered_revision != Some(self.doc.revision())
    }

    /// Force the next [`sync`](Self::sync) to reconcile.
    pub fn invalidate(&mut self) {
        self.rendered_revision = None;
    }

    /// Reconcile the canvas if the document changed since the last pass.
    pub fn sync(&mut self, canvas: &mut Canvas) -> Option<RenderReport> {
        if !self.needs_render() {
            return None;
        }
        let snapshot = self.doc.snapshot_map();
        let report = render(canvas, &snapshot);
        self.rendered_revision = Some(self.doc.revision());
        if report.changed() || report.skipped > 0 {
            log::debug!("Rendered revision {}: {:?}", self.doc.revision(), report);
        }
        Some(report)
    }

    // --- Transport ---

    pub fn version(&self) -> VersionVector {
        self.doc.version()
    }

    pub fn export_updates(&self, since: &VersionVector) -> Result<Vec<u8>, DocumentError> {
        self.doc.export_updates(since)
    }

    pub fn export_snapshot(&self) -> Result<Vec<u8>, DocumentError> {
        self.doc.export_snapshot()
    }

    /// Apply updates from a peer. The next `sync` renders them.
    pub fn import(&mut self, bytes: &[u8]) -> Result<(), DocumentError> {
        self.doc.import(bytes)
    }
}
