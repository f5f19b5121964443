//! Copy, cut and paste through a local clipboard store.
//!
//! The clipboard holds the selected objects' own serialization as a JSON
//! array string. It is never shared with other users.

use crate::bridge::SyncBridge;
use crate::canvas::Canvas;
use crate::commands;
use crate::config::WhiteboardConfig;
use crate::shapes::{ObjectId, Shape};
use kurbo::Vec2;
use std::collections::HashMap;
use uuid::Uuid;

/// A local key-value string store.
pub trait ClipboardStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// In-process clipboard store.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    slots: HashMap<String, String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardStore for MemoryClipboard {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.slots.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.slots.remove(key);
    }
}

/// Copy/cut/paste over a [`ClipboardStore`].
pub struct Clipboard<S: ClipboardStore = MemoryClipboard> {
    store: S,
    key: String,
    offset: f64,
}

impl<S: ClipboardStore> Clipboard<S> {
    pub fn new(store: S, config: &WhiteboardConfig) -> Self {
        Self {
            store,
            key: config.clipboard_key.clone(),
            offset: config.paste_offset,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Store the selected objects. Returns how many were copied; an empty
    /// selection leaves the clipboard as it was.
    pub fn copy(&mut self, canvas: &Canvas) -> usize {
        let shapes: Vec<&Shape> = canvas
            .active_objects()
            .iter()
            .filter_map(|handle| canvas.get(*handle))
            .collect();
        if shapes.is_empty() {
            return 0;
        }
        match serde_json::to_string(&shapes) {
            Ok(json) => {
                self.store.set(&self.key, json);
                shapes.len()
            }
            Err(e) => {
                log::error!("Failed to serialize clipboard: {}", e);
                0
            }
        }
    }

    /// Add the clipboard's objects to the canvas under fresh ids, offset from
    /// the originals, and share them in one transaction.
    ///
    /// Malformed clipboard content is logged and nothing is pasted.
    pub fn paste(&mut self, canvas: &mut Canvas, bridge: &mut SyncBridge) -> Vec<ObjectId> {
        let Some(json) = self.store.get(&self.key) else {
            return Vec::new();
        };
        let shapes: Vec<Shape> = match serde_json::from_str(&json) {
            Ok(shapes) => shapes,
            Err(e) => {
                log::error!("Failed to parse clipboard: {}", e);
                return Vec::new();
            }
        };

        let handles: Vec<_> = shapes
            .into_iter()
            .map(|mut shape| {
                shape.translate(Vec2::new(self.offset, self.offset));
                canvas.add_with_id(Uuid::new_v4(), shape)
            })
            .collect();
        bridge.commit_all(canvas, &handles)
    }

    /// Copy the selection, then delete it locally and from the document.
    pub fn cut(&mut self, canvas: &mut Canvas, bridge: &mut SyncBridge) -> Vec<ObjectId> {
        if self.copy(canvas) == 0 {
            return Vec::new();
        }
        commands::delete_selected(canvas, bridge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn setup() -> (Canvas, SyncBridge, Clipboard) {
        let mut canvas = Canvas::new();
        let mut bridge = SyncBridge::default();
        let handle = canvas.add(Shape::rect(Point::new(10.0, 10.0), 40.0, 40.0));
        bridge.commit(&mut canvas, handle);
        canvas.set_active(handle);
        let clipboard = Clipboard::new(MemoryClipboard::new(), &WhiteboardConfig::default());
        (canvas, bridge, clipboard)
    }

    #[test]
    fn test_paste_twice_gives_fresh_ids() {
        let (mut canvas, mut bridge, mut clipboard) = setup();
        let original = canvas.object_id(canvas.active_objects()[0]).unwrap();
        assert_eq!(clipboard.copy(&canvas), 1);

        let first = clipboard.paste(&mut canvas, &mut bridge);
        let second = clipboard.paste(&mut canvas, &mut bridge);

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_ne!(first[0], second[0]);
        assert_ne!(first[0], original);
        assert_ne!(second[0], original);
        assert_eq!(bridge.document().len(), 3);
    }

    #[test]
    fn test_paste_applies_offset() {
        let (mut canvas, mut bridge, mut clipboard) = setup();
        clipboard.copy(&canvas);
        let pasted = clipboard.paste(&mut canvas, &mut bridge);

        let shape = canvas.get(canvas.handle_of(pasted[0]).unwrap()).unwrap();
        assert!((shape.left - 30.0).abs() < f64::EPSILON);
        assert!((shape.top - 30.0).abs() < f64::EPSILON);
        let stored = bridge.document().get(&pasted[0].to_string()).unwrap();
        assert_eq!(stored["left"], 30.0);
    }

    #[test]
    fn test_clipboard_holds_native_serialization() {
        let (canvas, _, mut clipboard) = setup();
        clipboard.copy(&canvas);
        let json = clipboard.store().get("clipboard").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["type"], "rect");
        assert!(value[0].get("objectId").is_none());
    }

    #[test]
    fn test_malformed_clipboard_is_noop() {
        let (mut canvas, mut bridge, mut clipboard) = setup();
        clipboard.store_mut().set("clipboard", "{not json".to_string());

        assert!(clipboard.paste(&mut canvas, &mut bridge).is_empty());
        assert_eq!(canvas.len(), 1);
        assert_eq!(bridge.document().len(), 1);
    }

    #[test]
    fn test_empty_clipboard_pastes_nothing() {
        let (mut canvas, mut bridge, mut clipboard) = setup();
        assert!(clipboard.paste(&mut canvas, &mut bridge).is_empty());
        canvas.discard_active();
        assert_eq!(clipboard.copy(&canvas), 0);
        assert!(clipboard.store().get("clipboard").is_none());
    }

    #[test]
    fn test_cut_copies_then_deletes() {
        let (mut canvas, mut bridge, mut clipboard) = setup();
        let removed = clipboard.cut(&mut canvas, &mut bridge);
        assert_eq!(removed.len(), 1);
        assert!(canvas.is_empty());
        assert!(bridge.document().is_empty());

        let pasted = clipboard.paste(&mut canvas, &mut bridge);
        assert_eq!(pasted.len(), 1);
        assert_ne!(pasted[0], removed[0]);
    }
}
