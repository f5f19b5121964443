//! Undo/redo over the shared document's own history.
//!
//! Only local transactions are recorded; changes imported from peers are
//! never undone here. Each transaction is one step.

use crate::bridge::SyncBridge;

/// Undo/redo entry points bound to keyboard shortcuts.
pub trait History {
    /// Undo the last local step. Returns false if there was nothing to undo.
    fn undo(&mut self) -> bool;
    /// Redo the last undone step. Returns false if there was nothing to redo.
    fn redo(&mut self) -> bool;
    fn can_undo(&self) -> bool;
    fn can_redo(&self) -> bool;
}

impl History for SyncBridge {
    fn undo(&mut self) -> bool {
        self.document_mut().undo().unwrap_or_else(|e| {
            log::error!("Undo failed: {}", e);
            false
        })
    }

    fn redo(&mut self) -> bool {
        self.document_mut().redo().unwrap_or_else(|e| {
            log::error!("Redo failed: {}", e);
            false
        })
    }

    fn can_undo(&self) -> bool {
        self.document().can_undo()
    }

    fn can_redo(&self) -> bool {
        self.document().can_redo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::shapes::Shape;
    use kurbo::Point;

    #[test]
    fn test_undo_redo_through_bridge() {
        let mut canvas = Canvas::new();
        let mut bridge = SyncBridge::default();
        assert!(!bridge.can_undo());
        assert!(!bridge.undo());

        let handle = canvas.add(Shape::rect(Point::ZERO, 10.0, 10.0));
        let id = bridge.commit(&mut canvas, handle).unwrap();
        bridge.sync(&mut canvas);

        assert!(bridge.undo());
        bridge.sync(&mut canvas);
        assert!(canvas.handle_of(id).is_none());
        assert!(bridge.can_redo());

        assert!(bridge.redo());
        bridge.sync(&mut canvas);
        assert!(canvas.handle_of(id).is_some());
    }
}
