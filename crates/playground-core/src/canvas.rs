//! The local drawing canvas: object set, identity side map, selection and
//! pointer gestures.
//!
//! The canvas is a disposable cache. It owns native [`Shape`]s addressed by
//! opaque [`Handle`]s; the stable [`ObjectId`] of a shared shape is kept in a
//! side map next to it. Pointer input is turned into [`CanvasEvent`]s which
//! the owner dispatches to the registered listeners.

use crate::camera::Camera;
use crate::events::{CanvasEvent, EventHandler, EventKind, ListenerId, Listeners};
use crate::shapes::{ObjectId, SerializableColor, Shape};
use kurbo::{Point, Size, Vec2};
use std::collections::HashMap;
use uuid::Uuid;

/// Pointer tolerance for hit-testing, in canvas units.
const HIT_TOLERANCE: f64 = 4.0;

/// Opaque reference to an object on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

#[derive(Debug, Clone)]
struct Entry {
    handle: Handle,
    shape: Shape,
}

/// Kind of direct manipulation in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformAction {
    Drag,
    Scale,
}

/// An in-progress drag or resize of selected objects.
#[derive(Debug, Clone)]
pub struct Transform {
    pub handles: Vec<Handle>,
    pub action: TransformAction,
    last: Point,
    changed: bool,
}

/// Local drawing surface.
pub struct Canvas {
    /// Objects, back to front.
    entries: Vec<Entry>,
    ids: HashMap<ObjectId, Handle>,
    handles: HashMap<Handle, ObjectId>,
    selection: Vec<Handle>,
    transform: Option<Transform>,
    /// Points of the brush stroke being drawn.
    brush: Option<Vec<Point>>,
    /// When set, pointer gestures draw freeform paths instead of selecting.
    pub drawing_mode: bool,
    pub brush_width: f64,
    pub brush_color: SerializableColor,
    pub camera: Camera,
    /// Size of the drawing surface in canvas units.
    pub size: Size,
    listeners: Listeners,
    needs_render: bool,
    disposed: bool,
    next_handle: u64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            ids: HashMap::new(),
            handles: HashMap::new(),
            selection: Vec::new(),
            transform: None,
            brush: None,
            drawing_mode: false,
            brush_width: 1.0,
            brush_color: SerializableColor::black(),
            camera: Camera::new(),
            size: Size::new(800.0, 600.0),
            listeners: Listeners::default(),
            needs_render: false,
            disposed: false,
            next_handle: 0,
        }
    }

    // --- Objects ---

    /// Add an object on top of the stack. It has no id until one is bound.
    pub fn add(&mut self, shape: Shape) -> Handle {
        self.next_handle += 1;
        let handle = Handle(self.next_handle);
        self.entries.push(Entry { handle, shape });
        self.needs_render = true;
        handle
    }

    /// Add an object already known by `id`.
    pub fn add_with_id(&mut self, id: ObjectId, shape: Shape) -> Handle {
        let handle = self.add(shape);
        self.bind(handle, id);
        handle
    }

    /// Bind an id to an unidentified object.
    ///
    /// Returns false when the handle is unknown, already has an id, or the id
    /// belongs to another object. Bindings are never replaced.
    pub fn bind(&mut self, handle: Handle, id: ObjectId) -> bool {
        if !self.contains(handle) || self.handles.contains_key(&handle) || self.ids.contains_key(&id) {
            return false;
        }
        self.ids.insert(id, handle);
        self.handles.insert(handle, id);
        true
    }

    /// The object's id, binding a fresh one if it has none yet.
    pub fn ensure_id(&mut self, handle: Handle) -> Option<ObjectId> {
        if let Some(id) = self.object_id(handle) {
            return Some(id);
        }
        let id = Uuid::new_v4();
        self.bind(handle, id).then_some(id)
    }

    pub fn object_id(&self, handle: Handle) -> Option<ObjectId> {
        self.handles.get(&handle).copied()
    }

    pub fn handle_of(&self, id: ObjectId) -> Option<Handle> {
        self.ids.get(&id).copied()
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.entries.iter().any(|entry| entry.handle == handle)
    }

    pub fn get(&self, handle: Handle) -> Option<&Shape> {
        self.entries
            .iter()
            .find(|entry| entry.handle == handle)
            .map(|entry| &entry.shape)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Shape> {
        self.needs_render = true;
        self.entries
            .iter_mut()
            .find(|entry| entry.handle == handle)
            .map(|entry| &mut entry.shape)
    }

    /// Overwrite an object's properties in place, keeping its handle, id,
    /// stacking position and selection state.
    pub fn replace(&mut self, handle: Handle, shape: Shape) -> bool {
        match self.get_mut(handle) {
            Some(slot) => {
                *slot = shape;
                true
            }
            None => false,
        }
    }

    /// Remove an object and its id binding.
    pub fn remove(&mut self, handle: Handle) -> Option<Shape> {
        let index = self.entries.iter().position(|entry| entry.handle == handle)?;
        let entry = self.entries.remove(index);
        if let Some(id) = self.handles.remove(&handle) {
            self.ids.remove(&id);
        }
        self.selection.retain(|h| *h != handle);
        if let Some(transform) = &mut self.transform {
            transform.handles.retain(|h| *h != handle);
        }
        self.needs_render = true;
        Some(entry.shape)
    }

    /// Objects back to front.
    pub fn objects(&self) -> impl Iterator<Item = (Handle, &Shape)> {
        self.entries.iter().map(|entry| (entry.handle, &entry.shape))
    }

    /// Handles back to front.
    pub fn handles(&self) -> Vec<Handle> {
        self.entries.iter().map(|entry| entry.handle).collect()
    }

    /// Every identified object as `(id, handle)`.
    pub fn identified(&self) -> Vec<(ObjectId, Handle)> {
        self.entries
            .iter()
            .filter_map(|entry| self.object_id(entry.handle).map(|id| (id, entry.handle)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Topmost object under a canvas point.
    pub fn find_target(&self, point: Point) -> Option<Handle> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.shape.hit_test(point, HIT_TOLERANCE))
            .map(|entry| entry.handle)
    }

    /// Remove every object. Listeners stay registered.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.ids.clear();
        self.handles.clear();
        self.selection.clear();
        self.transform = None;
        self.brush = None;
        self.needs_render = true;
    }

    // --- Stacking ---

    pub fn bring_to_front(&mut self, handle: Handle) -> bool {
        let Some(index) = self.entries.iter().position(|entry| entry.handle == handle) else {
            return false;
        };
        let entry = self.entries.remove(index);
        self.entries.push(entry);
        self.needs_render = true;
        true
    }

    pub fn send_to_back(&mut self, handle: Handle) -> bool {
        let Some(index) = self.entries.iter().position(|entry| entry.handle == handle) else {
            return false;
        };
        let entry = self.entries.remove(index);
        self.entries.insert(0, entry);
        self.needs_render = true;
        true
    }

    /// Reorder so the listed handles come first, in the given order. Unlisted
    /// objects keep their relative order above them. Returns true if anything
    /// moved.
    pub fn restack(&mut self, order: &[Handle]) -> bool {
        let rank: HashMap<Handle, usize> = order.iter().enumerate().map(|(i, h)| (*h, i)).collect();
        let before = self.handles();
        // Stable sort keeps unlisted objects in place relative to each other.
        self.entries
            .sort_by_key(|entry| rank.get(&entry.handle).copied().unwrap_or(usize::MAX));
        let moved = self.handles() != before;
        if moved {
            self.needs_render = true;
        }
        moved
    }

    // --- Selection ---

    /// Make a single object the active object.
    pub fn set_active(&mut self, handle: Handle) -> bool {
        if !self.contains(handle) {
            return false;
        }
        self.selection = vec![handle];
        self.needs_render = true;
        true
    }

    /// Drop the selection and any transform in progress.
    pub fn discard_active(&mut self) {
        self.selection.clear();
        self.transform = None;
        self.needs_render = true;
    }

    pub fn active_objects(&self) -> &[Handle] {
        &self.selection
    }

    /// The active object when exactly one object is selected.
    pub fn active_object(&self) -> Option<Handle> {
        match self.selection.as_slice() {
            [handle] => Some(*handle),
            _ => None,
        }
    }

    /// Handles under an active drag or resize.
    pub fn transforming(&self) -> &[Handle] {
        self.transform
            .as_ref()
            .map(|transform| transform.handles.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_transforming(&self, handle: Handle) -> bool {
        self.transforming().contains(&handle)
    }

    pub fn current_transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    // --- Viewport ---

    pub fn zoom(&self) -> f64 {
        self.camera.zoom
    }

    /// Set an absolute zoom anchored on a screen point.
    pub fn zoom_to_point(&mut self, screen: Point, zoom: f64) {
        self.camera.zoom_to_point(screen, zoom);
        self.needs_render = true;
    }

    /// Convert a screen point to canvas coordinates.
    pub fn pointer(&self, screen: Point) -> Point {
        self.camera.screen_to_world(screen)
    }

    // --- Rendering ---

    pub fn request_render(&mut self) {
        self.needs_render = true;
    }

    /// Whether a repaint was requested since the last call.
    pub fn take_render_request(&mut self) -> bool {
        std::mem::take(&mut self.needs_render)
    }

    // --- Listeners ---

    pub fn on(&mut self, kind: EventKind, handler: EventHandler) -> ListenerId {
        self.listeners.on(kind, handler)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.listeners.off(id)
    }

    pub fn handlers(&self, kind: EventKind) -> Vec<EventHandler> {
        self.listeners.handlers(kind)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Tear the canvas down. Objects and listeners are dropped and further
    /// input produces no events.
    pub fn dispose(&mut self) {
        self.clear();
        self.listeners.clear();
        self.drawing_mode = false;
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // --- Pointer input ---

    /// Pointer pressed at a screen position.
    pub fn mouse_down(&mut self, screen: Point) -> Vec<CanvasEvent> {
        if self.disposed {
            return Vec::new();
        }
        let pointer = self.pointer(screen);
        let mut events = Vec::new();

        if self.drawing_mode {
            self.brush = Some(vec![pointer]);
            events.push(CanvasEvent::MouseDown { pointer, target: None });
            return events;
        }

        let target = self.find_target(pointer);
        match target {
            Some(handle) => {
                if !self.selection.contains(&handle) {
                    self.selection = vec![handle];
                    events.push(CanvasEvent::SelectionCreated {
                        selected: self.selection.clone(),
                    });
                }
                self.transform = Some(Transform {
                    handles: self.selection.clone(),
                    action: TransformAction::Drag,
                    last: pointer,
                    changed: false,
                });
            }
            None => {
                if !self.selection.is_empty() {
                    self.selection.clear();
                    events.push(CanvasEvent::SelectionCleared);
                }
            }
        }
        self.needs_render = true;
        events.push(CanvasEvent::MouseDown { pointer, target });
        events
    }

    /// Pointer moved to a screen position.
    pub fn mouse_move(&mut self, screen: Point) -> Vec<CanvasEvent> {
        if self.disposed {
            return Vec::new();
        }
        let pointer = self.pointer(screen);
        let mut events = Vec::new();

        if let Some(points) = &mut self.brush {
            points.push(pointer);
            self.needs_render = true;
        } else if let Some(transform) = &mut self.transform {
            if transform.action == TransformAction::Drag {
                let delta: Vec2 = pointer - transform.last;
                transform.last = pointer;
                transform.changed = true;
                let targets = transform.handles.clone();
                for entry in self.entries.iter_mut().filter(|e| targets.contains(&e.handle)) {
                    entry.shape.translate(delta);
                }
                events.extend(targets.into_iter().map(|target| CanvasEvent::ObjectMoving { target }));
                self.needs_render = true;
            }
        }
        events.push(CanvasEvent::MouseMove { pointer });
        events
    }

    /// Pointer released at a screen position.
    pub fn mouse_up(&mut self, screen: Point) -> Vec<CanvasEvent> {
        if self.disposed {
            return Vec::new();
        }
        let pointer = self.pointer(screen);
        let mut events = Vec::new();

        if let Some(points) = self.brush.take() {
            if points.len() > 1 {
                let mut path = Shape::path(points);
                path.stroke = Some(self.brush_color);
                path.stroke_width = self.brush_width;
                let target = self.add(path);
                events.push(CanvasEvent::PathCreated { target });
            }
        } else if let Some(transform) = self.transform.take() {
            if transform.changed {
                events.extend(
                    transform
                        .handles
                        .into_iter()
                        .map(|target| CanvasEvent::ObjectModified { target }),
                );
            }
        }
        events.push(CanvasEvent::MouseUp { pointer });
        events
    }

    /// Resize the selection to an absolute scale, as a corner handle would.
    ///
    /// The resize stays in progress until the next `mouse_up`.
    pub fn scale_active(&mut self, scale_x: f64, scale_y: f64) -> Vec<CanvasEvent> {
        if self.disposed || self.selection.is_empty() {
            return Vec::new();
        }
        let targets = self.selection.clone();
        let transform = self.transform.get_or_insert_with(|| Transform {
            handles: targets.clone(),
            action: TransformAction::Scale,
            last: Point::ZERO,
            changed: false,
        });
        transform.action = TransformAction::Scale;
        transform.changed = true;
        for entry in self.entries.iter_mut().filter(|e| targets.contains(&e.handle)) {
            entry.shape.scale_x = scale_x;
            entry.shape.scale_y = scale_y;
        }
        self.needs_render = true;
        targets
            .into_iter()
            .map(|target| CanvasEvent::ObjectScaling { target })
            .collect()
    }

    /// Mouse wheel turned over a screen position.
    pub fn wheel(&mut self, delta_y: f64, screen: Point) -> Vec<CanvasEvent> {
        if self.disposed {
            return Vec::new();
        }
        vec![CanvasEvent::MouseWheel { delta_y, screen }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Geometry;

    fn rect_at(x: f64, y: f64) -> Shape {
        Shape::rect(Point::new(x, y), 10.0, 10.0)
    }

    #[test]
    fn test_add_and_bind() {
        let mut canvas = Canvas::new();
        let handle = canvas.add(rect_at(0.0, 0.0));
        assert!(canvas.object_id(handle).is_none());

        let id = canvas.ensure_id(handle).unwrap();
        assert_eq!(canvas.ensure_id(handle), Some(id));
        assert_eq!(canvas.handle_of(id), Some(handle));
        assert!(!canvas.bind(handle, Uuid::new_v4()));
    }

    #[test]
    fn test_id_cannot_bind_twice() {
        let mut canvas = Canvas::new();
        let id = Uuid::new_v4();
        canvas.add_with_id(id, rect_at(0.0, 0.0));
        let other = canvas.add(rect_at(20.0, 0.0));
        assert!(!canvas.bind(other, id));
    }

    #[test]
    fn test_remove_drops_binding_and_selection() {
        let mut canvas = Canvas::new();
        let id = Uuid::new_v4();
        let handle = canvas.add_with_id(id, rect_at(0.0, 0.0));
        canvas.set_active(handle);

        assert!(canvas.remove(handle).is_some());
        assert!(canvas.handle_of(id).is_none());
        assert!(canvas.active_objects().is_empty());
        assert!(canvas.remove(handle).is_none());
    }

    #[test]
    fn test_find_target_prefers_top() {
        let mut canvas = Canvas::new();
        let bottom = canvas.add(rect_at(0.0, 0.0));
        let top = canvas.add(rect_at(5.0, 5.0));
        assert_eq!(canvas.find_target(Point::new(7.0, 7.0)), Some(top));
        canvas.bring_to_front(bottom);
        assert_eq!(canvas.find_target(Point::new(7.0, 7.0)), Some(bottom));
        assert_eq!(canvas.find_target(Point::new(300.0, 300.0)), None);
    }

    #[test]
    fn test_restack_keeps_unlisted_on_top() {
        let mut canvas = Canvas::new();
        let a = canvas.add(rect_at(0.0, 0.0));
        let b = canvas.add(rect_at(0.0, 0.0));
        let pending = canvas.add(rect_at(0.0, 0.0));

        assert!(canvas.restack(&[b, a]));
        assert_eq!(canvas.handles(), vec![b, a, pending]);
        assert!(!canvas.restack(&[b, a]));
    }

    #[test]
    fn test_drag_emits_moving_then_modified() {
        let mut canvas = Canvas::new();
        let handle = canvas.add(rect_at(0.0, 0.0));

        let down = canvas.mouse_down(Point::new(5.0, 5.0));
        assert_eq!(
            down,
            vec![
                CanvasEvent::SelectionCreated { selected: vec![handle] },
                CanvasEvent::MouseDown {
                    pointer: Point::new(5.0, 5.0),
                    target: Some(handle)
                },
            ]
        );
        assert!(canvas.is_transforming(handle));

        let moved = canvas.mouse_move(Point::new(15.0, 25.0));
        assert_eq!(moved[0], CanvasEvent::ObjectMoving { target: handle });
        let shape = canvas.get(handle).unwrap();
        assert!((shape.left - 10.0).abs() < f64::EPSILON);
        assert!((shape.top - 20.0).abs() < f64::EPSILON);

        let up = canvas.mouse_up(Point::new(15.0, 25.0));
        assert_eq!(up[0], CanvasEvent::ObjectModified { target: handle });
        assert!(!canvas.is_transforming(handle));
    }

    #[test]
    fn test_click_without_move_is_not_modified() {
        let mut canvas = Canvas::new();
        canvas.add(rect_at(0.0, 0.0));
        canvas.mouse_down(Point::new(5.0, 5.0));
        let up = canvas.mouse_up(Point::new(5.0, 5.0));
        assert_eq!(up.len(), 1);
        assert!(matches!(up[0], CanvasEvent::MouseUp { .. }));
    }

    #[test]
    fn test_click_on_empty_clears_selection() {
        let mut canvas = Canvas::new();
        let handle = canvas.add(rect_at(0.0, 0.0));
        canvas.set_active(handle);
        let events = canvas.mouse_down(Point::new(400.0, 400.0));
        assert_eq!(events[0], CanvasEvent::SelectionCleared);
        assert!(canvas.active_object().is_none());
    }

    #[test]
    fn test_brush_creates_path() {
        let mut canvas = Canvas::new();
        canvas.drawing_mode = true;
        canvas.brush_width = 5.0;
        canvas.mouse_down(Point::new(0.0, 0.0));
        canvas.mouse_move(Point::new(10.0, 5.0));
        let up = canvas.mouse_up(Point::new(10.0, 5.0));

        let CanvasEvent::PathCreated { target } = up[0] else {
            panic!("expected path:created, got {:?}", up);
        };
        let path = canvas.get(target).unwrap();
        assert!(matches!(&path.geometry, Geometry::Path { points } if points.len() == 2));
        assert!((path.stroke_width - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scale_holds_transform_until_mouse_up() {
        let mut canvas = Canvas::new();
        let handle = canvas.add(rect_at(0.0, 0.0));
        canvas.set_active(handle);

        let events = canvas.scale_active(2.0, 3.0);
        assert_eq!(events, vec![CanvasEvent::ObjectScaling { target: handle }]);
        assert!(canvas.is_transforming(handle));
        assert!((canvas.get(handle).unwrap().scaled_height() - 30.0).abs() < f64::EPSILON);

        let up = canvas.mouse_up(Point::ZERO);
        assert_eq!(up[0], CanvasEvent::ObjectModified { target: handle });
    }

    #[test]
    fn test_pointer_respects_camera() {
        let mut canvas = Canvas::new();
        canvas.zoom_to_point(Point::ZERO, 0.5);
        let handle = canvas.add(rect_at(20.0, 20.0));
        let events = canvas.mouse_down(Point::new(12.0, 12.0));
        assert!(events.contains(&CanvasEvent::MouseDown {
            pointer: Point::new(24.0, 24.0),
            target: Some(handle)
        }));
    }

    #[test]
    fn test_disposed_canvas_is_inert() {
        let mut canvas = Canvas::new();
        canvas.add(rect_at(0.0, 0.0));
        canvas.dispose();
        assert!(canvas.is_empty());
        assert!(canvas.mouse_down(Point::new(5.0, 5.0)).is_empty());
        assert!(canvas.wheel(1.0, Point::ZERO).is_empty());
    }
}
