//! Canvas event handlers that decide what is local feedback and what gets
//! committed to the shared document.
//!
//! Drawing gestures stay local until the pointer is released. Drag moves are
//! local until the drag ends. Selection, scaling and zoom never sync.

use crate::attributes::ElementAttributes;
use crate::bridge::SyncBridge;
use crate::canvas::{Canvas, Handle};
use crate::config::WhiteboardConfig;
use crate::events::{CanvasEvent, EventHandler, EventKind, ListenerId};
use crate::shapes::Shape;
use crate::tools::{ActiveElement, ToolKind};
use kurbo::{Point, Vec2};

/// Everything a handler may touch.
pub struct EventContext<'a> {
    pub canvas: &'a mut Canvas,
    pub bridge: &'a mut SyncBridge,
    pub adapter: &'a mut EventAdapter,
    pub config: &'a WhiteboardConfig,
}

/// A shape being drawn, not yet shared.
#[derive(Debug, Clone, Copy)]
struct Pending {
    handle: Handle,
    anchor: Point,
}

/// Local gesture state.
#[derive(Debug, Default)]
pub struct EventAdapter {
    active_element: ActiveElement,
    is_drawing: bool,
    pending: Option<Pending>,
    attributes: ElementAttributes,
    /// Set while the style panel is being edited; selection reads are skipped.
    is_editing: bool,
}

impl EventAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> ToolKind {
        self.active_element.tool()
    }

    pub fn active_element(&self) -> &ActiveElement {
        &self.active_element
    }

    /// Switch tools. Drops any drawing in progress from the adapter's view.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.tool() != tool {
            log::debug!("Tool changed: {} -> {}", self.tool(), tool);
        }
        self.active_element = ActiveElement::new(tool);
        self.is_drawing = false;
        self.pending = None;
    }

    pub fn is_drawing(&self) -> bool {
        self.is_drawing
    }

    /// Handle of the shape being drawn, if any.
    pub fn pending(&self) -> Option<Handle> {
        self.pending.map(|pending| pending.handle)
    }

    pub fn attributes(&self) -> &ElementAttributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut ElementAttributes {
        &mut self.attributes
    }

    pub fn is_editing(&self) -> bool {
        self.is_editing
    }

    pub fn set_editing(&mut self, editing: bool) {
        self.is_editing = editing;
    }
}

/// Handlers registered on mount, one per event the adapter reacts to.
pub const HANDLERS: [(EventKind, EventHandler); 9] = [
    (EventKind::MouseDown, on_mouse_down),
    (EventKind::MouseMove, on_mouse_move),
    (EventKind::MouseUp, on_mouse_up),
    (EventKind::PathCreated, on_path_created),
    (EventKind::ObjectModified, on_object_modified),
    (EventKind::ObjectMoving, on_object_moving),
    (EventKind::SelectionCreated, on_selection_created),
    (EventKind::ObjectScaling, on_object_scaling),
    (EventKind::MouseWheel, on_mouse_wheel),
];

/// Register every adapter handler. The returned ids deregister them.
pub fn register(canvas: &mut Canvas) -> Vec<ListenerId> {
    HANDLERS
        .iter()
        .map(|(kind, handler)| canvas.on(*kind, *handler))
        .collect()
}

/// Run the canvas's registered handlers for each event, in order.
pub fn dispatch(ctx: &mut EventContext<'_>, events: Vec<CanvasEvent>) {
    for event in events {
        for handler in ctx.canvas.handlers(event.kind()) {
            handler(ctx, &event);
        }
    }
}

/// Start a drawing, or let the canvas select what was hit.
pub fn on_mouse_down(ctx: &mut EventContext<'_>, event: &CanvasEvent) {
    let CanvasEvent::MouseDown { pointer, target } = event else {
        return;
    };

    let tool = ctx.adapter.tool();
    if tool == ToolKind::Freeform {
        ctx.adapter.is_drawing = true;
        ctx.canvas.drawing_mode = true;
        ctx.canvas.brush_width = ctx.config.brush_width;
        return;
    }
    ctx.canvas.drawing_mode = false;

    let Some(kind) = tool.shape_kind() else {
        ctx.adapter.is_drawing = false;
        return;
    };

    // Clicking an object of the tool's own type (or a multi-selection)
    // manipulates it instead of drawing over it.
    let hit_same = target.is_some_and(|handle| {
        let in_group = ctx.canvas.active_objects().len() > 1 && ctx.canvas.active_objects().contains(&handle);
        in_group || ctx.canvas.get(handle).is_some_and(|shape| shape.kind() == kind)
    });
    if hit_same {
        ctx.adapter.is_drawing = false;
        return;
    }

    ctx.canvas.discard_active();
    if let Some(shape) = Shape::for_tool(kind, *pointer, ctx.config) {
        let handle = ctx.canvas.add(shape);
        ctx.adapter.pending = Some(Pending {
            handle,
            anchor: *pointer,
        });
        ctx.adapter.is_drawing = true;
    }
}

/// Resize the pending shape. Local only.
pub fn on_mouse_move(ctx: &mut EventContext<'_>, event: &CanvasEvent) {
    let CanvasEvent::MouseMove { pointer } = event else {
        return;
    };
    if !ctx.adapter.is_drawing || ctx.adapter.tool() == ToolKind::Freeform {
        return;
    }
    if let Some(pending) = ctx.adapter.pending {
        if let Some(shape) = ctx.canvas.get_mut(pending.handle) {
            shape.resize_from(pending.anchor, *pointer);
        }
    }
}

/// Finalize and commit the pending shape, then fall back to the select tool.
pub fn on_mouse_up(ctx: &mut EventContext<'_>, event: &CanvasEvent) {
    if !matches!(event, CanvasEvent::MouseUp { .. }) {
        return;
    }
    ctx.adapter.is_drawing = false;
    if ctx.adapter.tool() == ToolKind::Freeform {
        return;
    }

    if let Some(pending) = ctx.adapter.pending.take() {
        if let Some(id) = ctx.bridge.commit(ctx.canvas, pending.handle) {
            log::debug!("Committed drawn shape {}", id);
        }
    }

    if !ctx.canvas.drawing_mode {
        ctx.adapter.set_tool(ToolKind::Select);
    }
}

/// Commit a finished brush stroke.
pub fn on_path_created(ctx: &mut EventContext<'_>, event: &CanvasEvent) {
    let CanvasEvent::PathCreated { target } = event else {
        return;
    };
    ctx.bridge.commit(ctx.canvas, *target);
}

/// Overwrite the record of a dragged or resized object.
pub fn on_object_modified(ctx: &mut EventContext<'_>, event: &CanvasEvent) {
    let CanvasEvent::ObjectModified { target } = event else {
        return;
    };
    ctx.bridge.commit(ctx.canvas, *target);
}

/// Keep a dragged object inside the canvas. Local only.
pub fn on_object_moving(ctx: &mut EventContext<'_>, event: &CanvasEvent) {
    let CanvasEvent::ObjectMoving { target } = event else {
        return;
    };
    let size = ctx.canvas.size;
    let Some(shape) = ctx.canvas.get_mut(*target) else {
        return;
    };
    let left = shape.left.min(size.width - shape.scaled_width()).max(0.0);
    let top = shape.top.min(size.height - shape.scaled_height()).max(0.0);
    shape.translate(Vec2::new(left - shape.left, top - shape.top));
}

/// Mirror a newly selected object into the style panel.
pub fn on_selection_created(ctx: &mut EventContext<'_>, event: &CanvasEvent) {
    let CanvasEvent::SelectionCreated { selected } = event else {
        return;
    };
    if ctx.adapter.is_editing {
        return;
    }
    if let [handle] = selected.as_slice() {
        if let Some(shape) = ctx.canvas.get(*handle) {
            ctx.adapter.attributes = ElementAttributes::from_shape(shape);
        }
    }
}

/// Mirror the live size of an object being resized into the style panel.
pub fn on_object_scaling(ctx: &mut EventContext<'_>, event: &CanvasEvent) {
    let CanvasEvent::ObjectScaling { target } = event else {
        return;
    };
    if let Some(shape) = ctx.canvas.get(*target) {
        let current = ElementAttributes::from_shape(shape);
        ctx.adapter.attributes.width = current.width;
        ctx.adapter.attributes.height = current.height;
    }
}

/// Zoom around the pointer. Viewport state is per-user and never synced.
pub fn on_mouse_wheel(ctx: &mut EventContext<'_>, event: &CanvasEvent) {
    let CanvasEvent::MouseWheel { delta_y, screen } = event else {
        return;
    };
    let zoom = (ctx.canvas.zoom() + delta_y * ctx.config.zoom_step).clamp(ctx.config.min_zoom, ctx.config.max_zoom);
    ctx.canvas.zoom_to_point(*screen, zoom);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Geometry, ShapeKind};

    struct Harness {
        canvas: Canvas,
        bridge: SyncBridge,
        adapter: EventAdapter,
        config: WhiteboardConfig,
    }

    impl Harness {
        fn new() -> Self {
            let mut canvas = Canvas::new();
            register(&mut canvas);
            Self {
                canvas,
                bridge: SyncBridge::default(),
                adapter: EventAdapter::new(),
                config: WhiteboardConfig::default(),
            }
        }

        fn run(&mut self, events: Vec<CanvasEvent>) {
            let mut ctx = EventContext {
                canvas: &mut self.canvas,
                bridge: &mut self.bridge,
                adapter: &mut self.adapter,
                config: &self.config,
            };
            dispatch(&mut ctx, events);
        }

        fn down(&mut self, x: f64, y: f64) {
            let events = self.canvas.mouse_down(Point::new(x, y));
            self.run(events);
        }

        fn moved(&mut self, x: f64, y: f64) {
            let events = self.canvas.mouse_move(Point::new(x, y));
            self.run(events);
        }

        fn up(&mut self, x: f64, y: f64) {
            let events = self.canvas.mouse_up(Point::new(x, y));
            self.run(events);
        }
    }

    #[test]
    fn test_drawing_is_local_until_release() {
        let mut h = Harness::new();
        h.adapter.set_tool(ToolKind::Rect);

        h.down(10.0, 10.0);
        h.moved(50.0, 50.0);
        let pending = h.adapter.pending().unwrap();
        assert!(h.bridge.document().is_empty());
        assert!(h.canvas.object_id(pending).is_none());

        h.up(50.0, 50.0);
        assert_eq!(h.bridge.document().len(), 1);
        let id = h.canvas.object_id(pending).unwrap();
        let stored = h.bridge.document().get(&id.to_string()).unwrap();
        assert_eq!(stored["type"], "rect");
        assert_eq!(stored["left"], 10.0);
        assert_eq!(stored["width"], 40.0);
        assert_eq!(h.adapter.tool(), ToolKind::Select);
    }

    #[test]
    fn test_select_tool_draws_nothing() {
        let mut h = Harness::new();
        h.down(10.0, 10.0);
        h.up(20.0, 20.0);
        assert!(h.canvas.is_empty());
        assert!(h.bridge.document().is_empty());
    }

    #[test]
    fn test_same_type_hit_selects_instead_of_drawing() {
        let mut h = Harness::new();
        let existing = h.canvas.add(Shape::circle(Point::ZERO, 20.0));
        h.adapter.set_tool(ToolKind::Circle);

        h.down(10.0, 10.0);
        assert!(h.adapter.pending().is_none());
        assert_eq!(h.canvas.active_object(), Some(existing));
        assert_eq!(h.canvas.len(), 1);
    }

    #[test]
    fn test_other_type_hit_draws_over() {
        let mut h = Harness::new();
        h.canvas.add(Shape::circle(Point::ZERO, 20.0));
        h.adapter.set_tool(ToolKind::Triangle);

        h.down(10.0, 10.0);
        assert!(h.adapter.pending().is_some());
        assert!(h.canvas.active_objects().is_empty());
        assert!(!h.canvas.is_transforming(h.canvas.handles()[0]));
    }

    #[test]
    fn test_freeform_commits_on_path_created() {
        let mut h = Harness::new();
        h.adapter.set_tool(ToolKind::Freeform);
        h.canvas.drawing_mode = true;

        h.down(0.0, 0.0);
        h.moved(5.0, 5.0);
        h.moved(10.0, 0.0);
        h.up(10.0, 0.0);

        assert_eq!(h.bridge.document().len(), 1);
        assert_eq!(h.adapter.tool(), ToolKind::Freeform);
        let (_, path) = h.canvas.objects().next().unwrap();
        assert!(matches!(&path.geometry, Geometry::Path { points } if points.len() == 3));
        assert!((path.stroke_width - h.config.brush_width).abs() < f64::EPSILON);
    }

    #[test]
    fn test_drag_commits_once_on_release() {
        let mut h = Harness::new();
        let handle = h.canvas.add(Shape::rect(Point::ZERO, 10.0, 10.0));
        let id = h.bridge.commit(&mut h.canvas, handle).unwrap();
        let revision = h.bridge.document().revision();

        h.down(5.0, 5.0);
        h.moved(25.0, 5.0);
        h.moved(45.0, 5.0);
        assert_eq!(h.bridge.document().revision(), revision);

        h.up(45.0, 5.0);
        let stored = h.bridge.document().get(&id.to_string()).unwrap();
        assert_eq!(stored["left"], 40.0);
        assert_eq!(h.bridge.document().len(), 1);
    }

    #[test]
    fn test_moving_is_clamped_to_canvas() {
        let mut h = Harness::new();
        h.canvas.add(Shape::rect(Point::new(10.0, 10.0), 100.0, 100.0));
        h.down(20.0, 20.0);
        h.moved(-200.0, 2000.0);

        let (_, shape) = h.canvas.objects().next().unwrap();
        assert!((shape.left - 0.0).abs() < f64::EPSILON);
        assert!((shape.top - (h.canvas.size.height - 100.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_selection_fills_attributes_unless_editing() {
        let mut h = Harness::new();
        let text = Shape::text(Point::ZERO, "hello", "Times New Roman", 20.0, "600");
        h.canvas.add(text);

        h.down(5.0, 5.0);
        assert_eq!(h.adapter.attributes().font_family, "Times New Roman");
        h.up(5.0, 5.0);

        h.adapter.attributes_mut().font_family = "edited".to_string();
        h.canvas.discard_active();
        h.adapter.set_editing(true);
        let selected = vec![h.canvas.handles()[0]];
        h.run(vec![CanvasEvent::SelectionCreated { selected }]);
        assert_eq!(h.adapter.attributes().font_family, "edited");
    }

    #[test]
    fn test_scaling_updates_size_attributes() {
        let mut h = Harness::new();
        let handle = h.canvas.add(Shape::rect(Point::ZERO, 10.0, 20.0));
        h.canvas.set_active(handle);
        let events = h.canvas.scale_active(3.0, 2.0);
        h.run(events);
        assert_eq!(h.adapter.attributes().width, "30");
        assert_eq!(h.adapter.attributes().height, "40");
        assert!(h.bridge.document().is_empty());
    }

    #[test]
    fn test_wheel_zoom_is_clamped() {
        let mut h = Harness::new();
        let events = h.canvas.wheel(-300.0, Point::new(100.0, 100.0));
        h.run(events);
        assert!((h.canvas.zoom() - 0.7).abs() < 1e-9);

        let events = h.canvas.wheel(-5000.0, Point::ZERO);
        h.run(events);
        assert!((h.canvas.zoom() - h.config.min_zoom).abs() < 1e-9);

        let events = h.canvas.wheel(5000.0, Point::ZERO);
        h.run(events);
        assert!((h.canvas.zoom() - h.config.max_zoom).abs() < 1e-9);
        assert!(h.bridge.document().is_empty());
    }

    #[test]
    fn test_line_tool_follows_pointer() {
        let mut h = Harness::new();
        h.adapter.set_tool(ToolKind::Line);
        h.down(0.0, 0.0);
        h.moved(30.0, 40.0);
        h.up(30.0, 40.0);

        let (_, line) = h.canvas.objects().next().unwrap();
        assert_eq!(line.kind(), ShapeKind::Line);
        assert_eq!(line.geometry, Geometry::Line { x1: 0.0, y1: 0.0, x2: 30.0, y2: 40.0 });
    }
}
