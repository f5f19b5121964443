//! Canvas events and the listener registry.

use crate::adapter::EventContext;
use crate::canvas::Handle;
use kurbo::Point;

/// Events raised by the canvas while it processes pointer input.
///
/// Pointers are in canvas coordinates, except for `MouseWheel`, which keeps the
/// screen position the zoom is anchored on.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    MouseDown { pointer: Point, target: Option<Handle> },
    MouseMove { pointer: Point },
    MouseUp { pointer: Point },
    MouseWheel { delta_y: f64, screen: Point },
    /// A brush stroke finished and was added as a path object.
    PathCreated { target: Handle },
    /// A drag or resize of an existing object finished.
    ObjectModified { target: Handle },
    ObjectMoving { target: Handle },
    ObjectScaling { target: Handle },
    SelectionCreated { selected: Vec<Handle> },
    SelectionCleared,
}

impl CanvasEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            CanvasEvent::MouseDown { .. } => EventKind::MouseDown,
            CanvasEvent::MouseMove { .. } => EventKind::MouseMove,
            CanvasEvent::MouseUp { .. } => EventKind::MouseUp,
            CanvasEvent::MouseWheel { .. } => EventKind::MouseWheel,
            CanvasEvent::PathCreated { .. } => EventKind::PathCreated,
            CanvasEvent::ObjectModified { .. } => EventKind::ObjectModified,
            CanvasEvent::ObjectMoving { .. } => EventKind::ObjectMoving,
            CanvasEvent::ObjectScaling { .. } => EventKind::ObjectScaling,
            CanvasEvent::SelectionCreated { .. } => EventKind::SelectionCreated,
            CanvasEvent::SelectionCleared => EventKind::SelectionCleared,
        }
    }
}

/// Event names a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MouseDown,
    MouseMove,
    MouseUp,
    MouseWheel,
    PathCreated,
    ObjectModified,
    ObjectMoving,
    ObjectScaling,
    SelectionCreated,
    SelectionCleared,
}

impl EventKind {
    pub fn name(self) -> &'static str {
        match self {
            EventKind::MouseDown => "mouse:down",
            EventKind::MouseMove => "mouse:move",
            EventKind::MouseUp => "mouse:up",
            EventKind::MouseWheel => "mouse:wheel",
            EventKind::PathCreated => "path:created",
            EventKind::ObjectModified => "object:modified",
            EventKind::ObjectMoving => "object:moving",
            EventKind::ObjectScaling => "object:scaling",
            EventKind::SelectionCreated => "selection:created",
            EventKind::SelectionCleared => "selection:cleared",
        }
    }
}

/// A registered callback. Plain function pointers, so the registry holds the
/// exact value that was registered.
pub type EventHandler = fn(&mut EventContext<'_>, &CanvasEvent);

/// Token returned by [`Listeners::on`], required to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener {
    id: ListenerId,
    kind: EventKind,
    handler: EventHandler,
}

/// Registry of event listeners.
#[derive(Default)]
pub struct Listeners {
    entries: Vec<Listener>,
    next_id: u64,
}

impl Listeners {
    /// Register a handler for one event kind.
    pub fn on(&mut self, kind: EventKind, handler: EventHandler) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.entries.push(Listener { id, kind, handler });
        id
    }

    /// Remove a registered handler. Returns false if the id is unknown.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|listener| listener.id != id);
        self.entries.len() != before
    }

    /// Handlers registered for `kind`, in registration order.
    pub fn handlers(&self, kind: EventKind) -> Vec<EventHandler> {
        self.entries
            .iter()
            .filter(|listener| listener.kind == kind)
            .map(|listener| listener.handler)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
