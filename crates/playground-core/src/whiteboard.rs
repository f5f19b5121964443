//! A mounted whiteboard: the local canvas, its event handlers and the shared
//! document, driven by host input.
//!
//! Every input method and command reconciles the canvas with the document
//! before returning. The host calls [`Whiteboard::flush`] once per frame to
//! learn whether the canvas needs repainting.

use crate::adapter::{self, EventAdapter, EventContext};
use crate::attributes::{self, Attribute, AttributeError, ElementAttributes};
use crate::bridge::SyncBridge;
use crate::canvas::Canvas;
use crate::clipboard::{Clipboard, ClipboardStore, MemoryClipboard};
use crate::commands::{self, Direction};
use crate::config::WhiteboardConfig;
use crate::crdt::{DocumentError, VersionVector};
use crate::events::{CanvasEvent, ListenerId};
use crate::history::History;
use crate::input::KeyPress;
use crate::shapes::{ImageSource, ObjectId};
use crate::shortcuts::{ShortcutAction, ShortcutRegistry};
use crate::tools::ToolKind;
use kurbo::{Point, Size};

pub struct Whiteboard<S: ClipboardStore = MemoryClipboard> {
    config: WhiteboardConfig,
    canvas: Canvas,
    bridge: SyncBridge,
    adapter: EventAdapter,
    clipboard: Clipboard<S>,
    listeners: Vec<ListenerId>,
    mounted: bool,
}

impl Default for Whiteboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Whiteboard {
    pub fn new() -> Self {
        Self::with_config(WhiteboardConfig::default())
    }

    pub fn with_config(config: WhiteboardConfig) -> Self {
        Self::with_clipboard(config, MemoryClipboard::new())
    }
}

impl<S: ClipboardStore> Whiteboard<S> {
    pub fn with_clipboard(config: WhiteboardConfig, store: S) -> Self {
        Self {
            canvas: Canvas::new(),
            bridge: SyncBridge::with_config(&config),
            adapter: EventAdapter::new(),
            clipboard: Clipboard::new(store, &config),
            listeners: Vec::new(),
            mounted: false,
            config,
        }
    }

    // --- Lifecycle ---

    /// Register the event handlers and render the current document.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        if self.canvas.is_disposed() {
            let size = self.canvas.size;
            self.canvas = Canvas::new();
            self.canvas.size = size;
        }
        self.listeners = adapter::register(&mut self.canvas);
        self.mounted = true;
        self.bridge.invalidate();
        self.reconcile();
        self.canvas.request_render();
        log::info!("Whiteboard mounted with {} objects", self.canvas.len());
    }

    /// Deregister every handler and dispose the canvas. Input is ignored
    /// until the next [`mount`](Self::mount).
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        for id in self.listeners.drain(..) {
            self.canvas.off(id);
        }
        self.canvas.dispose();
        self.mounted = false;
        log::info!("Whiteboard unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Render pending document changes. Returns true if the canvas needs
    /// repainting.
    pub fn flush(&mut self) -> bool {
        if !self.mounted {
            return false;
        }
        self.reconcile();
        self.canvas.take_render_request()
    }

    /// Render the document onto the canvas if it changed since the last pass.
    fn reconcile(&mut self) {
        if !self.mounted {
            return;
        }
        if let Some(report) = self.bridge.sync(&mut self.canvas) {
            if report.changed() {
                self.canvas.request_render();
            }
        }
    }

    // --- Pointer input ---

    pub fn pointer_down(&mut self, screen: Point) {
        if !self.mounted {
            return;
        }
        // Clicking the canvas ends any style panel edit.
        self.adapter.set_editing(false);
        let events = self.canvas.mouse_down(screen);
        self.dispatch(events);
    }

    pub fn pointer_move(&mut self, screen: Point) {
        if !self.mounted {
            return;
        }
        let events = self.canvas.mouse_move(screen);
        self.dispatch(events);
    }

    pub fn pointer_up(&mut self, screen: Point) {
        if !self.mounted {
            return;
        }
        let events = self.canvas.mouse_up(screen);
        self.dispatch(events);
    }

    /// Resize the selection with a corner handle. Committed on `pointer_up`.
    pub fn scale_selection(&mut self, scale_x: f64, scale_y: f64) {
        if !self.mounted {
            return;
        }
        let events = self.canvas.scale_active(scale_x, scale_y);
        self.dispatch(events);
    }

    pub fn wheel(&mut self, delta_y: f64, screen: Point) {
        if !self.mounted {
            return;
        }
        let events = self.canvas.wheel(delta_y, screen);
        self.dispatch(events);
    }

    /// Handle a key press. Returns true if it triggered a shortcut.
    pub fn key_down(&mut self, press: &KeyPress, input_focused: bool) -> bool {
        if !self.mounted {
            return false;
        }
        let Some(action) = ShortcutRegistry::resolve(press, input_focused) else {
            return false;
        };
        log::debug!("Shortcut {:?}", action);
        match action {
            ShortcutAction::Copy => {
                self.copy();
            }
            ShortcutAction::Paste => {
                self.paste();
            }
            ShortcutAction::Cut => {
                self.cut();
            }
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Redo => {
                self.redo();
            }
            ShortcutAction::Delete => {
                self.delete_selected();
            }
        }
        true
    }

    fn dispatch(&mut self, events: Vec<CanvasEvent>) {
        let mut ctx = EventContext {
            canvas: &mut self.canvas,
            bridge: &mut self.bridge,
            adapter: &mut self.adapter,
            config: &self.config,
        };
        adapter::dispatch(&mut ctx, events);
        self.reconcile();
    }

    // --- Toolbar ---
    //
    // Toolbar actions and commands are ignored while unmounted, like input.

    /// Pick a toolbar element. Actions run immediately; drawing tools stay
    /// active until a shape is placed.
    pub fn select_tool(&mut self, tool: ToolKind) {
        if !self.mounted {
            return;
        }
        if let Some(pending) = self.adapter.pending() {
            self.canvas.remove(pending);
        }
        self.adapter.set_tool(tool);

        match tool {
            ToolKind::Reset => {
                self.canvas.drawing_mode = false;
                if !self.bridge.clear_all() {
                    log::info!("Board cleared");
                }
                self.canvas.clear();
                self.adapter.set_tool(ToolKind::Select);
            }
            ToolKind::Delete => {
                self.canvas.drawing_mode = false;
                commands::delete_selected(&mut self.canvas, &mut self.bridge);
                self.adapter.set_tool(ToolKind::Select);
            }
            ToolKind::Freeform => {
                self.canvas.drawing_mode = true;
                self.canvas.brush_width = self.config.brush_width;
                self.canvas.brush_color = self.config.default_stroke;
            }
            ToolKind::Comments => {}
            _ => {
                self.canvas.drawing_mode = false;
            }
        }
        self.reconcile();
    }

    pub fn tool(&self) -> ToolKind {
        self.adapter.tool()
    }

    // --- Commands ---

    /// Apply a style panel edit to the active object and share it.
    pub fn edit_attribute(&mut self, name: &str, value: &str) -> Result<bool, AttributeError> {
        let attribute: Attribute = name.parse()?;
        if !self.mounted {
            return Ok(false);
        }
        self.adapter.set_editing(true);
        let Some(handle) = self.canvas.active_object() else {
            self.adapter.attributes_mut().set(attribute, value);
            return Ok(false);
        };
        let Some(shape) = self.canvas.get_mut(handle) else {
            return Ok(false);
        };
        let changed = attributes::modify_shape(shape, attribute, value)?;
        self.adapter.attributes_mut().set(attribute, value);
        if changed {
            self.canvas.request_render();
            self.bridge.commit(&mut self.canvas, handle);
            self.reconcile();
        }
        Ok(changed)
    }

    pub fn bring_element(&mut self, direction: Direction) -> bool {
        if !self.mounted {
            return false;
        }
        let moved = commands::bring_element(&mut self.canvas, &mut self.bridge, direction);
        self.reconcile();
        moved
    }

    /// Insert a picked image and return to the select tool.
    pub fn insert_image(&mut self, source: &ImageSource) -> Option<ObjectId> {
        if !self.mounted {
            return None;
        }
        let id = commands::insert_image(&mut self.canvas, &mut self.bridge, &self.config, source);
        self.adapter.set_tool(ToolKind::Select);
        self.reconcile();
        id
    }

    pub fn copy(&mut self) -> usize {
        if !self.mounted {
            return 0;
        }
        self.clipboard.copy(&self.canvas)
    }

    pub fn cut(&mut self) -> Vec<ObjectId> {
        if !self.mounted {
            return Vec::new();
        }
        let removed = self.clipboard.cut(&mut self.canvas, &mut self.bridge);
        self.reconcile();
        removed
    }

    pub fn paste(&mut self) -> Vec<ObjectId> {
        if !self.mounted {
            return Vec::new();
        }
        let pasted = self.clipboard.paste(&mut self.canvas, &mut self.bridge);
        self.reconcile();
        pasted
    }

    pub fn delete_selected(&mut self) -> Vec<ObjectId> {
        if !self.mounted {
            return Vec::new();
        }
        let removed = commands::delete_selected(&mut self.canvas, &mut self.bridge);
        self.reconcile();
        removed
    }

    pub fn undo(&mut self) -> bool {
        if !self.mounted {
            return false;
        }
        let undone = self.bridge.undo();
        self.reconcile();
        undone
    }

    pub fn redo(&mut self) -> bool {
        if !self.mounted {
            return false;
        }
        let redone = self.bridge.redo();
        self.reconcile();
        redone
    }

    // --- Transport ---

    pub fn version(&self) -> VersionVector {
        self.bridge.version()
    }

    pub fn export_updates(&self, since: &VersionVector) -> Result<Vec<u8>, DocumentError> {
        self.bridge.export_updates(since)
    }

    pub fn export_snapshot(&self) -> Result<Vec<u8>, DocumentError> {
        self.bridge.export_snapshot()
    }

    /// Apply updates or a snapshot from a peer and render them.
    pub fn import_updates(&mut self, bytes: &[u8]) -> Result<(), DocumentError> {
        self.bridge.import(bytes)?;
        self.reconcile();
        Ok(())
    }

    // --- State ---

    pub fn resize(&mut self, width: f64, height: f64) {
        self.canvas.size = Size::new(width, height);
        self.canvas.request_render();
    }

    pub fn config(&self) -> &WhiteboardConfig {
        &self.config
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn bridge(&self) -> &SyncBridge {
        &self.bridge
    }

    pub fn clipboard(&self) -> &Clipboard<S> {
        &self.clipboard
    }

    pub fn attributes(&self) -> &ElementAttributes {
        self.adapter.attributes()
    }

    pub fn adapter(&self) -> &EventAdapter {
        &self.adapter
    }
}
