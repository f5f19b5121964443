//! Playground Core Library
//!
//! Shape synchronization for a collaborative whiteboard: a local canvas, the
//! event handlers that decide what gets shared, and a Loro document that
//! carries the shared state between users.

pub mod adapter;
pub mod attributes;
pub mod bridge;
pub mod camera;
pub mod canvas;
pub mod clipboard;
pub mod codec;
pub mod commands;
pub mod config;
pub mod crdt;
pub mod events;
pub mod history;
pub mod input;
pub mod shapes;
pub mod shortcuts;
pub mod tools;
pub mod whiteboard;

pub use adapter::{EventAdapter, EventContext};
pub use attributes::{Attribute, AttributeError, ElementAttributes};
pub use bridge::{RenderReport, SyncBridge};
pub use camera::Camera;
pub use canvas::{Canvas, Handle};
pub use clipboard::{Clipboard, ClipboardStore, MemoryClipboard};
pub use codec::{CodecError, ShapeSnapshot};
pub use commands::Direction;
pub use config::{ConfigError, WhiteboardConfig};
pub use crdt::{DocumentError, SharedDocument, SnapshotMap};
pub use events::{CanvasEvent, EventKind, ListenerId};
pub use history::History;
pub use input::{KeyPress, Modifiers};
pub use shapes::{Geometry, ImageSource, ObjectId, SerializableColor, Shape, ShapeKind};
pub use shortcuts::{ShortcutAction, ShortcutRegistry};
pub use tools::{ActiveElement, ToolKind};
pub use whiteboard::Whiteboard;
