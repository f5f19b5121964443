//! Tool system for the whiteboard.

use crate::shapes::ShapeKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Available tools and toolbar actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    #[serde(rename = "rectangle")]
    Rect,
    Circle,
    Triangle,
    Line,
    Text,
    Freeform,
    Image,
    Reset,
    Delete,
    Comments,
}

impl ToolKind {
    pub const ALL: [ToolKind; 11] = [
        ToolKind::Select,
        ToolKind::Rect,
        ToolKind::Circle,
        ToolKind::Triangle,
        ToolKind::Line,
        ToolKind::Text,
        ToolKind::Freeform,
        ToolKind::Image,
        ToolKind::Reset,
        ToolKind::Delete,
        ToolKind::Comments,
    ];

    /// Toolbar value.
    pub fn value(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Rect => "rectangle",
            ToolKind::Circle => "circle",
            ToolKind::Triangle => "triangle",
            ToolKind::Line => "line",
            ToolKind::Text => "text",
            ToolKind::Freeform => "freeform",
            ToolKind::Image => "image",
            ToolKind::Reset => "reset",
            ToolKind::Delete => "delete",
            ToolKind::Comments => "comments",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.value() == value)
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Rect => "Rectangle",
            ToolKind::Circle => "Circle",
            ToolKind::Triangle => "Triangle",
            ToolKind::Line => "Line",
            ToolKind::Text => "Text",
            ToolKind::Freeform => "Free Drawing",
            ToolKind::Image => "Image",
            ToolKind::Reset => "Reset",
            ToolKind::Delete => "Delete",
            ToolKind::Comments => "Comments",
        }
    }

    /// Shape placed by dragging with this tool.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            ToolKind::Rect => Some(ShapeKind::Rect),
            ToolKind::Circle => Some(ShapeKind::Circle),
            ToolKind::Triangle => Some(ShapeKind::Triangle),
            ToolKind::Line => Some(ShapeKind::Line),
            ToolKind::Text => Some(ShapeKind::Text),
            _ => None,
        }
    }

    /// One-shot toolbar actions that run when picked instead of staying active.
    pub fn is_action(self) -> bool {
        matches!(
            self,
            ToolKind::Reset | ToolKind::Delete | ToolKind::Image | ToolKind::Comments
        )
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// The toolbar element currently selected. Local only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveElement {
    pub name: String,
    pub value: ToolKind,
    pub icon: String,
}

impl ActiveElement {
    pub fn new(tool: ToolKind) -> Self {
        Self {
            name: tool.name().to_string(),
            value: tool,
            icon: format!("/assets/{}.svg", tool.value()),
        }
    }

    pub fn tool(&self) -> ToolKind {
        self.value
    }
}

impl Default for ActiveElement {
    fn default() -> Self {
        Self::new(ToolKind::Select)
    }
}
