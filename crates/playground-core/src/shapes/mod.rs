//! Native drawing objects for the whiteboard canvas.
//!
//! A [`Shape`] is what the canvas draws and hit-tests. Its serde form is the
//! object's own serialization (camelCase fields, a `type` discriminator), which
//! is mirrored verbatim into shared-document snapshots and clipboard payloads.
//! Shapes carry no identity; ids live in the canvas side map.

mod color;
mod image;

pub use color::{ColorParseError, SerializableColor};
pub use image::{ImageFormat, ImageSource};

use crate::config::WhiteboardConfig;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier of a shared shape.
pub type ObjectId = Uuid;

/// Line height factor applied to text boxes.
const TEXT_LINE_HEIGHT: f64 = 1.16;
/// Average glyph advance relative to the font size.
const TEXT_CHAR_WIDTH: f64 = 0.6;

/// Discriminator for the supported object types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Rect,
    Circle,
    Triangle,
    Line,
    Path,
    Text,
    Image,
}

impl ShapeKind {
    /// All kinds, in toolbar order.
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::Rect,
        ShapeKind::Circle,
        ShapeKind::Triangle,
        ShapeKind::Line,
        ShapeKind::Path,
        ShapeKind::Text,
        ShapeKind::Image,
    ];

    /// The `type` value used in serialized objects.
    pub fn type_name(self) -> &'static str {
        match self {
            ShapeKind::Rect => "rect",
            ShapeKind::Circle => "circle",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Line => "line",
            ShapeKind::Path => "path",
            ShapeKind::Text => "i-text",
            ShapeKind::Image => "image",
        }
    }

    /// Parse a serialized `type` value.
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_name() == name)
    }

    /// Geometry fields a stored record must carry to be rebuilt.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            ShapeKind::Rect | ShapeKind::Triangle => &["left", "top", "width", "height"],
            ShapeKind::Circle => &["left", "top", "radius"],
            ShapeKind::Line => &["left", "top", "x1", "y1", "x2", "y2"],
            ShapeKind::Path => &["left", "top", "points"],
            ShapeKind::Text => &["left", "top", "text"],
            ShapeKind::Image => &["left", "top", "width", "height", "src"],
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Type-specific part of a shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    #[serde(rename = "rect")]
    Rect,
    #[serde(rename = "circle")]
    Circle { radius: f64 },
    #[serde(rename = "triangle")]
    Triangle,
    /// Endpoints are absolute canvas coordinates.
    #[serde(rename = "line")]
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    /// Freeform brush stroke, absolute canvas coordinates.
    #[serde(rename = "path")]
    Path { points: Vec<Point> },
    #[serde(rename = "i-text")]
    Text {
        text: String,
        #[serde(rename = "fontFamily")]
        font_family: String,
        #[serde(rename = "fontSize")]
        font_size: f64,
        #[serde(rename = "fontWeight")]
        font_weight: String,
    },
    /// `src` is a URL or a data URL.
    #[serde(rename = "image")]
    Image { src: String },
}

impl Geometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Rect => ShapeKind::Rect,
            Geometry::Circle { .. } => ShapeKind::Circle,
            Geometry::Triangle => ShapeKind::Triangle,
            Geometry::Line { .. } => ShapeKind::Line,
            Geometry::Path { .. } => ShapeKind::Path,
            Geometry::Text { .. } => ShapeKind::Text,
            Geometry::Image { .. } => ShapeKind::Image,
        }
    }
}

fn unit() -> f64 {
    1.0
}

/// A drawable object on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    #[serde(flatten)]
    pub geometry: Geometry,
    /// Left edge of the unscaled bounding box.
    pub left: f64,
    /// Top edge of the unscaled bounding box.
    pub top: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default = "unit")]
    pub scale_x: f64,
    #[serde(default = "unit")]
    pub scale_y: f64,
    /// Rotation in degrees.
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub fill: Option<SerializableColor>,
    #[serde(default)]
    pub stroke: Option<SerializableColor>,
    #[serde(default = "unit")]
    pub stroke_width: f64,
    #[serde(default = "unit")]
    pub opacity: f64,
}

impl Shape {
    fn with_geometry(geometry: Geometry, left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            geometry,
            left,
            top,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            fill: None,
            stroke: None,
            stroke_width: 1.0,
            opacity: 1.0,
        }
    }

    /// Create a rectangle.
    pub fn rect(position: Point, width: f64, height: f64) -> Self {
        Self::with_geometry(Geometry::Rect, position.x, position.y, width, height)
    }

    /// Create a triangle inscribed in the given box.
    pub fn triangle(position: Point, width: f64, height: f64) -> Self {
        Self::with_geometry(Geometry::Triangle, position.x, position.y, width, height)
    }

    /// Create a circle whose bounding box starts at `position`.
    pub fn circle(position: Point, radius: f64) -> Self {
        let diameter = radius * 2.0;
        Self::with_geometry(
            Geometry::Circle { radius },
            position.x,
            position.y,
            diameter,
            diameter,
        )
    }

    /// Create a line segment.
    pub fn line(start: Point, end: Point) -> Self {
        let mut shape = Self::with_geometry(
            Geometry::Line {
                x1: start.x,
                y1: start.y,
                x2: end.x,
                y2: end.y,
            },
            0.0,
            0.0,
            0.0,
            0.0,
        );
        shape.fit_to_geometry();
        shape
    }

    /// Create a freeform path from brush points.
    pub fn path(points: Vec<Point>) -> Self {
        let mut shape = Self::with_geometry(Geometry::Path { points }, 0.0, 0.0, 0.0, 0.0);
        shape.fit_to_geometry();
        shape
    }

    /// Create an editable text box.
    pub fn text(
        position: Point,
        text: impl Into<String>,
        font_family: impl Into<String>,
        font_size: f64,
        font_weight: impl Into<String>,
    ) -> Self {
        let mut shape = Self::with_geometry(
            Geometry::Text {
                text: text.into(),
                font_family: font_family.into(),
                font_size,
                font_weight: font_weight.into(),
            },
            position.x,
            position.y,
            0.0,
            0.0,
        );
        shape.fit_to_geometry();
        shape
    }

    /// Create an image with its natural size.
    pub fn image(position: Point, src: impl Into<String>, width: f64, height: f64) -> Self {
        Self::with_geometry(Geometry::Image { src: src.into() }, position.x, position.y, width, height)
    }

    /// Create the default shape a drawing tool places at `pointer`.
    ///
    /// Returns `None` for kinds that are not drawn by dragging (paths come from
    /// the brush, images from insertion).
    pub fn for_tool(kind: ShapeKind, pointer: Point, config: &WhiteboardConfig) -> Option<Self> {
        let size = config.shape_size;
        let shape = match kind {
            ShapeKind::Rect => Self::rect(pointer, size, size).with_fill(config.default_fill),
            ShapeKind::Triangle => Self::triangle(pointer, size, size).with_fill(config.default_fill),
            ShapeKind::Circle => Self::circle(pointer, config.circle_radius).with_fill(config.default_fill),
            ShapeKind::Line => {
                let mut line = Self::line(pointer, pointer + Vec2::new(size, size));
                line.stroke = Some(config.default_stroke);
                line.stroke_width = config.line_stroke_width;
                line
            }
            ShapeKind::Text => Self::text(
                pointer,
                config.text_placeholder.clone(),
                config.font_family.clone(),
                config.font_size,
                config.font_weight.clone(),
            )
            .with_fill(config.default_fill),
            ShapeKind::Path | ShapeKind::Image => return None,
        };
        Some(shape)
    }

    /// Builder-style fill setter.
    pub fn with_fill(mut self, fill: SerializableColor) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    /// Width after scaling.
    pub fn scaled_width(&self) -> f64 {
        self.width * self.scale_x
    }

    /// Height after scaling.
    pub fn scaled_height(&self) -> f64 {
        self.height * self.scale_y
    }

    /// Axis-aligned bounds in canvas coordinates (rotation ignored).
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.left,
            self.top,
            self.left + self.scaled_width(),
            self.top + self.scaled_height(),
        )
        .abs()
    }

    /// Check if a canvas point falls within this shape's bounds.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    /// Move the shape, including absolute geometry points.
    pub fn translate(&mut self, delta: Vec2) {
        self.left += delta.x;
        self.top += delta.y;
        match &mut self.geometry {
            Geometry::Line { x1, y1, x2, y2 } => {
                *x1 += delta.x;
                *y1 += delta.y;
                *x2 += delta.x;
                *y2 += delta.y;
            }
            Geometry::Path { points } => {
                for point in points.iter_mut() {
                    *point += delta;
                }
            }
            _ => {}
        }
    }

    /// Reshape a shape being drawn, given the drag anchor and the current pointer.
    pub fn resize_from(&mut self, anchor: Point, pointer: Point) {
        match &mut self.geometry {
            Geometry::Rect | Geometry::Triangle | Geometry::Image { .. } => {
                self.left = anchor.x.min(pointer.x);
                self.top = anchor.y.min(pointer.y);
                self.width = (pointer.x - anchor.x).abs();
                self.height = (pointer.y - anchor.y).abs();
            }
            Geometry::Circle { radius } => {
                *radius = (pointer.x - anchor.x).abs() / 2.0;
                self.width = *radius * 2.0;
                self.height = *radius * 2.0;
            }
            Geometry::Line { x2, y2, .. } => {
                *x2 = pointer.x;
                *y2 = pointer.y;
                self.fit_to_geometry();
            }
            Geometry::Path { .. } | Geometry::Text { .. } => {}
        }
    }

    /// Recompute the bounding box for shapes whose box is derived from geometry.
    pub fn fit_to_geometry(&mut self) {
        match &self.geometry {
            Geometry::Line { x1, y1, x2, y2 } => {
                self.left = x1.min(*x2);
                self.top = y1.min(*y2);
                self.width = (x2 - x1).abs();
                self.height = (y2 - y1).abs();
            }
            Geometry::Path { points } => {
                let Some(first) = points.first() else {
                    return;
                };
                let bounds = points
                    .iter()
                    .fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p));
                self.left = bounds.x0;
                self.top = bounds.y0;
                self.width = bounds.width();
                self.height = bounds.height();
            }
            Geometry::Text {
                text, font_size, ..
            } => {
                let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
                let lines = text.lines().count().max(1);
                self.width = longest as f64 * font_size * TEXT_CHAR_WIDTH;
                self.height = lines as f64 * font_size * TEXT_LINE_HEIGHT;
            }
            _ => {}
        }
    }
}
