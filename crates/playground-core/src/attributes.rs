//! Style panel state mirrored from the selected object.

use crate::shapes::{ColorParseError, Geometry, SerializableColor, Shape};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Font families offered by the style panel.
pub const FONT_FAMILY_OPTIONS: [&str; 4] = ["Helvetica", "Times New Roman", "Comic Sans MS", "Brush Script MT"];

/// Font weights offered by the style panel, as `(value, label)`.
pub const FONT_WEIGHT_OPTIONS: [(&str, &str); 3] = [("400", "Normal"), ("600", "Semibold"), ("800", "Bold")];

/// Font sizes offered by the style panel.
pub fn font_size_options() -> impl Iterator<Item = u32> {
    (10..=36).step_by(2)
}

/// Errors from editing a style attribute.
#[derive(Debug, Error)]
pub enum AttributeError {
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),
    #[error("invalid value for {attribute}: {value}")]
    InvalidValue { attribute: Attribute, value: String },
    #[error(transparent)]
    InvalidColor(#[from] ColorParseError),
}

/// Editable style properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Width,
    Height,
    FontSize,
    FontFamily,
    FontWeight,
    Fill,
    Stroke,
}

impl Attribute {
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Width => "width",
            Attribute::Height => "height",
            Attribute::FontSize => "fontSize",
            Attribute::FontFamily => "fontFamily",
            Attribute::FontWeight => "fontWeight",
            Attribute::Fill => "fill",
            Attribute::Stroke => "stroke",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Attribute {
    type Err = AttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "width" => Ok(Attribute::Width),
            "height" => Ok(Attribute::Height),
            "fontSize" => Ok(Attribute::FontSize),
            "fontFamily" => Ok(Attribute::FontFamily),
            "fontWeight" => Ok(Attribute::FontWeight),
            "fill" => Ok(Attribute::Fill),
            "stroke" => Ok(Attribute::Stroke),
            _ => Err(AttributeError::UnknownAttribute(s.to_string())),
        }
    }
}

/// Style panel values, as the panel displays them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementAttributes {
    pub width: String,
    pub height: String,
    pub font_size: String,
    pub font_family: String,
    pub font_weight: String,
    pub fill: String,
    pub stroke: String,
}

impl ElementAttributes {
    /// Read the panel values from an object. Sizes are the scaled size
    /// rounded to whole pixels.
    pub fn from_shape(shape: &Shape) -> Self {
        let (font_size, font_family, font_weight) = match &shape.geometry {
            Geometry::Text {
                font_family,
                font_size,
                font_weight,
                ..
            } => (format_number(*font_size), font_family.clone(), font_weight.clone()),
            _ => Default::default(),
        };
        Self {
            width: format!("{:.0}", shape.scaled_width()),
            height: format!("{:.0}", shape.scaled_height()),
            font_size,
            font_family,
            font_weight,
            fill: shape.fill.map(|c| c.to_hex()).unwrap_or_default(),
            stroke: shape.stroke.map(|c| c.to_hex()).unwrap_or_default(),
        }
    }

    pub fn get(&self, attribute: Attribute) -> &str {
        match attribute {
            Attribute::Width => &self.width,
            Attribute::Height => &self.height,
            Attribute::FontSize => &self.font_size,
            Attribute::FontFamily => &self.font_family,
            Attribute::FontWeight => &self.font_weight,
            Attribute::Fill => &self.fill,
            Attribute::Stroke => &self.stroke,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: impl Into<String>) {
        let slot = match attribute {
            Attribute::Width => &mut self.width,
            Attribute::Height => &mut self.height,
            Attribute::FontSize => &mut self.font_size,
            Attribute::FontFamily => &mut self.font_family,
            Attribute::FontWeight => &mut self.font_weight,
            Attribute::Fill => &mut self.fill,
            Attribute::Stroke => &mut self.stroke,
        };
        *slot = value.into();
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

fn parse_number(attribute: Attribute, value: &str) -> Result<f64, AttributeError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| AttributeError::InvalidValue {
            attribute,
            value: value.to_string(),
        })
}

/// Apply a panel edit to an object. Returns true if the object changed.
///
/// Setting `width` or `height` resets the matching scale to 1. Font
/// attributes only apply to text and are ignored on other objects.
pub fn modify_shape(shape: &mut Shape, attribute: Attribute, value: &str) -> Result<bool, AttributeError> {
    let before = shape.clone();
    match attribute {
        Attribute::Width => {
            shape.width = parse_number(attribute, value)?;
            shape.scale_x = 1.0;
        }
        Attribute::Height => {
            shape.height = parse_number(attribute, value)?;
            shape.scale_y = 1.0;
        }
        Attribute::Fill => shape.fill = Some(value.parse::<SerializableColor>()?),
        Attribute::Stroke => shape.stroke = Some(value.parse::<SerializableColor>()?),
        Attribute::FontSize | Attribute::FontFamily | Attribute::FontWeight => {
            let size = match attribute {
                Attribute::FontSize => Some(parse_number(attribute, value)?),
                _ => None,
            };
            if value.trim().is_empty() {
                return Err(AttributeError::InvalidValue {
                    attribute,
                    value: value.to_string(),
                });
            }
            if let Geometry::Text {
                font_family,
                font_size,
                font_weight,
                ..
            } = &mut shape.geometry
            {
                match attribute {
                    Attribute::FontFamily => *font_family = value.to_string(),
                    Attribute::FontWeight => *font_weight = value.to_string(),
                    _ => *font_size = size.unwrap_or(*font_size),
                }
                shape.fit_to_geometry();
            }
        }
    }
    Ok(*shape != before)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn test_attribute_names() {
        assert_eq!("fontSize".parse::<Attribute>().unwrap(), Attribute::FontSize);
        assert!(matches!(
            "opacity".parse::<Attribute>(),
            Err(AttributeError::UnknownAttribute(_))
        ));
    }

    #[test]
    fn test_from_shape_rounds_scaled_size() {
        let mut rect = Shape::rect(Point::ZERO, 100.0, 50.0).with_fill(SerializableColor::rgb(0xaa, 0xbb, 0xcc));
        rect.scale_x = 1.26;
        let attrs = ElementAttributes::from_shape(&rect);
        assert_eq!(attrs.width, "126");
        assert_eq!(attrs.height, "50");
        assert_eq!(attrs.fill, "#aabbcc");
        assert_eq!(attrs.font_family, "");
    }

    #[test]
    fn test_from_text_reads_font() {
        let text = Shape::text(Point::ZERO, "hi", "Comic Sans MS", 24.0, "800");
        let attrs = ElementAttributes::from_shape(&text);
        assert_eq!(attrs.font_size, "24");
        assert_eq!(attrs.font_family, "Comic Sans MS");
        assert_eq!(attrs.font_weight, "800");
    }

    #[test]
    fn test_width_resets_scale() {
        let mut rect = Shape::rect(Point::ZERO, 100.0, 50.0);
        rect.scale_x = 2.0;
        assert!(modify_shape(&mut rect, Attribute::Width, "80").unwrap());
        assert!((rect.width - 80.0).abs() < f64::EPSILON);
        assert!((rect.scale_x - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unchanged_value_reports_false() {
        let mut rect = Shape::rect(Point::ZERO, 100.0, 50.0).with_fill(SerializableColor::white());
        assert!(!modify_shape(&mut rect, Attribute::Fill, "#ffffff").unwrap());
        assert!(!modify_shape(&mut rect, Attribute::Height, "50").unwrap());
        assert!(!modify_shape(&mut rect, Attribute::FontFamily, "Helvetica").unwrap());
    }

    #[test]
    fn test_font_size_refits_text() {
        let mut text = Shape::text(Point::ZERO, "abc", "Helvetica", 10.0, "400");
        assert!(modify_shape(&mut text, Attribute::FontSize, "20").unwrap());
        assert!((text.width - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut rect = Shape::rect(Point::ZERO, 100.0, 50.0);
        assert!(matches!(
            modify_shape(&mut rect, Attribute::Width, "wide"),
            Err(AttributeError::InvalidValue { .. })
        ));
        assert!(matches!(
            modify_shape(&mut rect, Attribute::Fill, "blue"),
            Err(AttributeError::InvalidColor(_))
        ));
        assert!((rect.width - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_font_options() {
        let sizes: Vec<u32> = font_size_options().collect();
        assert_eq!(sizes.first(), Some(&10));
        assert_eq!(sizes.last(), Some(&36));
        assert_eq!(sizes.len(), 14);
        assert!(FONT_FAMILY_OPTIONS.contains(&"Helvetica"));
        assert_eq!(FONT_WEIGHT_OPTIONS[2], ("800", "Bold"));
    }
}
