//! Whiteboard configuration.

use crate::shapes::SerializableColor;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables for drawing defaults, zoom, history and clipboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhiteboardConfig {
    /// Fill for newly drawn shapes.
    pub default_fill: SerializableColor,
    /// Stroke for newly drawn lines and brush paths.
    pub default_stroke: SerializableColor,
    /// Initial width and height of rectangles and triangles.
    pub shape_size: f64,
    pub circle_radius: f64,
    pub line_stroke_width: f64,
    /// Free-drawing brush width.
    pub brush_width: f64,
    pub text_placeholder: String,
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: String,
    /// Offset applied to both axes of pasted objects.
    pub paste_offset: f64,
    /// Height inserted images are scaled to.
    pub image_size: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom change per unit of wheel delta.
    pub zoom_step: f64,
    pub max_undo_steps: usize,
    /// Commits closer together than this merge into one undo step (0 = never).
    pub undo_merge_interval_ms: i64,
    /// Slot name used in the clipboard store.
    pub clipboard_key: String,
}

impl Default for WhiteboardConfig {
    fn default() -> Self {
        Self {
            default_fill: SerializableColor::rgb(0xaa, 0xbb, 0xcc),
            default_stroke: SerializableColor::rgb(0xaa, 0xbb, 0xcc),
            shape_size: 100.0,
            circle_radius: 100.0,
            line_stroke_width: 2.0,
            brush_width: 5.0,
            text_placeholder: "Tap to Type".to_string(),
            font_family: "Helvetica".to_string(),
            font_size: 36.0,
            font_weight: "400".to_string(),
            paste_offset: 20.0,
            image_size: 200.0,
            min_zoom: 0.2,
            max_zoom: 1.0,
            zoom_step: 0.001,
            max_undo_steps: 100,
            undo_merge_interval_ms: 0,
            clipboard_key: "clipboard".to_string(),
        }
    }
}

impl WhiteboardConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom > 0.0 && self.max_zoom >= self.min_zoom && self.max_zoom.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "zoom range {}..{} must be positive and ordered",
                self.min_zoom, self.max_zoom
            )));
        }
        let sizes = [
            ("shape_size", self.shape_size),
            ("circle_radius", self.circle_radius),
            ("brush_width", self.brush_width),
            ("font_size", self.font_size),
            ("image_size", self.image_size),
            ("line_stroke_width", self.line_stroke_width),
            ("zoom_step", self.zoom_step),
            ("paste_offset", self.paste_offset),
        ];
        if let Some((name, value)) = sizes.iter().find(|(_, v)| !(v.is_finite() && *v > 0.0)) {
            return Err(ConfigError::Invalid(format!("{} must be positive, got {}", name, value)));
        }
        if self.clipboard_key.is_empty() {
            return Err(ConfigError::Invalid("clipboard_key must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        assert!(WhiteboardConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = WhiteboardConfig::from_json(r##"{ "paste_offset": 5.0, "default_fill": "#ff0000" }"##).unwrap();
        assert!((config.paste_offset - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.default_fill, SerializableColor::rgb(255, 0, 0));
        assert!((config.shape_size - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_zoom_rejected() {
        let result = WhiteboardConfig::from_json(r#"{ "min_zoom": 2.0, "max_zoom": 1.0 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_non_positive_or_nan_values_rejected() {
        let mut config = WhiteboardConfig::default();
        config.min_zoom = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let setters: [(&str, fn(&mut WhiteboardConfig, f64)); 4] = [
            ("zoom_step", |c, v| c.zoom_step = v),
            ("line_stroke_width", |c, v| c.line_stroke_width = v),
            ("paste_offset", |c, v| c.paste_offset = v),
            ("brush_width", |c, v| c.brush_width = v),
        ];
        for (name, set) in setters {
            for bad in [f64::NAN, 0.0, -1.0] {
                let mut config = WhiteboardConfig::default();
                set(&mut config, bad);
                assert!(
                    matches!(config.validate(), Err(ConfigError::Invalid(_))),
                    "{} = {}",
                    name,
                    bad
                );
            }
        }
    }

    #[test]
    fn test_bad_color_is_parse_error() {
        let result = WhiteboardConfig::from_json(r#"{ "default_fill": "red" }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_undo_steps": 7 }}"#).unwrap();
        let config = WhiteboardConfig::load(file.path()).unwrap();
        assert_eq!(config.max_undo_steps, 7);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = WhiteboardConfig::load("/nonexistent/playground.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
