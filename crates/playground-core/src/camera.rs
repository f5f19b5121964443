//! Per-user viewport: zoom and pan. Never synchronized.

use kurbo::{Affine, Point, Vec2};

/// Camera manages the view transform for the canvas.
///
/// Pointer input arrives in screen coordinates and is converted to canvas
/// (world) coordinates before hit-testing or drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Current translation offset (pan)
    pub offset: Vec2,
    /// Current zoom level (1.0 = 100%)
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// World-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen-to-world transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Set an absolute zoom level, keeping `screen_point` fixed on screen.
    pub fn zoom_to_point(&mut self, screen_point: Point, zoom: f64) {
        if zoom <= 0.0 || (zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let world_point = self.screen_to_world(screen_point);
        self.zoom = zoom;
        let new_screen = self.world_to_screen(world_point);
        self.offset += screen_point - new_screen;
    }

    /// Reset to identity.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
