//! Editing commands that change the canvas and the shared document together.

use crate::bridge::SyncBridge;
use crate::canvas::Canvas;
use crate::config::WhiteboardConfig;
use crate::shapes::{ImageSource, ObjectId, Shape};
use kurbo::Point;
use std::str::FromStr;
use uuid::Uuid;

/// Stacking direction for [`bring_element`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Front,
    Back,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "front" => Ok(Direction::Front),
            "back" => Ok(Direction::Back),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

/// Delete the selected objects locally and from the document.
///
/// Objects without an id were never shared and are left alone.
pub fn delete_selected(canvas: &mut Canvas, bridge: &mut SyncBridge) -> Vec<ObjectId> {
    let selected = canvas.active_objects().to_vec();
    let mut removed = Vec::with_capacity(selected.len());
    for handle in selected {
        let Some(id) = canvas.object_id(handle) else {
            continue;
        };
        canvas.remove(handle);
        removed.push(id);
    }
    bridge.remove_all(&removed);
    canvas.discard_active();
    removed
}

/// Restack the single active object and share the new order.
pub fn bring_element(canvas: &mut Canvas, bridge: &mut SyncBridge, direction: Direction) -> bool {
    let Some(handle) = canvas.active_object() else {
        return false;
    };
    let moved = match direction {
        Direction::Front => canvas.bring_to_front(handle),
        Direction::Back => canvas.send_to_back(handle),
    };
    if let Some(id) = canvas.object_id(handle) {
        match direction {
            Direction::Front => bridge.bring_to_front(id),
            Direction::Back => bridge.send_to_back(id),
        }
    }
    moved
}

/// Place an image at the origin, scaled to the configured height, and share it.
pub fn insert_image(
    canvas: &mut Canvas,
    bridge: &mut SyncBridge,
    config: &WhiteboardConfig,
    source: &ImageSource,
) -> Option<ObjectId> {
    if source.width == 0 || source.height == 0 {
        log::warn!("Ignoring empty image {}x{}", source.width, source.height);
        return None;
    }
    let mut image = Shape::image(
        Point::ZERO,
        source.src.clone(),
        f64::from(source.width),
        f64::from(source.height),
    );
    let scale = config.image_size / f64::from(source.height);
    image.scale_x = scale;
    image.scale_y = scale;

    let handle = canvas.add_with_id(Uuid::new_v4(), image);
    bridge.commit(canvas, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ShapeKind;

    fn shared_rect(canvas: &mut Canvas, bridge: &mut SyncBridge, x: f64) -> ObjectId {
        let handle = canvas.add(Shape::rect(Point::new(x, 0.0), 10.0, 10.0));
        bridge.commit(canvas, handle).unwrap()
    }

    #[test]
    fn test_delete_removes_both_sides() {
        let mut canvas = Canvas::new();
        let mut bridge = SyncBridge::default();
        let id = shared_rect(&mut canvas, &mut bridge, 0.0);
        let pending = canvas.add(Shape::rect(Point::new(50.0, 0.0), 10.0, 10.0));

        let handle = canvas.handle_of(id).unwrap();
        canvas.set_active(handle);
        assert_eq!(delete_selected(&mut canvas, &mut bridge), vec![id]);
        assert!(!bridge.document().contains(&id.to_string()));
        assert!(canvas.handle_of(id).is_none());

        canvas.set_active(pending);
        assert!(delete_selected(&mut canvas, &mut bridge).is_empty());
        assert!(canvas.contains(pending));
    }

    #[test]
    fn test_bring_element_updates_shared_order() {
        let mut canvas = Canvas::new();
        let mut bridge = SyncBridge::default();
        let a = shared_rect(&mut canvas, &mut bridge, 0.0);
        let b = shared_rect(&mut canvas, &mut bridge, 0.0);

        canvas.set_active(canvas.handle_of(a).unwrap());
        assert!(bring_element(&mut canvas, &mut bridge, Direction::Front));
        assert_eq!(bridge.document().z_order(), vec![b.to_string(), a.to_string()]);

        assert!(bring_element(&mut canvas, &mut bridge, Direction::Back));
        assert_eq!(bridge.document().z_order(), vec![a.to_string(), b.to_string()]);
    }

    #[test]
    fn test_bring_element_needs_single_selection() {
        let mut canvas = Canvas::new();
        let mut bridge = SyncBridge::default();
        assert!(!bring_element(&mut canvas, &mut bridge, Direction::Front));
        assert_eq!("back".parse::<Direction>(), Ok(Direction::Back));
        assert!("up".parse::<Direction>().is_err());
    }

    #[test]
    fn test_insert_image_scales_to_height() {
        let mut canvas = Canvas::new();
        let mut bridge = SyncBridge::default();
        let config = WhiteboardConfig::default();
        let source = ImageSource::new("https://example.com/cat.png", 800, 400);

        let id = insert_image(&mut canvas, &mut bridge, &config, &source).unwrap();
        let image = canvas.get(canvas.handle_of(id).unwrap()).unwrap();
        assert_eq!(image.kind(), ShapeKind::Image);
        assert!((image.scaled_height() - 200.0).abs() < 1e-9);
        assert!((image.scaled_width() - 400.0).abs() < 1e-9);

        let stored = bridge.document().get(&id.to_string()).unwrap();
        assert_eq!(stored["src"], "https://example.com/cat.png");
        assert!(insert_image(&mut canvas, &mut bridge, &config, &ImageSource::new("x", 0, 0)).is_none());
    }
}
