/// Overlay layer records
///
/// A read-only description of every user-added object, derived from the
/// surface on demand. The surface stays the only source of truth.
use kurbo::{Point, Size};
use serde::Serialize;

use super::object::{Geometry, Role, ShapeKind, SurfaceObject};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OverlayLayer {
    Shape {
        shape: ShapeKind,
        position: Point,
        size: Size,
        color: String,
    },
    Text {
        text: String,
        position: Point,
        size: Size,
        color: String,
    },
}

impl OverlayLayer {
    /// Describe an overlay object; captions are not overlay layers
    pub fn from_object(object: &SurfaceObject) -> Option<Self> {
        if object.role != Role::Overlay {
            return None;
        }

        let position = object.position();
        let size = object.scaled_size();
        let color = object.fill.to_hex();

        let layer = match &object.geometry {
            Geometry::Text { block, .. } => OverlayLayer::Text {
                text: block.content().to_string(),
                position,
                size,
                color,
            },
            Geometry::Circle { .. } => shape(ShapeKind::Circle, position, size, color),
            Geometry::Rectangle { .. } => shape(ShapeKind::Rectangle, position, size, color),
            Geometry::Triangle { .. } => shape(ShapeKind::Triangle, position, size, color),
            Geometry::Polygon { .. } => shape(ShapeKind::Polygon, position, size, color),
        };
        Some(layer)
    }
}

fn shape(shape: ShapeKind, position: Point, size: Size, color: String) -> OverlayLayer {
    OverlayLayer::Shape {
        shape,
        position,
        size,
        color,
    }
}

/// Pretty JSON listing of layers for the editor's layer panel
pub fn to_pretty_json(layers: &[OverlayLayer]) -> String {
    serde_json::to_string_pretty(layers).unwrap_or_else(|e| format!("<{e}>"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;

    #[test]
    fn test_json_lists_overlays_only() {
        let mut surface = Surface::new(800, 600);
        surface.add_caption("Hello");
        surface.add_shape(ShapeKind::Circle);

        let json: serde_json::Value =
            serde_json::from_str(&to_pretty_json(&surface.overlay_layers())).unwrap();
        let layers = json.as_array().unwrap();
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0]["type"], "shape");
        assert_eq!(layers[0]["shape"], "circle");
        assert_eq!(layers[0]["position"]["x"], 150.0);
        assert_eq!(layers[0]["size"]["width"], 100.0);
        assert_eq!(layers[0]["color"], "#ff0000");
    }
}
