/// Objects held by the drawing surface and their placement
///
/// Geometry is expressed as `kurbo` shapes in object-local coordinates. An
/// object's `Placement` resolves to a `kurbo::Affine` that maps local space
/// onto the surface; hit testing and rasterization both go through it.
use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape, Size, Vec2};
use serde::Serialize;

use super::text::TextBlock;

/// Smallest and largest scale factor an object may be given
const MIN_SCALE: f64 = 0.1;
const MAX_SCALE: f64 = 10.0;

/// Flattening tolerance when turning curves into paths
const PATH_TOLERANCE: f64 = 0.1;

/// An sRGB color with straight alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const BLACK: Color = Color([0, 0, 0, 255]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color([r, g, b, 255])
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0[0], self.0[1], self.0[2])
    }
}

/// Built-in overlay shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Triangle,
    Polygon,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Circle,
        ShapeKind::Rectangle,
        ShapeKind::Triangle,
        ShapeKind::Polygon,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ShapeKind::Circle => "Circle",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Triangle => "Triangle",
            ShapeKind::Polygon => "Polygon",
        }
    }
}

/// What an object draws, in object-local coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Circle { radius: f64 },
    Rectangle { width: f64, height: f64 },
    /// Isosceles triangle with its apex at the top centre
    Triangle { width: f64, height: f64 },
    /// Closed polygon; points are shifted so the bounding box starts at (0, 0)
    Polygon { points: Vec<Point> },
    Text { block: TextBlock, editable: bool },
}

impl Geometry {
    /// Build a polygon, normalizing its points to the bounding box origin
    pub fn polygon(points: &[Point]) -> Self {
        let origin = points
            .iter()
            .fold(Vec2::new(f64::INFINITY, f64::INFINITY), |min, p| {
                Vec2::new(min.x.min(p.x), min.y.min(p.y))
            });
        Geometry::Polygon {
            points: points.iter().map(|p| *p - origin).collect(),
        }
    }

    /// Unscaled size of the bounding box
    pub fn size(&self) -> Size {
        match self {
            Geometry::Circle { radius } => Size::new(radius * 2.0, radius * 2.0),
            Geometry::Rectangle { width, height } | Geometry::Triangle { width, height } => {
                Size::new(*width, *height)
            }
            Geometry::Polygon { .. } => {
                let bounds = self.path().bounding_box();
                Size::new(bounds.x1, bounds.y1)
            }
            Geometry::Text { block, .. } => block.size(),
        }
    }

    /// Outline to fill, in local coordinates
    pub fn path(&self) -> BezPath {
        match self {
            Geometry::Circle { radius } => {
                Circle::new((*radius, *radius), *radius).to_path(PATH_TOLERANCE)
            }
            Geometry::Rectangle { width, height } => {
                Rect::new(0.0, 0.0, *width, *height).to_path(PATH_TOLERANCE)
            }
            Geometry::Triangle { width, height } => closed(&[
                Point::new(0.0, *height),
                Point::new(width / 2.0, 0.0),
                Point::new(*width, *height),
            ]),
            Geometry::Polygon { points } => closed(points),
            Geometry::Text { block, .. } => block.path().clone(),
        }
    }
}

fn closed(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = points.split_first() {
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}

/// Horizontal anchor of `left`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OriginX {
    #[default]
    Left,
    Center,
}

/// Where an object sits on the surface, in the terms the editor manipulates.
///
/// `SurfaceObject::affine` turns this into the local-to-surface matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// X of the anchor given by `origin_x`
    pub left: f64,
    /// Y of the top edge (before rotation)
    pub top: f64,
    pub origin_x: OriginX,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Clockwise rotation about the object centre, in degrees
    pub angle: f64,
}

impl Placement {
    pub fn at(left: f64, top: f64) -> Self {
        Self {
            left,
            top,
            origin_x: OriginX::Left,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
        }
    }

    pub fn centered_at(left: f64, top: f64) -> Self {
        Self {
            origin_x: OriginX::Center,
            ..Self::at(left, top)
        }
    }
}

/// Identifier of an object, unique within one surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

/// Why an object is on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Caption supplied when the image was picked
    Caption,
    /// Added from the editor toolbar
    Overlay,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceObject {
    pub id: ObjectId,
    pub role: Role,
    pub geometry: Geometry,
    pub fill: Color,
    pub placement: Placement,
}

impl SurfaceObject {
    /// Size after scaling, before rotation
    pub fn scaled_size(&self) -> Size {
        let size = self.geometry.size();
        Size::new(
            size.width * self.placement.scale_x,
            size.height * self.placement.scale_y,
        )
    }

    /// Top-left of the unrotated, scaled box
    pub fn position(&self) -> Point {
        let size = self.scaled_size();
        let left = match self.placement.origin_x {
            OriginX::Left => self.placement.left,
            OriginX::Center => self.placement.left - size.width / 2.0,
        };
        Point::new(left, self.placement.top)
    }

    pub fn center(&self) -> Point {
        self.position() + self.scaled_size().to_vec2() / 2.0
    }

    /// Local-to-surface matrix: scale and rotate about the box centre
    pub fn affine(&self) -> Affine {
        let local = self.geometry.size().to_vec2();
        Affine::translate(self.center().to_vec2())
            * Affine::rotate(self.placement.angle.to_radians())
            * Affine::scale_non_uniform(self.placement.scale_x, self.placement.scale_y)
            * Affine::translate(-local / 2.0)
    }

    /// Corners of the transformed box, clockwise from the top-left
    pub fn corners(&self) -> [Point; 4] {
        let size = self.geometry.size();
        let affine = self.affine();
        [
            Point::ZERO,
            Point::new(size.width, 0.0),
            Point::new(size.width, size.height),
            Point::new(0.0, size.height),
        ]
        .map(|corner| affine * corner)
    }

    /// Box hit test, as used for picking
    pub fn hit(&self, p: Point) -> bool {
        let local = self.affine().inverse() * p;
        Rect::from_origin_size(Point::ZERO, self.geometry.size()).contains(local)
    }

    pub fn is_editable_text(&self) -> bool {
        matches!(self.geometry, Geometry::Text { editable: true, .. })
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.placement.left += delta.x;
        self.placement.top += delta.y;
    }

    /// Scale uniformly about the centre
    pub fn scale_by(&mut self, factor: f64) {
        let center = self.center();
        let size = self.geometry.size();
        let p = &mut self.placement;
        p.scale_x = (p.scale_x * factor).clamp(MIN_SCALE, MAX_SCALE);
        p.scale_y = (p.scale_y * factor).clamp(MIN_SCALE, MAX_SCALE);

        let (w, h) = (size.width * p.scale_x, size.height * p.scale_y);
        p.top = center.y - h / 2.0;
        p.left = match p.origin_x {
            OriginX::Left => center.x - w / 2.0,
            OriginX::Center => center.x,
        };
    }

    pub fn rotate_by(&mut self, degrees: f64) {
        self.placement.angle = (self.placement.angle + degrees).rem_euclid(360.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(left: f64, top: f64) -> SurfaceObject {
        SurfaceObject {
            id: ObjectId(1),
            role: Role::Overlay,
            geometry: Geometry::Rectangle {
                width: 100.0,
                height: 100.0,
            },
            fill: Color::rgb(0, 255, 0),
            placement: Placement::at(left, top),
        }
    }

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-6
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(Color::rgb(0xf0, 0xf0, 0xf0).to_hex(), "#f0f0f0");
        assert_eq!(Color::rgb(255, 0, 0).to_hex(), "#ff0000");
    }

    #[test]
    fn test_affine_round_trip_with_rotation() {
        let mut obj = square(150.0, 150.0);
        obj.rotate_by(30.0);
        obj.scale_by(1.5);

        let p = Point::new(12.0, 80.0);
        let affine = obj.affine();
        assert!(close(affine.inverse() * (affine * p), p));
    }

    #[test]
    fn test_unrotated_affine_maps_box_onto_position() {
        let obj = square(150.0, 150.0);
        assert!(close(obj.affine() * Point::ZERO, Point::new(150.0, 150.0)));
        assert!(close(obj.affine() * Point::new(100.0, 100.0), Point::new(250.0, 250.0)));
    }

    #[test]
    fn test_centered_origin() {
        let mut obj = square(400.0, 550.0);
        obj.placement.origin_x = OriginX::Center;
        assert!(close(obj.position(), Point::new(350.0, 550.0)));
        assert!(close(obj.center(), Point::new(400.0, 600.0)));
    }

    #[test]
    fn test_scale_keeps_center() {
        let mut obj = square(150.0, 150.0);
        let before = obj.center();
        obj.scale_by(2.0);
        assert!(close(obj.center(), before));
        assert_eq!(obj.scaled_size().width, 200.0);

        obj.scale_by(1000.0);
        assert_eq!(obj.placement.scale_x, MAX_SCALE);
    }

    #[test]
    fn test_rotation_moves_corners() {
        let mut obj = square(0.0, 0.0);
        obj.rotate_by(90.0);
        // Top-left corner of a square rotated 90° clockwise lands top-right
        assert!(close(obj.corners()[0], Point::new(100.0, 0.0)));
        obj.rotate_by(-450.0);
        assert!(obj.placement.angle.abs() < 1e-9);
    }

    #[test]
    fn test_shape_paths() {
        let circle = Geometry::Circle { radius: 50.0 }.path();
        assert!(circle.contains(Point::new(50.0, 50.0)));
        assert!(!circle.contains(Point::new(2.0, 2.0)));

        let triangle = Geometry::Triangle {
            width: 100.0,
            height: 100.0,
        }
        .path();
        assert!(triangle.contains(Point::new(50.0, 90.0)));
        assert!(!triangle.contains(Point::new(5.0, 5.0)));

        let hexagon = Geometry::polygon(&[
            Point::new(10.0, 60.0),
            Point::new(35.0, 10.0),
            Point::new(85.0, 10.0),
            Point::new(110.0, 60.0),
            Point::new(85.0, 110.0),
            Point::new(35.0, 110.0),
        ]);
        assert_eq!(hexagon.size(), Size::new(100.0, 100.0));
        let path = hexagon.path();
        assert!(path.contains(Point::new(50.0, 50.0)));
        assert!(!path.contains(Point::new(2.0, 2.0)));
    }

    #[test]
    fn test_hit_uses_box() {
        let mut obj = square(150.0, 150.0);
        assert!(obj.hit(Point::new(150.0, 150.0)));
        assert!(obj.hit(Point::new(249.0, 249.0)));
        assert!(!obj.hit(Point::new(251.0, 200.0)));

        // A 45° turn pushes the corners outside the original box
        obj.rotate_by(45.0);
        assert!(!obj.hit(Point::new(152.0, 152.0)));
        assert!(obj.hit(Point::new(200.0, 135.0)));
    }
}
