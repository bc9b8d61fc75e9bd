/// Retained-mode drawing surface
///
/// A surface holds:
/// - A locked background image, always drawn first and never pickable
/// - An ordered list of objects (caption and overlays), drawn in add order
/// - The active selection and the text object being edited, if any
///
/// Submodules:
/// - `object.rs` - Objects, geometry and placement
/// - `text.rs` - Glyph layout into outline paths
/// - `layer.rs` - Overlay layer records derived from the objects
/// - `raster.rs` - Compositing to pixels and PNG encoding

pub mod layer;
pub mod object;
pub mod raster;
pub mod text;

use image::{imageops, imageops::FilterType, RgbaImage};
use kurbo::Vec2;
use tracing::debug;

pub use kurbo::Point;
pub use layer::OverlayLayer;
pub use object::{Color, Geometry, ObjectId, Placement, Role, ShapeKind, SurfaceObject};
pub use text::TextBlock;

/// Default fill of an empty surface (#f0f0f0)
pub const BACKGROUND_COLOR: Color = Color::rgb(0xf0, 0xf0, 0xf0);

/// Placeholder of newly added text
pub const DEFAULT_TEXT: &str = "Double-click to edit";

const OVERLAY_LEFT: f64 = 150.0;
const OVERLAY_TOP: f64 = 150.0;
const TEXT_LEFT: f64 = 200.0;
const TEXT_TOP: f64 = 200.0;
const TEXT_FONT_SIZE: f64 = 24.0;
const CAPTION_FONT_SIZE: f64 = 20.0;
/// Distance from the caption's top edge to the bottom of the surface
const CAPTION_BOTTOM_OFFSET: f64 = 50.0;

const HEXAGON: [Point; 6] = [
    Point::new(0.0, 50.0),
    Point::new(25.0, 0.0),
    Point::new(75.0, 0.0),
    Point::new(100.0, 50.0),
    Point::new(75.0, 100.0),
    Point::new(25.0, 100.0),
];

/// Scale an image to `width`, keeping its aspect ratio, and crop whatever
/// falls below `height`.
///
/// Source rows that would land below the surface are dropped before
/// resampling, so very tall images never produce an oversized buffer.
pub fn fit_background(source: &RgbaImage, width: u32, height: u32) -> Option<RgbaImage> {
    let (src_w, src_h) = source.dimensions();
    if src_w == 0 || src_h == 0 || width == 0 || height == 0 {
        return None;
    }

    let scale = width as f64 / src_w as f64;
    let rows = ((height as f64 / scale).ceil() as u32).clamp(1, src_h);
    let scaled_h = ((rows as f64 * scale).round() as u32).max(1);

    let visible = imageops::crop_imm(source, 0, 0, src_w, rows).to_image();
    let mut fitted = imageops::resize(&visible, width, scaled_h, FilterType::Lanczos3);
    if scaled_h > height {
        fitted = imageops::crop_imm(&fitted, 0, 0, width, height).to_image();
    }

    debug!(
        "Background {}x{} scaled by {:.3}, {} rows kept, fitted to {}x{}",
        src_w,
        src_h,
        scale,
        rows,
        fitted.width(),
        fitted.height()
    );
    Some(fitted)
}

#[derive(Debug)]
pub struct Surface {
    width: u32,
    height: u32,
    background_color: Color,
    /// Already fitted to the surface width
    background: Option<RgbaImage>,
    objects: Vec<SurfaceObject>,
    active: Option<ObjectId>,
    editing: Option<ObjectId>,
    next_id: u64,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background_color: BACKGROUND_COLOR,
            background: None,
            objects: Vec::new(),
            active: None,
            editing: None,
            next_id: 1,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background_color(&self) -> Color {
        self.background_color
    }

    pub fn background(&self) -> Option<&RgbaImage> {
        self.background.as_ref()
    }

    /// All objects, bottom to top
    pub fn objects(&self) -> &[SurfaceObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&SurfaceObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn active(&self) -> Option<ObjectId> {
        self.active
    }

    pub fn active_object(&self) -> Option<&SurfaceObject> {
        self.active.and_then(|id| self.object(id))
    }

    pub fn editing(&self) -> Option<ObjectId> {
        self.editing
    }

    /// Install a background produced by `fit_background`, replacing any previous one
    pub fn set_background(&mut self, image: RgbaImage) {
        debug!("Background set ({}x{})", image.width(), image.height());
        self.background = Some(image);
    }

    fn push(&mut self, role: Role, geometry: Geometry, fill: Color, placement: Placement) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.push(SurfaceObject {
            id,
            role,
            geometry,
            fill,
            placement,
        });
        id
    }

    /// Add the caption as a horizontally centred text line near the bottom
    pub fn add_caption(&mut self, caption: &str) -> ObjectId {
        let left = self.width as f64 / 2.0;
        let top = self.height as f64 - CAPTION_BOTTOM_OFFSET;
        self.push(
            Role::Caption,
            Geometry::Text {
                block: TextBlock::new(caption, CAPTION_FONT_SIZE),
                editable: false,
            },
            Color::BLACK,
            Placement::centered_at(left, top),
        )
    }

    /// Add one of the built-in shapes with its default size, fill and position,
    /// and select it
    pub fn add_shape(&mut self, kind: ShapeKind) -> ObjectId {
        let (geometry, fill) = match kind {
            ShapeKind::Circle => (Geometry::Circle { radius: 50.0 }, Color::rgb(0xff, 0, 0)),
            ShapeKind::Rectangle => (
                Geometry::Rectangle {
                    width: 100.0,
                    height: 100.0,
                },
                Color::rgb(0, 0xff, 0),
            ),
            ShapeKind::Triangle => (
                Geometry::Triangle {
                    width: 100.0,
                    height: 100.0,
                },
                Color::rgb(0, 0, 0xff),
            ),
            ShapeKind::Polygon => (Geometry::polygon(&HEXAGON), Color::rgb(0xff, 0xff, 0)),
        };

        let id = self.push(
            Role::Overlay,
            geometry,
            fill,
            Placement::at(OVERLAY_LEFT, OVERLAY_TOP),
        );
        self.select(id);
        id
    }

    /// Add an editable text object with the placeholder text, and select it
    pub fn add_text(&mut self) -> ObjectId {
        let id = self.push(
            Role::Overlay,
            Geometry::Text {
                block: TextBlock::new(DEFAULT_TEXT, TEXT_FONT_SIZE),
                editable: true,
            },
            Color::BLACK,
            Placement::at(TEXT_LEFT, TEXT_TOP),
        );
        self.select(id);
        id
    }

    fn select(&mut self, id: ObjectId) {
        if self.editing.is_some_and(|editing| editing != id) {
            self.end_editing();
        }
        self.active = Some(id);
    }

    /// Topmost object whose box contains the point. The background is never a candidate.
    pub fn object_at(&self, p: Point) -> Option<ObjectId> {
        self.objects.iter().rev().find(|o| o.hit(p)).map(|o| o.id)
    }

    /// Select the topmost object under the point, or clear the selection
    pub fn select_at(&mut self, p: Point) -> Option<ObjectId> {
        match self.object_at(p) {
            Some(id) => {
                self.select(id);
                Some(id)
            }
            None => {
                self.clear_selection();
                None
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.end_editing();
        self.active = None;
    }

    fn active_mut(&mut self) -> Option<&mut SurfaceObject> {
        let id = self.active?;
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn move_active(&mut self, dx: f64, dy: f64) -> bool {
        self.active_mut()
            .map(|o| o.translate(Vec2::new(dx, dy)))
            .is_some()
    }

    pub fn scale_active(&mut self, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        self.active_mut().map(|o| o.scale_by(factor)).is_some()
    }

    pub fn rotate_active(&mut self, degrees: f64) -> bool {
        self.active_mut().map(|o| o.rotate_by(degrees)).is_some()
    }

    /// Enter in-place editing if the topmost object under the point is editable text
    pub fn begin_editing_at(&mut self, p: Point) -> bool {
        let Some(id) = self.object_at(p) else {
            return false;
        };
        if !self.object(id).is_some_and(SurfaceObject::is_editable_text) {
            return false;
        }
        self.select(id);
        self.editing = Some(id);
        true
    }

    fn editing_block(&mut self) -> Option<&mut TextBlock> {
        let id = self.editing?;
        match self.objects.iter_mut().find(|o| o.id == id) {
            Some(SurfaceObject {
                geometry: Geometry::Text { block, .. },
                ..
            }) => Some(block),
            _ => None,
        }
    }

    /// Append typed text to the object being edited
    pub fn insert_text(&mut self, typed: &str) -> bool {
        let typed: String = typed.chars().filter(|c| !c.is_control()).collect();
        if typed.is_empty() {
            return false;
        }
        match self.editing_block() {
            Some(block) => {
                block.push_str(&typed);
                true
            }
            None => false,
        }
    }

    /// Remove the last character of the object being edited
    pub fn backspace(&mut self) -> bool {
        self.editing_block().and_then(TextBlock::pop).is_some()
    }

    pub fn end_editing(&mut self) {
        self.editing = None;
    }

    /// Overlay layer records, in add order, reflecting current positions
    pub fn overlay_layers(&self) -> Vec<OverlayLayer> {
        self.objects.iter().filter_map(OverlayLayer::from_object).collect()
    }

    pub fn render(&self) -> RgbaImage {
        raster::render(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use raster::encode_png;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const GREY: Rgba<u8> = Rgba([0xf0, 0xf0, 0xf0, 255]);

    fn blue_image(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, BLUE)
    }

    fn fitted(w: u32, h: u32) -> RgbaImage {
        fit_background(&blue_image(w, h), 800, 600).unwrap()
    }

    fn png(surface: &Surface) -> Vec<u8> {
        encode_png(&surface.render()).unwrap()
    }

    #[test]
    fn test_new_surface_is_empty() {
        let surface = Surface::new(800, 600);
        assert!(surface.objects().is_empty());
        assert!(surface.overlay_layers().is_empty());
        assert!(surface.background().is_none());

        let pixels = surface.render();
        assert_eq!(pixels.dimensions(), (800, 600));
        assert_eq!(pixels.get_pixel(0, 0), &GREY);
    }

    #[test]
    fn test_each_add_appends_one_layer_and_selects_it() {
        let mut surface = Surface::new(800, 600);
        for (i, kind) in ShapeKind::ALL.into_iter().enumerate() {
            let id = surface.add_shape(kind);
            assert_eq!(surface.overlay_layers().len(), i + 1);
            assert_eq!(surface.active(), Some(id));
        }

        let id = surface.add_text();
        let layers = surface.overlay_layers();
        assert_eq!(layers.len(), 5);
        assert_eq!(surface.active(), Some(id));
        assert!(matches!(
            &layers[4],
            OverlayLayer::Text { text, .. } if text == DEFAULT_TEXT
        ));
        assert!(matches!(
            &layers[0],
            OverlayLayer::Shape { shape: ShapeKind::Circle, .. }
        ));
    }

    #[test]
    fn test_repeated_adds_stack_identical_objects() {
        let mut surface = Surface::new(800, 600);
        let a = surface.add_shape(ShapeKind::Rectangle);
        let b = surface.add_shape(ShapeKind::Rectangle);
        assert_ne!(a, b);
        assert_eq!(surface.objects().len(), 2);
        assert_eq!(surface.object(a).unwrap().position(), surface.object(b).unwrap().position());
    }

    #[test]
    fn test_caption_is_centered_near_bottom_and_not_a_layer() {
        let mut surface = Surface::new(800, 600);
        surface.add_caption("Hello");

        let caption = &surface.objects()[0];
        assert_eq!(caption.role, Role::Caption);
        match &caption.geometry {
            Geometry::Text { block, editable } => {
                assert!(!editable);
                assert_eq!(block.content(), "Hello");
            }
            other => panic!("unexpected geometry {other:?}"),
        }
        assert_eq!(caption.center().x, 400.0);
        assert_eq!(caption.position().y, 550.0);
        assert!(surface.overlay_layers().is_empty());
        assert!(surface.active().is_none());
    }

    #[test]
    fn test_fit_scales_to_width() {
        let image = fitted(400, 300);
        assert_eq!(image.dimensions(), (800, 600));

        let mut surface = Surface::new(800, 600);
        surface.set_background(image);
        assert_eq!(surface.render().get_pixel(10, 10), &BLUE);
    }

    #[test]
    fn test_fit_crops_tall_images() {
        let image = fitted(100, 200);
        assert_eq!(image.dimensions(), (800, 600));

        let mut surface = Surface::new(800, 600);
        surface.set_background(image);
        assert_eq!(surface.render().get_pixel(799, 599), &BLUE);
    }

    #[test]
    fn test_fit_bounds_extreme_aspect_ratios() {
        // A 1:1000 strip would be 800x800000 if scaled before cropping
        assert_eq!(fitted(10, 10_000).dimensions(), (800, 600));
        assert_eq!(fitted(1, 1).dimensions(), (800, 600));
        assert_eq!(fitted(10_000, 10).dimensions(), (800, 1));
        assert!(fit_background(&RgbaImage::new(0, 10), 800, 600).is_none());
    }

    #[test]
    fn test_wide_background_leaves_surface_color_below() {
        let mut surface = Surface::new(800, 600);
        surface.set_background(fitted(1600, 400));
        let pixels = surface.render();
        assert_eq!(pixels.get_pixel(10, 10), &BLUE);
        assert_eq!(pixels.get_pixel(10, 590), &GREY);
    }

    #[test]
    fn test_background_is_never_picked() {
        let mut surface = Surface::new(800, 600);
        surface.set_background(fitted(800, 600));
        assert_eq!(surface.select_at(Point::new(10.0, 10.0)), None);
        assert!(surface.active().is_none());
    }

    #[test]
    fn test_objects_render_above_background() {
        let mut surface = Surface::new(800, 600);
        surface.add_shape(ShapeKind::Circle);
        // Background arriving after the overlay still renders beneath it
        surface.set_background(fitted(800, 600));

        let pixels = surface.render();
        assert_eq!(pixels.get_pixel(200, 200), &RED);
        assert_eq!(pixels.get_pixel(10, 10), &BLUE);
    }

    #[test]
    fn test_circle_edges_are_antialiased() {
        let mut surface = Surface::new(800, 600);
        surface.add_shape(ShapeKind::Circle);
        let pixels = surface.render();

        // The circle's outline crosses pixel (164, 164) on the diagonal
        let edge = pixels.get_pixel(164, 164);
        assert!(edge[1] > 0 && edge[1] < 0xf0, "edge pixel {edge:?}");
        assert_eq!(pixels.get_pixel(168, 168), &RED);
        assert_eq!(pixels.get_pixel(160, 160), &GREY);
    }

    #[test]
    fn test_text_glyphs_are_filled() {
        let mut surface = Surface::new(800, 600);
        let id = surface.add_text();
        let size = surface.object(id).unwrap().scaled_size();
        let pixels = surface.render();

        let inked = (200..200 + size.width as u32)
            .flat_map(|x| (200..224).map(move |y| (x, y)))
            .filter(|&(x, y)| pixels.get_pixel(x, y)[0] < 0x80)
            .count();
        assert!(inked > 50, "only {inked} dark pixels");
        assert_eq!(pixels.get_pixel(195, 210), &GREY);
    }

    #[test]
    fn test_rotated_shape_renders_rotated() {
        let mut surface = Surface::new(800, 600);
        surface.add_shape(ShapeKind::Rectangle);
        assert_eq!(surface.render().get_pixel(153, 153), &Rgba([0, 0xff, 0, 255]));

        surface.rotate_active(45.0);
        let pixels = surface.render();
        assert_eq!(pixels.get_pixel(153, 153), &GREY);
        // The rotated square reaches beyond its original right edge
        assert_eq!(pixels.get_pixel(265, 200), &Rgba([0, 0xff, 0, 255]));
    }

    #[test]
    fn test_select_topmost_and_drag() {
        let mut surface = Surface::new(800, 600);
        let circle = surface.add_shape(ShapeKind::Circle);
        let rect = surface.add_shape(ShapeKind::Rectangle);

        assert_eq!(surface.select_at(Point::new(200.0, 200.0)), Some(rect));
        assert!(surface.move_active(300.0, 0.0));
        assert_eq!(surface.select_at(Point::new(200.0, 200.0)), Some(circle));

        assert_eq!(surface.select_at(Point::new(700.0, 20.0)), None);
        assert!(!surface.move_active(1.0, 1.0));
    }

    #[test]
    fn test_drag_changes_export() {
        let mut surface = Surface::new(800, 600);
        surface.add_shape(ShapeKind::Circle);
        let before = png(&surface);

        surface.move_active(100.0, 50.0);
        assert_ne!(before, png(&surface));

        let pixels = surface.render();
        assert_eq!(pixels.get_pixel(300, 250), &RED);
        assert_eq!(pixels.get_pixel(200, 200), &GREY);
    }

    #[test]
    fn test_layer_records_follow_placement() {
        let mut surface = Surface::new(800, 600);
        surface.add_shape(ShapeKind::Rectangle);
        surface.move_active(10.0, 20.0);
        surface.scale_active(2.0);

        match &surface.overlay_layers()[0] {
            OverlayLayer::Shape { position, size, color, .. } => {
                assert_eq!(*position, Point::new(110.0, 120.0));
                assert_eq!(size.width, 200.0);
                assert_eq!(color, "#00ff00");
            }
            other => panic!("unexpected layer {other:?}"),
        }
    }

    #[test]
    fn test_in_place_text_editing() {
        let mut surface = Surface::new(800, 600);
        let text = surface.add_text();

        // Not editing yet: typing does nothing
        assert!(!surface.insert_text("x"));

        assert!(surface.begin_editing_at(Point::new(205.0, 210.0)));
        assert_eq!(surface.editing(), Some(text));

        for _ in 0..DEFAULT_TEXT.chars().count() {
            assert!(surface.backspace());
        }
        assert!(!surface.backspace());
        assert!(surface.insert_text("Hi\n"));
        surface.end_editing();

        assert!(matches!(
            &surface.overlay_layers()[0],
            OverlayLayer::Text { text, .. } if text == "Hi"
        ));
    }

    #[test]
    fn test_shapes_and_caption_are_not_editable() {
        let mut surface = Surface::new(800, 600);
        surface.add_caption("Hello");
        surface.add_shape(ShapeKind::Circle);

        assert!(!surface.begin_editing_at(Point::new(200.0, 200.0)));
        assert!(!surface.begin_editing_at(Point::new(400.0, 560.0)));
        assert!(surface.editing().is_none());
    }

    #[test]
    fn test_selecting_elsewhere_ends_editing() {
        let mut surface = Surface::new(800, 600);
        surface.add_shape(ShapeKind::Circle);
        surface.add_text();
        surface.begin_editing_at(Point::new(205.0, 210.0));

        surface.select_at(Point::new(155.0, 195.0));
        assert!(surface.editing().is_none());
    }

    #[test]
    fn test_export_is_deterministic_and_sized() {
        let mut surface = Surface::new(800, 600);
        surface.add_caption("Hello");
        surface.add_shape(ShapeKind::Circle);
        surface.add_text();

        let first = png(&surface);
        assert_eq!(first, png(&surface));

        let decoded = image::load_from_memory(&first).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (800, 600));
        assert_eq!(decoded.to_rgba8().get_pixel(180, 180), &RED);
    }

    #[test]
    fn test_export_ignores_selection() {
        let mut surface = Surface::new(800, 600);
        surface.add_shape(ShapeKind::Triangle);
        let selected = png(&surface);
        surface.clear_selection();
        assert_eq!(selected, png(&surface));
    }

    #[test]
    fn test_rotation_and_scale_guards() {
        let mut surface = Surface::new(800, 600);
        assert!(!surface.rotate_active(15.0));

        surface.add_shape(ShapeKind::Polygon);
        assert!(surface.rotate_active(15.0));
        assert!(!surface.scale_active(0.0));
        assert!(!surface.scale_active(f64::NAN));
        assert_eq!(surface.active_object().unwrap().placement.angle, 15.0);
    }
}
