/// Text layout for surface text objects
///
/// A `TextBlock` holds a single line of text together with its glyph
/// outlines as one `kurbo::BezPath` in object-local pixels. The outlines are
/// rebuilt whenever the content changes and are filled like any other shape.
use std::sync::OnceLock;

use ab_glyph::{Font, FontRef, GlyphId, OutlineCurve, PxScale, ScaleFont};
use kurbo::{BezPath, Point, Size, Vec2};
use tracing::warn;

/// Width of an empty block, as a fraction of the font size
const EMPTY_WIDTH_EM: f64 = 0.5;

static FONT: OnceLock<Option<FontRef<'static>>> = OnceLock::new();

fn font() -> Option<&'static FontRef<'static>> {
    FONT.get_or_init(|| match FontRef::try_from_slice(epaint_default_fonts::UBUNTU_LIGHT) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!("⚠️  Embedded font failed to load ({}), text will not render", e);
            None
        }
    })
    .as_ref()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    content: String,
    font_size: f64,
    /// Pen advance of the laid-out line
    advance: f64,
    path: BezPath,
}

impl TextBlock {
    pub fn new(content: impl Into<String>, font_size: f64) -> Self {
        let mut block = Self {
            content: content.into(),
            font_size,
            advance: 0.0,
            path: BezPath::new(),
        };
        block.layout();
        block
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Width of the laid-out glyphs; zero for empty text
    pub fn advance(&self) -> f64 {
        self.advance
    }

    /// Glyph outlines, baseline at the font ascent
    pub fn path(&self) -> &BezPath {
        &self.path
    }

    pub fn push_str(&mut self, text: &str) {
        self.content.push_str(text);
        self.layout();
    }

    pub fn pop(&mut self) -> Option<char> {
        let popped = self.content.pop();
        if popped.is_some() {
            self.layout();
        }
        popped
    }

    /// Bounding box; empty text keeps a small width so it stays pickable
    pub fn size(&self) -> Size {
        Size::new(
            self.advance.max(self.font_size * EMPTY_WIDTH_EM),
            self.font_size,
        )
    }

    fn layout(&mut self) {
        self.advance = 0.0;
        self.path = BezPath::new();

        let Some(font) = font() else {
            return;
        };
        let scaled = font.as_scaled(PxScale::from(self.font_size as f32));
        let (sx, sy) = (scaled.h_scale_factor() as f64, scaled.v_scale_factor() as f64);
        let ascent = scaled.ascent() as f64;

        let mut caret = 0.0f64;
        let mut previous: Option<GlyphId> = None;
        for ch in self.content.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id) as f64;
            }

            if let Some(outline) = font.outline(id) {
                // Font units are y-up; flip onto the baseline
                let origin = Vec2::new(caret, ascent);
                let to_px = |p: ab_glyph::Point| {
                    Point::new(p.x as f64 * sx, -(p.y as f64) * sy) + origin
                };
                append_outline(&mut self.path, &outline.curves, to_px);
            }

            caret += scaled.h_advance(id) as f64;
            previous = Some(id);
        }
        self.advance = caret;
    }
}

/// Append glyph curves, starting a new contour wherever the curves break
fn append_outline(
    path: &mut BezPath,
    curves: &[OutlineCurve],
    to_px: impl Fn(ab_glyph::Point) -> Point,
) {
    let mut pen: Option<Point> = None;
    for curve in curves {
        let start = match curve {
            OutlineCurve::Line(p0, _) | OutlineCurve::Quad(p0, _, _) | OutlineCurve::Cubic(p0, _, _, _) => {
                to_px(*p0)
            }
        };
        if pen != Some(start) {
            if pen.is_some() {
                path.close_path();
            }
            path.move_to(start);
        }

        let end = match curve {
            OutlineCurve::Line(_, p1) => {
                let end = to_px(*p1);
                path.line_to(end);
                end
            }
            OutlineCurve::Quad(_, c, p2) => {
                let end = to_px(*p2);
                path.quad_to(to_px(*c), end);
                end
            }
            OutlineCurve::Cubic(_, c1, c2, p3) => {
                let end = to_px(*p3);
                path.curve_to(to_px(*c1), to_px(*c2), end);
                end
            }
        };
        pen = Some(end);
    }
    if pen.is_some() {
        path.close_path();
    }
}
