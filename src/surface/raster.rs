/// Rasterization of a surface into pixels, and PNG encoding
///
/// The background colour and image are composited with `image`; object
/// outlines are filled with anti-aliasing by `tiny-skia`. Rendering is fully
/// deterministic: the same surface state always produces the same pixels and
/// the same PNG bytes.
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{imageops, ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use kurbo::{Affine, BezPath, PathEl};
use tiny_skia::{FillRule, IntSize, Paint, PathBuilder, Pixmap, Transform};
use tracing::warn;

use super::object::SurfaceObject;
use super::Surface;
use crate::error::EditorError;

/// Composite background colour, background image and all objects in z-order
pub fn render(surface: &Surface) -> RgbaImage {
    let (width, height) = (surface.width(), surface.height());
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba(surface.background_color().0));

    if let Some(background) = surface.background() {
        imageops::overlay(&mut canvas, background, 0, 0);
    }

    // Every pixel is opaque here, so straight and premultiplied RGBA coincide
    let Some(mut pixmap) =
        IntSize::from_wh(width, height).and_then(|size| Pixmap::from_vec(canvas.into_raw(), size))
    else {
        warn!("⚠️  Cannot rasterize a {}x{} surface", width, height);
        return RgbaImage::new(width, height);
    };

    for object in surface.objects() {
        fill_object(&mut pixmap, object);
    }

    let mut pixels = RgbaImage::new(width, height);
    for (dst, src) in pixels.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    pixels
}

fn fill_object(pixmap: &mut Pixmap, object: &SurfaceObject) {
    let Some(path) = to_skia_path(&object.geometry.path()) else {
        // Nothing to draw, e.g. text made only of spaces
        return;
    };

    let [r, g, b, a] = object.fill.0;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;

    pixmap.fill_path(&path, &paint, FillRule::Winding, to_skia_transform(object.affine()), None);
}

fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => builder.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => builder.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

fn to_skia_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs().map(|v| v as f32);
    Transform::from_row(a, b, c, d, e, f)
}

/// Encode pixels as a lossless PNG at the highest compression setting
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, EditorError> {
    let mut bytes = Vec::new();
    PngEncoder::new_with_quality(&mut bytes, CompressionType::Best, PngFilter::Adaptive)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )?;
    Ok(bytes)
}
