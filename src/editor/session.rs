/// One editor instance for one selected image
///
/// The session owns its drawing surface exclusively. Dropping the session
/// releases the surface and every overlay on it; nothing carries over to the
/// next session.
///
/// Dragging can report pointer moves far faster than a full-surface render
/// is worth, so drag updates refresh the preview at most once per
/// `PREVIEW_INTERVAL`; releasing the button flushes any pending change.
use std::sync::Arc;
use std::time::{Duration, Instant};

use iced::widget::image::Handle;
use image::RgbaImage;
use tracing::{debug, info, warn};

use crate::error::EditorError;
use crate::state::data::SearchResultImage;
use crate::surface::{layer, OverlayLayer, Point, ShapeKind, Surface};

/// Minimum time between preview renders while dragging
pub const PREVIEW_INTERVAL: Duration = Duration::from_millis(33);

/// Token identifying a session; async results carry it back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundStatus {
    Loading,
    Ready,
    /// Load failed; the surface stays blank but fully usable
    Failed(String),
}

/// Pointer and keyboard input from the editor canvas, in surface coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// Button pressed: pick the object under the pointer
    Pressed(Point),
    /// Pointer moved while dragging the selection
    Dragged { dx: f64, dy: f64 },
    /// Button released after a press on the canvas
    Released,
    /// Uniform scale of the selection
    Scaled(f64),
    /// Rotation of the selection, in degrees
    Rotated(f64),
    /// Double activation: edit text in place
    DoubleClicked(Point),
    /// Text typed while editing
    Typed(String),
    Backspace,
    /// Leave text editing
    FinishEditing,
}

#[derive(Debug)]
pub struct EditingSession {
    id: SessionId,
    image: SearchResultImage,
    surface: Surface,
    background: BackgroundStatus,
    preview: Handle,
    last_redraw: Instant,
    /// The surface changed since the preview was last rendered
    stale: bool,
}

impl EditingSession {
    /// Start a session: blank surface plus the caption, if any.
    ///
    /// The background arrives later through `apply_background`.
    pub fn new(
        id: SessionId,
        image: SearchResultImage,
        caption: Option<String>,
        width: u32,
        height: u32,
    ) -> Self {
        let mut surface = Surface::new(width, height);
        if let Some(caption) = caption.as_deref() {
            surface.add_caption(caption);
        }

        info!("🎨 Editing session {} started for image {}", id.0, image.id);

        let preview = preview_handle(&surface);
        Self {
            id,
            image,
            surface,
            background: BackgroundStatus::Loading,
            preview,
            last_redraw: Instant::now(),
            stale: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn image(&self) -> &SearchResultImage {
        &self.image
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn background_status(&self) -> &BackgroundStatus {
        &self.background
    }

    /// Rendered surface for display
    pub fn preview(&self) -> &Handle {
        &self.preview
    }

    /// Apply the result of a background load; the pixels are already fitted to the surface.
    ///
    /// Results addressed to another session are discarded and `false` is returned.
    pub fn apply_background(
        &mut self,
        origin: SessionId,
        result: Result<Arc<RgbaImage>, EditorError>,
    ) -> bool {
        if origin != self.id {
            debug!(
                "Dropping background for session {} (active session {})",
                origin.0, self.id.0
            );
            return false;
        }

        match result {
            Ok(pixels) => {
                let pixels = Arc::try_unwrap(pixels).unwrap_or_else(|shared| (*shared).clone());
                self.surface.set_background(pixels);
                self.background = BackgroundStatus::Ready;
            }
            Err(e) => {
                warn!("⚠️  Background image failed to load: {}", e);
                self.background = BackgroundStatus::Failed(e.to_string());
            }
        }
        self.redraw();
        true
    }

    pub fn add_shape(&mut self, kind: ShapeKind) {
        self.surface.add_shape(kind);
        self.redraw();
    }

    pub fn add_text(&mut self) {
        self.surface.add_text();
        self.redraw();
    }

    /// Apply canvas input; returns whether the surface changed
    pub fn handle(&mut self, event: SurfaceEvent) -> bool {
        self.handle_at(event, Instant::now())
    }

    /// `handle` with an explicit clock for the drag throttle
    pub fn handle_at(&mut self, event: SurfaceEvent, now: Instant) -> bool {
        let throttled = matches!(event, SurfaceEvent::Dragged { .. });
        let changed = match event {
            SurfaceEvent::Pressed(p) => {
                let before = (self.surface.active(), self.surface.editing());
                self.surface.select_at(p);
                before != (self.surface.active(), self.surface.editing())
            }
            SurfaceEvent::Dragged { dx, dy } => self.surface.move_active(dx, dy),
            SurfaceEvent::Released => {
                if self.stale {
                    self.redraw_at(now);
                }
                false
            }
            SurfaceEvent::Scaled(factor) => self.surface.scale_active(factor),
            SurfaceEvent::Rotated(degrees) => self.surface.rotate_active(degrees),
            SurfaceEvent::DoubleClicked(p) => self.surface.begin_editing_at(p),
            SurfaceEvent::Typed(text) => self.surface.insert_text(&text),
            SurfaceEvent::Backspace => self.surface.backspace(),
            SurfaceEvent::FinishEditing => {
                let was_editing = self.surface.editing().is_some();
                self.surface.end_editing();
                was_editing
            }
        };

        if changed {
            if throttled && now.duration_since(self.last_redraw) < PREVIEW_INTERVAL {
                self.stale = true;
            } else {
                self.redraw_at(now);
            }
        }
        changed
    }

    pub fn overlay_layers(&self) -> Vec<OverlayLayer> {
        self.surface.overlay_layers()
    }

    pub fn layers_json(&self) -> String {
        layer::to_pretty_json(&self.overlay_layers())
    }

    /// Pixels exactly as currently rendered, for export
    pub fn render(&self) -> RgbaImage {
        self.surface.render()
    }

    fn redraw(&mut self) {
        self.redraw_at(Instant::now());
    }

    fn redraw_at(&mut self, now: Instant) {
        self.preview = preview_handle(&self.surface);
        self.last_redraw = now;
        self.stale = false;
    }
}

impl Drop for EditingSession {
    fn drop(&mut self) {
        info!(
            "🧹 Session {} closed, released {}x{} surface with {} objects",
            self.id.0,
            self.surface.width(),
            self.surface.height(),
            self.surface.objects().len()
        );
    }
}

fn preview_handle(surface: &Surface) -> Handle {
    let pixels = surface.render();
    Handle::from_rgba(pixels.width(), pixels.height(), pixels.into_raw())
}
