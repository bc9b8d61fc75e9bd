use std::time::{Duration, Instant};

use iced::keyboard::{self, key};
use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Path, Program, Stroke};
use iced::{Color, Point, Rectangle, Renderer, Theme};

use crate::editor::SurfaceEvent;
use crate::surface::{self, Geometry, Surface};
use crate::Message;

/// Two presses closer than this count as a double click
const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);
/// ...if they are also within this many pixels of each other
const DOUBLE_CLICK_SLOP: f32 = 4.0;
/// Degrees per wheel line when rotating
const ROTATE_STEP: f64 = 15.0;

const SELECTION_COLOR: Color = Color {
    r: 0.15,
    g: 0.45,
    b: 0.95,
    a: 1.0,
};
const EDITING_COLOR: Color = Color {
    r: 0.95,
    g: 0.55,
    b: 0.1,
    a: 1.0,
};

/// Interaction layer drawn on top of the rendered surface.
///
/// It draws selection outlines and turns pointer/keyboard input into
/// `SurfaceEvent`s. The pixels themselves come from the surface rasterizer,
/// so what is on screen is exactly what gets exported.
pub struct SurfaceCanvas<'a> {
    surface: &'a Surface,
}

impl<'a> SurfaceCanvas<'a> {
    pub fn new(surface: &'a Surface) -> Self {
        Self { surface }
    }
}

impl<'a> Program<Message> for SurfaceCanvas<'a> {
    type State = PointerState;

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        if let Some(object) = self.surface.active_object() {
            let editing = self.surface.editing() == Some(object.id);
            let color = if editing { EDITING_COLOR } else { SELECTION_COLOR };

            let corners = object.corners().map(to_iced);
            let outline = Path::new(|builder| {
                builder.move_to(corners[0]);
                for corner in &corners[1..] {
                    builder.line_to(*corner);
                }
                builder.close();
            });
            frame.stroke(&outline, Stroke::default().with_color(color).with_width(1.5));

            // Corner handles
            for corner in corners {
                frame.fill(&Path::circle(corner, 4.0), color);
            }

            // Caret after the last character while editing
            if let (true, Geometry::Text { block, .. }) = (editing, &object.geometry) {
                let height = block.size().height;
                let x = block.advance();
                let affine = object.affine();
                let caret = Path::line(
                    to_iced(affine * surface::Point::new(x, 0.0)),
                    to_iced(affine * surface::Point::new(x, height)),
                );
                frame.stroke(&caret, Stroke::default().with_color(EDITING_COLOR).with_width(2.0));
            }
        }

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        match event {
            // Mouse button press - pick, or edit text on double click
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let Some(pos) = cursor.position_in(bounds) else {
                    return (canvas::event::Status::Ignored, None);
                };
                let point = to_surface(pos);
                let now = Instant::now();

                let double = state.last_click.is_some_and(|(at, last)| {
                    now.duration_since(at) <= DOUBLE_CLICK_WINDOW
                        && last.distance(pos) <= DOUBLE_CLICK_SLOP
                });

                if double {
                    state.last_click = None;
                    state.is_dragging = false;
                    return (
                        canvas::event::Status::Captured,
                        Some(Message::Surface(SurfaceEvent::DoubleClicked(point))),
                    );
                }

                state.last_click = Some((now, pos));
                state.is_dragging = true;
                state.last_position = cursor.position();
                return (
                    canvas::event::Status::Captured,
                    Some(Message::Surface(SurfaceEvent::Pressed(point))),
                );
            }

            // Mouse button release - stop dragging
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                if state.is_dragging {
                    state.is_dragging = false;
                    state.last_position = None;
                    return (
                        canvas::event::Status::Captured,
                        Some(Message::Surface(SurfaceEvent::Released)),
                    );
                }
            }

            // Mouse move - drag the selection
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if state.is_dragging {
                    if let (Some(current), Some(last)) = (cursor.position(), state.last_position) {
                        state.last_position = Some(current);
                        let event = SurfaceEvent::Dragged {
                            dx: f64::from(current.x - last.x),
                            dy: f64::from(current.y - last.y),
                        };
                        return (canvas::event::Status::Captured, Some(Message::Surface(event)));
                    }
                }
            }

            // Mouse wheel - scale, or rotate with shift held
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                if !cursor.is_over(bounds) || self.surface.active().is_none() {
                    return (canvas::event::Status::Ignored, None);
                }
                let lines = f64::from(match delta {
                    mouse::ScrollDelta::Lines { y, .. } => y,
                    mouse::ScrollDelta::Pixels { y, .. } => y * 0.1,
                });
                let event = if state.modifiers.shift() {
                    SurfaceEvent::Rotated(lines * ROTATE_STEP)
                } else {
                    SurfaceEvent::Scaled((1.0 + lines * 0.1).clamp(0.5, 1.5))
                };
                return (canvas::event::Status::Captured, Some(Message::Surface(event)));
            }

            canvas::Event::Keyboard(keyboard::Event::ModifiersChanged(modifiers)) => {
                state.modifiers = modifiers;
            }

            // Typing while a text object is in edit mode
            canvas::Event::Keyboard(keyboard::Event::KeyPressed { key, text, .. }) => {
                if self.surface.editing().is_none() {
                    return (canvas::event::Status::Ignored, None);
                }
                let event = match key {
                    keyboard::Key::Named(key::Named::Backspace) => Some(SurfaceEvent::Backspace),
                    keyboard::Key::Named(key::Named::Enter | key::Named::Escape) => {
                        Some(SurfaceEvent::FinishEditing)
                    }
                    _ => text.map(|t| SurfaceEvent::Typed(t.to_string())),
                };
                if let Some(event) = event {
                    return (canvas::event::Status::Captured, Some(Message::Surface(event)));
                }
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if state.is_dragging && self.surface.active().is_some() {
            return mouse::Interaction::Grabbing;
        }
        match cursor.position_in(bounds) {
            Some(pos) if self.surface.object_at(to_surface(pos)).is_some() => {
                mouse::Interaction::Grab
            }
            _ => mouse::Interaction::default(),
        }
    }
}

/// State for pointer interactions
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    pub is_dragging: bool,
    pub last_position: Option<Point>,
    pub last_click: Option<(Instant, Point)>,
    pub modifiers: keyboard::Modifiers,
}

fn to_iced(p: surface::Point) -> Point {
    Point::new(p.x as f32, p.y as f32)
}

fn to_surface(p: Point) -> surface::Point {
    surface::Point::new(f64::from(p.x), f64::from(p.y))
}
