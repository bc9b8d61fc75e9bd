/// User interface module
///
/// This module holds the views of the application:
/// - Search page and caption prompt (search_view.rs)
/// - Editor page with toolbar, surface and layer panel (editor_view.rs)
/// - Interaction layer over the rendered surface (canvas.rs)

pub mod canvas;
pub mod editor_view;
pub mod search_view;

use iced::widget::{center, container, mouse_area, opaque, stack};
use iced::{Color, Element};

/// Show `content` centred over a dimmed `base`; clicking the backdrop sends `on_blur`
pub fn modal<'a, Message>(
    base: impl Into<Element<'a, Message>>,
    content: impl Into<Element<'a, Message>>,
    on_blur: Message,
) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    stack![
        base.into(),
        opaque(
            mouse_area(center(opaque(content)).style(|_theme| container::Style {
                background: Some(
                    Color {
                        a: 0.75,
                        ..Color::BLACK
                    }
                    .into(),
                ),
                ..container::Style::default()
            }))
            .on_press(on_blur)
        )
    ]
    .into()
}
