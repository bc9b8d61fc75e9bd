/// Editor page: toolbar, drawing surface and layer panel
use iced::widget::{button, canvas, column, container, horizontal_space, row, scrollable, stack, text, Image};
use iced::{Alignment, Color, Element, Font, Length};

use crate::editor::{BackgroundStatus, EditingSession};
use crate::surface::ShapeKind;
use crate::Message;

use super::canvas::SurfaceCanvas;

const LAYER_PANEL_WIDTH: f32 = 280.0;
const WARNING_COLOR: Color = Color {
    r: 0.95,
    g: 0.7,
    b: 0.2,
    a: 1.0,
};

pub fn view<'a>(session: &'a EditingSession, exporting: bool, status: &'a str) -> Element<'a, Message> {
    let header = row![
        text("Image Editor").size(28),
        text(session.image().description()).size(14),
        horizontal_space(),
        button(text("Close"))
            .on_press(Message::CloseEditor)
            .style(button::secondary)
            .padding(8),
    ]
    .spacing(16)
    .align_y(Alignment::Center);

    let mut content = column![header, toolbar(exporting)].spacing(16).padding(20);

    match session.background_status() {
        BackgroundStatus::Loading => {
            content = content.push(text("Loading image...").size(14));
        }
        BackgroundStatus::Failed(reason) => {
            content = content.push(
                text(format!("Could not load the image ({reason}). You can still draw on the blank canvas."))
                    .size(14)
                    .color(WARNING_COLOR),
            );
        }
        BackgroundStatus::Ready => {}
    }

    let body = row![surface(session), layer_panel(session)].spacing(20);
    content = content.push(scrollable(body).direction(scrollable::Direction::Both {
        vertical: scrollable::Scrollbar::default(),
        horizontal: scrollable::Scrollbar::default(),
    }));

    if !status.is_empty() {
        content = content.push(text(status).size(14));
    }

    container(content).width(Length::Fill).height(Length::Fill).into()
}

fn toolbar<'a>(exporting: bool) -> Element<'a, Message> {
    let mut tools = row![].spacing(8).align_y(Alignment::Center);

    for kind in ShapeKind::ALL {
        tools = tools.push(button(text(kind.label())).on_press(Message::AddShape(kind)).padding(8));
    }

    tools
        .push(button(text("Add Text")).on_press(Message::AddText).padding(8))
        .push(horizontal_space().width(Length::Fixed(24.0)))
        .push(
            button(text(if exporting { "Exporting..." } else { "Download" }))
                .on_press_maybe((!exporting).then_some(Message::Export))
                .style(button::success)
                .padding(8),
        )
        .into()
}

/// Rendered surface with the interaction layer stacked on top
fn surface(session: &EditingSession) -> Element<'_, Message> {
    let surface = session.surface();
    let width = Length::Fixed(surface.width() as f32);
    let height = Length::Fixed(surface.height() as f32);

    stack![
        Image::new(session.preview().clone()).width(width).height(height),
        canvas(SurfaceCanvas::new(surface)).width(width).height(height),
    ]
    .into()
}

fn layer_panel(session: &EditingSession) -> Element<'_, Message> {
    let layers = session.overlay_layers();
    let title = format!("Layers ({})", layers.len());

    let listing: Element<'_, Message> = if layers.is_empty() {
        text("No layers yet. Add a shape or text from the toolbar.").size(13).into()
    } else {
        scrollable(text(session.layers_json()).font(Font::MONOSPACE).size(12))
            .height(Length::Fixed(session.surface().height() as f32 - 40.0))
            .into()
    };

    container(column![text(title).size(18), listing].spacing(10))
        .width(Length::Fixed(LAYER_PANEL_WIDTH))
        .padding(12)
        .style(container::rounded_box)
        .into()
}
