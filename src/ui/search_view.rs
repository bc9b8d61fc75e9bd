/// Search page: query form, result grid and caption prompt
use iced::widget::image::Handle;
use iced::widget::{button, column, container, row, scrollable, text, text_input, Image};
use iced::{Alignment, Color, ContentFit, Element, Length};

use crate::state::search::{PendingSelection, SearchPanel};
use crate::Message;

const CARD_WIDTH: f32 = 280.0;
const THUMBNAIL_HEIGHT: f32 = 190.0;
const ERROR_COLOR: Color = Color {
    r: 0.9,
    g: 0.25,
    b: 0.25,
    a: 1.0,
};

pub fn view(panel: &SearchPanel) -> Element<'_, Message> {
    let label = if panel.is_loading() { "Searching..." } else { "Search" };

    let form = row![
        text_input("Search for images...", panel.query())
            .on_input(Message::QueryChanged)
            .on_submit(Message::SubmitSearch)
            .padding(10)
            .width(Length::Fill),
        button(text(label))
            .on_press_maybe((!panel.is_loading()).then_some(Message::SubmitSearch))
            .padding(10),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let mut content = column![form].spacing(20).max_width(960.0);

    if let Some(error) = panel.error() {
        content = content.push(text(error).color(ERROR_COLOR));
    }

    let grid: Vec<Element<'_, Message>> = cards(panel).into_iter().map(result_card).collect();

    content = content.push(scrollable(row(grid).spacing(16).wrap()));

    container(content).width(Length::Fill).center_x(Length::Fill).into()
}

/// What one result card shows
#[derive(Debug, Clone, PartialEq)]
pub struct ResultCard<'a> {
    pub id: &'a str,
    /// Description, or the fixed fallback text
    pub description: &'a str,
    /// `None` until the thumbnail download lands
    pub thumbnail: Option<&'a Handle>,
}

/// One card per displayed result, in result order
pub fn cards(panel: &SearchPanel) -> Vec<ResultCard<'_>> {
    panel
        .results()
        .iter()
        .map(|image| ResultCard {
            id: &image.id,
            description: image.description(),
            thumbnail: panel.thumbnail(&image.id),
        })
        .collect()
}

fn result_card(card: ResultCard<'_>) -> Element<'_, Message> {
    let thumbnail: Element<'_, Message> = match card.thumbnail {
        Some(handle) => Image::new(handle.clone())
            .width(Length::Fixed(CARD_WIDTH))
            .height(Length::Fixed(THUMBNAIL_HEIGHT))
            .content_fit(ContentFit::Cover)
            .into(),
        None => container(text("Loading...").size(14))
            .width(Length::Fixed(CARD_WIDTH))
            .height(Length::Fixed(THUMBNAIL_HEIGHT))
            .center_x(Length::Fixed(CARD_WIDTH))
            .center_y(Length::Fixed(THUMBNAIL_HEIGHT))
            .into(),
    };

    let body = column![
        thumbnail,
        text(card.description).size(14),
        button(text("Add Caption"))
            .on_press(Message::PickResult(card.id.to_string()))
            .width(Length::Fill)
            .padding(8),
    ]
    .spacing(10)
    .width(Length::Fixed(CARD_WIDTH));

    container(body)
        .padding(12)
        .style(container::rounded_box)
        .into()
}

/// Caption prompt shown over the grid after a result is picked
pub fn caption_prompt(pending: &PendingSelection) -> Element<'_, Message> {
    let prompt = column![
        text("Add a Caption").size(22),
        text(pending.image.description()).size(13),
        text_input("Enter a caption...", &pending.caption)
            .on_input(Message::CaptionChanged)
            .on_submit(Message::ConfirmCaption)
            .padding(10),
        row![
            button(text("Confirm")).on_press(Message::ConfirmCaption).padding(8),
            button(text("Cancel"))
                .on_press(Message::CancelCaption)
                .style(button::secondary)
                .padding(8),
        ]
        .spacing(12),
    ]
    .spacing(14);

    container(prompt)
        .width(Length::Fixed(380.0))
        .padding(24)
        .style(container::rounded_box)
        .into()
}
