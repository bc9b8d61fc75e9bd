use std::path::PathBuf;
use std::sync::Arc;

use iced::widget::image::Handle;
use iced::widget::{column, container, text};
use iced::{Alignment, Element, Length, Size, Task, Theme};
use image::RgbaImage;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod editor;
mod error;
mod state;
mod surface;
mod ui;
mod unsplash;

use crate::config::AppConfig;
use crate::editor::{EditingSession, SessionId, SurfaceEvent};
use crate::error::{EditorError, SearchError};
use crate::state::data::SearchResultImage;
use crate::state::search::SearchPanel;
use crate::surface::ShapeKind;
use crate::unsplash::UnsplashClient;

/// Main application state
struct ImageEditorPro {
    config: AppConfig,
    client: UnsplashClient,
    /// Search page: query, results and caption prompt
    search: SearchPanel,
    /// The open editor, if any. At most one exists at a time.
    session: Option<EditingSession>,
    next_session: u64,
    /// A save dialog is open. Stays set across sessions until it returns.
    exporting: bool,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    QueryChanged(String),
    SubmitSearch,
    /// Search response tagged with the generation that requested it
    SearchCompleted(u64, Result<Vec<SearchResultImage>, SearchError>),
    ThumbnailLoaded(u64, String, Result<Vec<u8>, SearchError>),
    /// "Add Caption" pressed on a result card
    PickResult(String),
    CaptionChanged(String),
    ConfirmCaption,
    CancelCaption,
    /// Background download finished for the given session
    BackgroundLoaded(SessionId, Result<Arc<RgbaImage>, EditorError>),
    AddShape(ShapeKind),
    AddText,
    /// Pointer or keyboard input on the editor surface
    Surface(SurfaceEvent),
    Export,
    /// Export outcome for the session that started it
    ExportFinished(SessionId, Result<Option<PathBuf>, EditorError>),
    CloseEditor,
}

impl ImageEditorPro {
    /// Create a new instance of the application
    fn new(config: AppConfig) -> (Self, Task<Message>) {
        // Without an HTTP client nothing works, so failing here is fatal
        let client = UnsplashClient::new(&config)
            .expect("Failed to initialize HTTP client. Check the TLS setup.");

        info!("🎨 Image Editor Pro initialized");

        (
            ImageEditorPro {
                config,
                client,
                search: SearchPanel::new(),
                session: None,
                next_session: 1,
                exporting: false,
                status: String::new(),
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::QueryChanged(query) => {
                self.search.set_query(query);
                Task::none()
            }
            Message::SubmitSearch => {
                let Some(ticket) = self.search.submit() else {
                    return Task::none();
                };
                let generation = ticket.generation;
                Task::perform(self.client.clone().search(ticket.query), move |result| {
                    Message::SearchCompleted(generation, result)
                })
            }
            Message::SearchCompleted(generation, result) => {
                let wanted = self.search.apply_response(generation, result);

                // Thumbnails arrive independently; each card shows a placeholder until then
                Task::batch(wanted.into_iter().map(|image| {
                    let id = image.id;
                    Task::perform(self.client.clone().fetch_bytes(image.urls.small), move |result| {
                        Message::ThumbnailLoaded(generation, id.clone(), result)
                    })
                }))
            }
            Message::ThumbnailLoaded(generation, id, result) => {
                match result {
                    Ok(bytes) => {
                        self.search.apply_thumbnail(generation, id, Handle::from_bytes(bytes));
                    }
                    Err(e) => warn!("⚠️  Thumbnail for {} failed: {}", id, e),
                }
                Task::none()
            }
            Message::PickResult(id) => {
                self.search.begin_selection(&id);
                Task::none()
            }
            Message::CaptionChanged(caption) => {
                self.search.set_caption(caption);
                Task::none()
            }
            Message::ConfirmCaption => {
                let Some(selection) = self.search.confirm_selection() else {
                    return Task::none();
                };

                let id = SessionId(self.next_session);
                self.next_session += 1;
                let url = selection.image.urls.regular.clone();

                // Replacing the session drops the previous surface and all its overlays
                self.session = Some(EditingSession::new(
                    id,
                    selection.image,
                    selection.caption,
                    self.config.surface_width,
                    self.config.surface_height,
                ));
                self.status.clear();

                Task::perform(
                    editor::loader::load_background(
                        self.client.clone(),
                        url,
                        self.config.surface_width,
                        self.config.surface_height,
                    ),
                    move |result| Message::BackgroundLoaded(id, result),
                )
            }
            Message::CancelCaption => {
                self.search.cancel_selection();
                Task::none()
            }
            Message::BackgroundLoaded(id, result) => {
                match self.session.as_mut() {
                    Some(session) => {
                        session.apply_background(id, result);
                    }
                    None => info!("Background for closed session {} discarded", id.0),
                }
                Task::none()
            }
            Message::AddShape(kind) => {
                if let Some(session) = self.session.as_mut() {
                    session.add_shape(kind);
                }
                Task::none()
            }
            Message::AddText => {
                if let Some(session) = self.session.as_mut() {
                    session.add_text();
                }
                Task::none()
            }
            Message::Surface(event) => {
                if let Some(session) = self.session.as_mut() {
                    session.handle(event);
                }
                Task::none()
            }
            Message::Export => {
                let Some(session) = self.session.as_ref() else {
                    return Task::none();
                };
                // Only one save dialog at a time, even if it belongs to a closed session
                if self.exporting {
                    return Task::none();
                }

                let id = session.id();
                self.exporting = true;
                self.status = "Exporting...".to_string();
                Task::perform(
                    editor::export::export_png(session.render(), self.config.export_file_name.clone()),
                    move |result| Message::ExportFinished(id, result),
                )
            }
            Message::ExportFinished(id, result) => {
                self.exporting = false;
                if self.session.as_ref().map(EditingSession::id) != Some(id) {
                    match result {
                        Ok(Some(path)) => info!("Export of closed session {} saved to {}", id.0, path.display()),
                        Ok(None) => info!("Export of closed session {} cancelled", id.0),
                        Err(e) => warn!("⚠️  Export of closed session {} failed: {}", id.0, e),
                    }
                    return Task::none();
                }

                self.status = match result {
                    Ok(Some(path)) => format!("✅ Saved to {}", path.display()),
                    Ok(None) => "Export cancelled".to_string(),
                    Err(e) => {
                        warn!("⚠️  Export failed: {}", e);
                        format!("Export failed: {e}")
                    }
                };
                Task::none()
            }
            Message::CloseEditor => {
                self.session = None;
                self.status.clear();
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        if let Some(session) = &self.session {
            return ui::editor_view::view(session, self.exporting, &self.status);
        }

        let page = column![
            text("Image Editor Pro").size(40),
            text("Search for images to edit").size(20),
            text("Find the perfect image and add your creative touch").size(14),
            ui::search_view::view(&self.search),
        ]
        .spacing(20)
        .padding(40)
        .align_x(Alignment::Center);

        let page = container(page).width(Length::Fill).height(Length::Fill).center_x(Length::Fill);

        match self.search.pending() {
            Some(pending) => ui::modal(page, ui::search_view::caption_prompt(pending), Message::CancelCaption),
            None => page.into(),
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load();

    iced::application("Image Editor Pro", ImageEditorPro::update, ImageEditorPro::view)
        .theme(ImageEditorPro::theme)
        .centered()
        .window_size(Size::new(1280.0, 860.0))
        .run_with(move || ImageEditorPro::new(config))
}
