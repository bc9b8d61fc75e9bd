/// Search page state
///
/// Owns the query text, the current result set, the busy/error flags and
/// the pending caption prompt. Network work is not done here: `submit`
/// only decides whether a request must be issued and hands back a ticket
/// that the caller turns into a background task.
use std::collections::HashMap;

use iced::widget::image::Handle;
use tracing::{debug, error, info};

use super::data::{normalize_caption, SearchResultImage};
use crate::error::SearchError;

/// Message shown for every failed search
pub const SEARCH_FAILED_MESSAGE: &str = "Failed to fetch images. Please try again.";

/// A search that must be sent to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    /// Generation this request belongs to; responses for older generations are dropped
    pub generation: u64,
    /// Trimmed query text
    pub query: String,
}

/// Result picked in the grid, waiting for a caption
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSelection {
    pub image: SearchResultImage,
    pub caption: String,
}

/// What the search page hands to the coordinator once a selection is confirmed
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub image: SearchResultImage,
    pub caption: Option<String>,
}

#[derive(Debug, Default)]
pub struct SearchPanel {
    query: String,
    results: Vec<SearchResultImage>,
    thumbnails: HashMap<String, Handle>,
    loading: bool,
    error: Option<String>,
    pending: Option<PendingSelection>,
    generation: u64,
}

impl SearchPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[SearchResultImage] {
        &self.results
    }

    pub fn thumbnail(&self, id: &str) -> Option<&Handle> {
        self.thumbnails.get(id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pending(&self) -> Option<&PendingSelection> {
        self.pending.as_ref()
    }

    /// Current request generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_query(&mut self, query: String) {
        self.query = query;
    }

    /// Start a search for the current query.
    ///
    /// Returns `None` (and changes nothing) for blank queries or while a
    /// request is already in flight.
    pub fn submit(&mut self) -> Option<SearchTicket> {
        let query = self.query.trim();
        if query.is_empty() {
            debug!("Ignoring blank search query");
            return None;
        }
        if self.loading {
            debug!("Search already in flight, ignoring submit");
            return None;
        }

        self.generation += 1;
        self.loading = true;
        self.error = None;

        info!("🔍 Searching for '{}' (generation {})", query, self.generation);

        Some(SearchTicket {
            generation: self.generation,
            query: query.to_string(),
        })
    }

    /// Apply a search response.
    ///
    /// Returns the images whose thumbnails should be fetched, or an empty
    /// list if the response was stale or failed.
    pub fn apply_response(
        &mut self,
        generation: u64,
        response: Result<Vec<SearchResultImage>, SearchError>,
    ) -> Vec<SearchResultImage> {
        if generation != self.generation {
            debug!(
                "Dropping stale search response (generation {}, current {})",
                generation, self.generation
            );
            return Vec::new();
        }

        self.loading = false;

        match response {
            Ok(images) => {
                info!("✅ Search returned {} images", images.len());
                self.error = None;
                self.thumbnails.clear();
                self.results = images;
                self.results.clone()
            }
            Err(e) => {
                error!("❌ Error fetching images: {}", e);
                self.error = Some(SEARCH_FAILED_MESSAGE.to_string());
                Vec::new()
            }
        }
    }

    /// Store a downloaded thumbnail if it still belongs to the displayed results
    pub fn apply_thumbnail(&mut self, generation: u64, id: String, handle: Handle) -> bool {
        if generation != self.generation || !self.results.iter().any(|r| r.id == id) {
            return false;
        }
        self.thumbnails.insert(id, handle);
        true
    }

    /// Open the caption prompt for a result
    pub fn begin_selection(&mut self, id: &str) -> bool {
        match self.results.iter().find(|r| r.id == id) {
            Some(image) => {
                self.pending = Some(PendingSelection {
                    image: image.clone(),
                    caption: String::new(),
                });
                true
            }
            None => false,
        }
    }

    pub fn set_caption(&mut self, caption: String) {
        if let Some(pending) = self.pending.as_mut() {
            pending.caption = caption;
        }
    }

    /// Confirm the caption prompt, handing back the selection
    pub fn confirm_selection(&mut self) -> Option<Selection> {
        self.pending.take().map(|pending| Selection {
            caption: normalize_caption(&pending.caption),
            image: pending.image,
        })
    }

    /// Close the caption prompt without selecting anything
    pub fn cancel_selection(&mut self) {
        self.pending = None;
    }
}
