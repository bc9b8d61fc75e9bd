/// Error types shared across the application
///
/// Both enums are `Clone` so they can be carried inside iced messages
/// returned from background tasks.
use thiserror::Error;

/// Failures of the photo search request
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SearchError {
    /// No provider access key was configured
    #[error("no Unsplash access key configured (set UNSPLASH_ACCESS_KEY)")]
    MissingAccessKey,

    /// Transport-level failure (DNS, TLS, timeout, ...)
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with a non-success status code
    #[error("search provider returned HTTP {0}")]
    Status(u16),

    /// The response body was not the expected JSON
    #[error("failed to decode search response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            SearchError::Status(status.as_u16())
        } else if err.is_decode() {
            SearchError::Decode(err.to_string())
        } else {
            SearchError::Network(err.to_string())
        }
    }
}

/// Failures inside an editing session
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EditorError {
    /// The background image could not be downloaded
    #[error("failed to download image: {0}")]
    Download(String),

    /// The downloaded bytes are not a decodable image
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// The surface could not be encoded as PNG
    #[error("failed to encode PNG: {0}")]
    Encode(String),

    /// Writing the exported file failed
    #[error("failed to write file: {0}")]
    Io(String),

    /// A background task panicked or was cancelled
    #[error("task join error: {0}")]
    Task(String),
}

impl From<SearchError> for EditorError {
    fn from(err: SearchError) -> Self {
        EditorError::Download(err.to_string())
    }
}

impl From<std::io::Error> for EditorError {
    fn from(err: std::io::Error) -> Self {
        EditorError::Io(err.to_string())
    }
}

impl From<image::ImageError> for EditorError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Encoding(e) => EditorError::Encode(e.to_string()),
            other => EditorError::Decode(other.to_string()),
        }
    }
}
