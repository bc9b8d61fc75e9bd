/// Editing sessions
///
/// This module handles:
/// - The lifetime of one editor instance for one selected image (session.rs)
/// - Downloading, decoding and fitting the background image (loader.rs)
/// - PNG export through a native save dialog (export.rs)

pub mod export;
pub mod loader;
pub mod session;

pub use session::{BackgroundStatus, EditingSession, SessionId, SurfaceEvent};
