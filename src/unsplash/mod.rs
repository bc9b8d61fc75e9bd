/// Photo search provider
///
/// This module talks to the Unsplash REST API:
/// - Keyword search with a fixed page size (client.rs)
/// - Raw downloads of thumbnails and full-size images (client.rs)

pub mod client;

pub use client::UnsplashClient;
