/// State management module
///
/// This module handles the search-side application state:
/// - Shared data structures (data.rs)
/// - Search page state, result set and caption prompt (search.rs)

pub mod data;
pub mod search;
