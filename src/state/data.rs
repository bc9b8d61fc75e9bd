/// Shared data structures for the application state
///
/// These structs represent the data model that flows from the
/// search provider into the search page and then into the editor.
use serde::Deserialize;

/// Text shown for results without a description
pub const NO_DESCRIPTION: &str = "No description";

/// URL variants of one search result
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageUrls {
    /// Full resolution used as the editor background
    pub regular: String,
    /// Small resolution used for the result thumbnail
    pub small: String,
}

/// Represents a single image returned by the search provider
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchResultImage {
    /// Provider ID, unique within one response
    pub id: String,
    /// Available resolutions
    pub urls: ImageUrls,
    /// Human readable description (may be null or missing)
    #[serde(default)]
    pub alt_description: Option<String>,
}

impl SearchResultImage {
    /// Description to display, falling back to a fixed text when absent or blank
    pub fn description(&self) -> &str {
        self.alt_description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(NO_DESCRIPTION)
    }
}

/// Trim a caption; an empty caption means no caption
pub fn normalize_caption(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(alt: Option<&str>) -> SearchResultImage {
        SearchResultImage {
            id: "abc".to_string(),
            urls: ImageUrls {
                regular: "https://images.example/abc?w=1080".to_string(),
                small: "https://images.example/abc?w=400".to_string(),
            },
            alt_description: alt.map(str::to_string),
        }
    }

    #[test]
    fn test_description_fallback() {
        assert_eq!(image(None).description(), NO_DESCRIPTION);
        assert_eq!(image(Some("  ")).description(), NO_DESCRIPTION);
        assert_eq!(image(Some("a red fox")).description(), "a red fox");
    }

    #[test]
    fn test_normalize_caption() {
        assert_eq!(normalize_caption("  Hello "), Some("Hello".to_string()));
        assert_eq!(normalize_caption("   "), None);
        assert_eq!(normalize_caption(""), None);
    }

    #[test]
    fn test_deserialize_null_description() {
        let json = r#"{
            "id": "xyz",
            "urls": { "regular": "r", "small": "s", "thumb": "t" },
            "alt_description": null
        }"#;
        let parsed: SearchResultImage = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.id, "xyz");
        assert_eq!(parsed.alt_description, None);
    }
}
