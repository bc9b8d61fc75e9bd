use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Request};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::SearchError;
use crate::state::data::SearchResultImage;

/// Body of a search response; everything but `results` is ignored
#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResultImage>,
}

/// Thin async client for the search endpoint and image downloads.
///
/// Cheap to clone: the underlying `reqwest::Client` shares its pool.
#[derive(Debug, Clone)]
pub struct UnsplashClient {
    http: Client,
    endpoint: String,
    access_key: Option<String>,
    page_size: u32,
}

impl UnsplashClient {
    pub fn new(config: &AppConfig) -> Result<Self, SearchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        if config.access_key().is_none() {
            warn!("⚠️  No Unsplash access key configured, searches will fail");
        }

        Ok(Self {
            http,
            endpoint: config.search_endpoint.clone(),
            access_key: config.access_key().map(str::to_string),
            page_size: config.page_size,
        })
    }

    /// Build the search request for a query
    pub fn build_search_request(&self, query: &str) -> Result<Request, SearchError> {
        let key = self
            .access_key
            .as_deref()
            .ok_or(SearchError::MissingAccessKey)?;

        let per_page = self.page_size.to_string();
        let request = self
            .http
            .get(&self.endpoint)
            .query(&[("query", query), ("per_page", per_page.as_str())])
            .header(AUTHORIZATION, format!("Client-ID {key}"))
            .build()?;

        Ok(request)
    }

    /// Run one search. Exactly one HTTP request is issued, no retries.
    pub async fn search(self, query: String) -> Result<Vec<SearchResultImage>, SearchError> {
        let request = self.build_search_request(&query)?;
        debug!("GET {}", request.url());

        let response = self.http.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_search_response(&body)
    }

    /// Download a resource as raw bytes
    pub async fn fetch_bytes(self, url: String) -> Result<Vec<u8>, SearchError> {
        let response = self.http.get(&url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        debug!("Downloaded {}KB from {}", bytes.len() / 1024, url);
        Ok(bytes.to_vec())
    }
}

/// Parse the JSON body of a search response
pub fn parse_search_response(body: &str) -> Result<Vec<SearchResultImage>, SearchError> {
    serde_json::from_str::<SearchResponse>(body)
        .map(|response| response.results)
        .map_err(|e| SearchError::Decode(e.to_string()))
}
