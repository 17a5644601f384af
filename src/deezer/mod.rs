//! Deezer catalog search.
//!
//! Matching is deliberately naive: the first result of a strict search for
//! `"<title> <artist>"` is taken as the match.

mod links;

pub use links::{COLUMN_DEEZER_LINK, DeezerSummary, build_query, resolve_file, resolve_table};

use async_trait::async_trait;
use reqwest::Client;

use crate::{
    config,
    types::{DeezerSearchResponse, DeezerTrack, LookupError},
};

/// Text search against a music catalog.
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Returns the first (best ranked) match for `query`, if any.
    async fn first_match(&self, query: &str) -> Result<Option<DeezerTrack>, LookupError>;
}

/// Reads a search response body. Deezer signals quota and parameter errors
/// with an `error` object and HTTP 200.
pub fn parse_search(body: &str) -> Result<Option<DeezerTrack>, LookupError> {
    let response: DeezerSearchResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Decode(e.to_string()))?;

    if let Some(err) = response.error {
        return Err(LookupError::Service(format!(
            "{} ({}): {}",
            err.kind, err.code, err.message
        )));
    }

    Ok(response.data.into_iter().next())
}

pub struct DeezerClient {
    http: Client,
    api_url: String,
}

impl DeezerClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config() -> Self {
        Self::new(config::deezer_apiurl())
    }
}

#[async_trait]
impl CatalogSearch for DeezerClient {
    async fn first_match(&self, query: &str) -> Result<Option<DeezerTrack>, LookupError> {
        let url = format!("{}/search", self.api_url);
        let response = self
            .http
            .get(&url)
            .query(&[("q", query), ("strict", "on"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }

        let body = response.text().await?;
        parse_search(&body)
    }
}
