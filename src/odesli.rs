//! Odesli (song.link) lookup client.
//!
//! `GET {ODESLI_API_URL}?url=<spotify uri>` answers with a
//! `linksByPlatform` map. A platform missing from that map is not an error,
//! the link is just absent.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio::time::sleep;

use crate::{
    config,
    types::{LinksResponse, LookupError, PlatformLinks},
    utils::{self, MAX_RETRY_AFTER_SECS},
};

pub const PLATFORM_TIDAL: &str = "tidal";
pub const PLATFORM_DEEZER: &str = "deezer";
pub const PLATFORM_YOUTUBE: &str = "youtube";

/// Resolves cross-platform links for one track identifier.
#[async_trait]
pub trait LinkResolver: Send + Sync {
    async fn resolve(&self, identifier: &str) -> Result<PlatformLinks, LookupError>;
}

/// Picks the Tidal, Deezer and YouTube links out of an Odesli response.
pub fn extract_links(response: &LinksResponse) -> PlatformLinks {
    let url = |platform: &str| {
        response
            .links_by_platform
            .get(platform)
            .and_then(|link| link.url.clone())
            .filter(|u| !u.is_empty())
    };

    PlatformLinks {
        tidal: url(PLATFORM_TIDAL),
        deezer: url(PLATFORM_DEEZER),
        youtube: url(PLATFORM_YOUTUBE),
    }
}

pub fn parse_links(body: &str) -> Result<PlatformLinks, LookupError> {
    let response: LinksResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Decode(e.to_string()))?;
    Ok(extract_links(&response))
}

pub struct OdesliClient {
    http: Client,
    api_url: String,
    api_key: Option<String>,
    user_country: Option<String>,
}

impl OdesliClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into(),
            api_key: None,
            user_country: None,
        }
    }

    pub fn from_config() -> Self {
        let mut client = Self::new(config::odesli_apiurl());
        if let Some(key) = config::odesli_api_key() {
            client = client.with_api_key(key);
        }
        if let Some(country) = config::odesli_user_country() {
            client = client.with_user_country(country);
        }
        client
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Country the lookup is localised for (ISO 3166-1 alpha-2).
    pub fn with_user_country(mut self, country: impl Into<String>) -> Self {
        self.user_country = Some(country.into());
        self
    }

    fn query<'a>(&'a self, identifier: &'a str) -> Vec<(&'static str, &'a str)> {
        let mut params = vec![("url", identifier)];
        if let Some(key) = &self.api_key {
            params.push(("key", key.as_str()));
        }
        if let Some(country) = &self.user_country {
            params.push(("userCountry", country.as_str()));
        }
        params
    }
}

#[async_trait]
impl LinkResolver for OdesliClient {
    /// One GET per identifier. A 429 with a `Retry-After` of at most two
    /// minutes is waited out and retried once.
    async fn resolve(&self, identifier: &str) -> Result<PlatformLinks, LookupError> {
        let params = self.query(identifier);
        let mut retried = false;

        loop {
            let response = self.http.get(&self.api_url).query(&params).send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS && !retried {
                if let Some(secs) = utils::retry_after_secs(response.headers())
                    .filter(|s| *s <= MAX_RETRY_AFTER_SECS)
                {
                    retried = true;
                    sleep(Duration::from_secs(secs)).await;
                    continue;
                }
            }

            if !status.is_success() {
                return Err(LookupError::Status(status));
            }

            let body = response.text().await?;
            return parse_links(&body);
        }
    }
}
