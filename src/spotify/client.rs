use std::time::Duration;

use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use tokio::{sync::Mutex, time::sleep};

use crate::{
    Res, config,
    management::TokenManager,
    types::User,
    utils::{self, MAX_RETRY_AFTER_SECS},
    warning,
};

/// Attempts per request before a 502 or 429 is reported to the caller.
const MAX_ATTEMPTS: u32 = 5;

const BAD_GATEWAY_DELAY: Duration = Duration::from_secs(10);

/// Authenticated Spotify Web API client.
///
/// Constructed once per command and passed by reference to every operation.
/// The token manager sits behind a mutex so expired tokens can be refreshed
/// from `&self`.
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    tokens: Mutex<TokenManager>,
    bad_gateway_delay: Duration,
}

impl SpotifyClient {
    pub fn new(tokens: TokenManager) -> Self {
        Self::with_api_url(tokens, config::spotify_apiurl())
    }

    pub fn with_api_url(tokens: TokenManager, api_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            tokens: Mutex::new(tokens),
            bad_gateway_delay: BAD_GATEWAY_DELAY,
        }
    }

    /// Overrides the wait before a 502 is retried.
    pub fn with_bad_gateway_delay(mut self, delay: Duration) -> Self {
        self.bad_gateway_delay = delay;
        self
    }

    /// Builds a client from the cached token written by `spotmig auth`.
    pub async fn from_cache() -> Res<Self> {
        let tokens = TokenManager::load()
            .await
            .map_err(|e| format!("Failed to load token. Please run spotmig auth\n Error: {e}"))?;
        Ok(Self::new(tokens))
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// Sends an authorised request.
    ///
    /// 502 responses are retried after 10 seconds. 429 responses are retried
    /// after `Retry-After` when it does not exceed two minutes. Any other
    /// non-success status, or a 502/429 on the last attempt, is returned as
    /// an error.
    pub(crate) async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Res<Response> {
        let mut attempt = 0;

        loop {
            attempt += 1;
            let token = self.tokens.lock().await.get_valid_token().await?;

            let mut request = self.http.request(method.clone(), url).bearer_auth(token);
            if let Some(body) = body {
                request = request.json(body);
            }
            let response = request.send().await?;

            match response.status() {
                StatusCode::BAD_GATEWAY if attempt < MAX_ATTEMPTS => {
                    sleep(self.bad_gateway_delay).await;
                }
                StatusCode::TOO_MANY_REQUESTS if attempt < MAX_ATTEMPTS => {
                    match utils::retry_after_secs(response.headers()) {
                        Some(secs) if secs <= MAX_RETRY_AFTER_SECS => {
                            sleep(Duration::from_secs(secs)).await;
                        }
                        Some(secs) => {
                            warning!(
                                "Retry after has reached an abnormal high of {} seconds. Try again later.",
                                secs
                            );
                            return Ok(response.error_for_status()?);
                        }
                        None => sleep(Duration::from_secs(1)).await,
                    }
                }
                _ => return Ok(response.error_for_status()?),
            }
        }
    }

    pub async fn current_user(&self) -> Res<User> {
        let url = self.endpoint("me");
        let user = self.execute(Method::GET, &url, None).await?.json().await?;
        Ok(user)
    }
}
