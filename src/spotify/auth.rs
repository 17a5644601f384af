use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::{Client, Url};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    Res, config, error,
    management::TokenManager,
    server::start_api_server,
    success,
    types::{PkceToken, Token},
    utils, warning,
};

/// Runs the OAuth 2.0 PKCE flow against Spotify and persists the token.
///
/// 1. Generates a code verifier and its S256 challenge
/// 2. Starts the local callback server
/// 3. Opens the authorization URL in the browser (or prints it)
/// 4. Waits up to 60 seconds for the callback to exchange the code
/// 5. Stores the token through [`TokenManager`]
///
/// Fatal failures terminate the process through `error!`.
pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let auth_url = match authorize_url(&code_challenge) {
        Ok(url) => url,
        Err(e) => error!("Cannot build authorization URL: {}", e),
    };

    // Store verifier in shared state before the server can receive a callback
    {
        let mut lock = shared_state.lock().await;
        *lock = Some(PkceToken {
            code_verifier,
            token: None,
        });
    }

    let server_state = Arc::clone(&shared_state);
    tokio::spawn(async move {
        if let Err(e) = start_api_server(server_state).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    match wait_for_token(shared_state).await {
        Some(t) => {
            if let Err(e) = TokenManager::new(t).persist().await {
                error!("Failed to save token to cache: {}", e);
            }

            success!("Authentication successful!");
        }
        None => {
            error!("Authentication failed or timed out.");
        }
    }
}

/// Builds the Spotify authorization URL with all query parameters encoded.
pub fn authorize_url(code_challenge: &str) -> Res<Url> {
    let client_id = config::spotify_client_id()?;
    let url = Url::parse_with_params(
        &config::spotify_apiauth_url(),
        &[
            ("client_id", client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", config::spotify_redirect_uri().as_str()),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("scope", config::spotify_scope().as_str()),
        ],
    )?;
    Ok(url)
}

/// Polls the shared state once per second for up to 60 seconds.
async fn wait_for_token(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Token> {
    use std::time::Instant;

    let max_wait = Duration::from_secs(60);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(token) = lock.as_ref().and_then(|p| p.token.as_ref()) {
            return Some(token.clone());
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Exchanges a refresh token for a new access token.
pub async fn refresh_token(refresh_token: &str) -> Res<Token> {
    let client_id = config::spotify_client_id()?;
    let res = Client::new()
        .post(config::spotify_apitoken_url())
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id.as_str()),
        ])
        .send()
        .await?
        .error_for_status()?;

    let json: Value = res.json().await?;
    token_from_json(&json)
}

/// Exchanges an authorization code plus PKCE verifier for a token.
pub async fn exchange_code_pkce(code: &str, verifier: &str) -> Res<Token> {
    let client_id = config::spotify_client_id()?;
    let redirect_uri = config::spotify_redirect_uri();

    let res = Client::new()
        .post(config::spotify_apitoken_url())
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri.as_str()),
        ])
        .send()
        .await?
        .error_for_status()?;

    let json: Value = res.json().await?;
    token_from_json(&json)
}

/// Reads a token endpoint response. `refresh_token` may be absent on refresh,
/// in which case it is left empty for the caller to carry over.
pub fn token_from_json(json: &Value) -> Res<Token> {
    let access_token = json["access_token"]
        .as_str()
        .ok_or("token response without access_token")?;

    Ok(Token {
        access_token: access_token.to_string(),
        refresh_token: json["refresh_token"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        scope: json["scope"].as_str().unwrap_or_default().to_string(),
        expires_in: json["expires_in"].as_u64().unwrap_or(3600),
        obtained_at: Utc::now().timestamp() as u64,
    })
}
