//! Configuration management for spotmig.
//!
//! Configuration comes from environment variables, optionally populated from
//! `.env` files. Lookup order:
//! 1. Environment variables (highest priority)
//! 2. `.env` in the current working directory
//! 3. `.env` in the local data directory (`spotmig/.env`)
//! 4. Application defaults (where applicable)
//!
//! `dotenv` never overrides a variable that is already set, so loading the
//! working directory file first gives it precedence over the data directory.

use std::{env, path::PathBuf, time::Duration};

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
const DEFAULT_SCOPE: &str = "playlist-read-private playlist-modify-private user-library-read";
const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_ODESLI_URL: &str = "https://api.song.link/v1-alpha.1/links";
const DEFAULT_DEEZER_URL: &str = "https://api.deezer.com";

/// Number of records processed between two checkpoint flushes.
pub const DEFAULT_FLUSH_EVERY: usize = 10;

/// Pause after each flush. Odesli allows 10 requests per minute without a key.
pub const DEFAULT_FLUSH_DELAY_SECS: u64 = 6;

/// Returns the application's local data directory (`<data_local_dir>/spotmig`).
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotmig");
    path
}

/// Loads environment variables from `.env` files.
///
/// Both the working directory `.env` and `<data_local_dir>/spotmig/.env` are
/// optional. The data directory is created if it does not exist yet.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or if an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir)
        .await
        .map_err(|e| e.to_string())?;

    let cwd_env = PathBuf::from(".env");
    if cwd_env.is_file() {
        dotenv::from_path(&cwd_env).map_err(|e| format!("{}: {}", cwd_env.display(), e))?;
    }

    let data_env = dir.join(".env");
    if data_env.is_file() {
        dotenv::from_path(&data_env).map_err(|e| format!("{}: {}", data_env.display(), e))?;
    }

    Ok(())
}

fn var_or(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Address the local OAuth callback server binds to (`SERVER_ADDRESS`).
pub fn server_addr() -> String {
    var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Spotify application client ID (`SPOTIFY_API_AUTH_CLIENT_ID`).
///
/// # Errors
///
/// Returns an error when the variable is unset, since no Spotify request can
/// be authorised without it.
pub fn spotify_client_id() -> Result<String, String> {
    optional("SPOTIFY_API_AUTH_CLIENT_ID")
        .ok_or_else(|| "SPOTIFY_API_AUTH_CLIENT_ID must be set".to_string())
}

/// OAuth redirect URI registered with the Spotify application.
pub fn spotify_redirect_uri() -> String {
    var_or("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

/// Space separated OAuth scopes requested during `auth`.
pub fn spotify_scope() -> String {
    var_or("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE)
}

pub fn spotify_apiauth_url() -> String {
    var_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

pub fn spotify_apitoken_url() -> String {
    var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

pub fn spotify_apiurl() -> String {
    var_or("SPOTIFY_API_URL", DEFAULT_API_URL)
}

/// Odesli (song.link) links endpoint.
pub fn odesli_apiurl() -> String {
    var_or("ODESLI_API_URL", DEFAULT_ODESLI_URL)
}

/// Optional Odesli API key. Raises the request quota when present.
pub fn odesli_api_key() -> Option<String> {
    optional("ODESLI_API_KEY")
}

/// Optional two letter country code forwarded to Odesli as `userCountry`.
pub fn odesli_user_country() -> Option<String> {
    optional("ODESLI_USER_COUNTRY")
}

pub fn deezer_apiurl() -> String {
    var_or("DEEZER_API_URL", DEFAULT_DEEZER_URL)
}

/// Records processed between checkpoint flushes (`SPOTMIG_FLUSH_EVERY`).
///
/// Zero or unparsable values fall back to [`DEFAULT_FLUSH_EVERY`].
pub fn flush_every() -> usize {
    optional("SPOTMIG_FLUSH_EVERY")
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_FLUSH_EVERY)
}

/// Pause after each checkpoint flush (`SPOTMIG_FLUSH_DELAY_SECS`).
pub fn flush_delay() -> Duration {
    let secs = optional("SPOTMIG_FLUSH_DELAY_SECS")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_FLUSH_DELAY_SECS);
    Duration::from_secs(secs)
}
