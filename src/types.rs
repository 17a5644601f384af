use std::{collections::HashMap, fmt};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub token: Option<Token>,
}

// ---------------------------------------------------------------------------
// Spotify Web API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub display_name: Option<String>,
}

/// Offset based page as returned by `/me/playlists` and `/me/tracks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifiedPlaylist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
}

/// Entry of the saved tracks collection. `track` is null for tracks that
/// were removed from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTrack {
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}

// ---------------------------------------------------------------------------
// Odesli (song.link)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinksResponse {
    #[serde(default)]
    pub links_by_platform: HashMap<String, PlatformLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformLink {
    pub url: Option<String>,
}

// ---------------------------------------------------------------------------
// Deezer
// ---------------------------------------------------------------------------

/// Response of `GET /search`. Deezer reports failures with HTTP 200 and an
/// `error` object instead of `data`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeezerSearchResponse {
    #[serde(default)]
    pub data: Vec<DeezerTrack>,
    pub error: Option<DeezerApiError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeezerTrack {
    pub id: u64,
    pub title: String,
    pub link: String,
    pub artist: Option<DeezerArtist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeezerArtist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeezerApiError {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: i64,
}

// ---------------------------------------------------------------------------
// Lookup failures
// ---------------------------------------------------------------------------

/// Why a catalog lookup (Odesli or Deezer) produced no result. Every
/// variant leaves the track unresolved.
#[derive(Debug)]
pub enum LookupError {
    Transport(reqwest::Error),
    Status(StatusCode),
    Decode(String),
    /// The service answered but reported an error in the body.
    Service(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::Transport(e) => write!(f, "request failed: {e}"),
            LookupError::Status(status) => write!(f, "lookup returned {status}"),
            LookupError::Decode(e) => write!(f, "unreadable response: {e}"),
            LookupError::Service(e) => write!(f, "service error: {e}"),
        }
    }
}

impl std::error::Error for LookupError {}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LookupError::Decode(err.to_string())
        } else {
            LookupError::Transport(err)
        }
    }
}

// ---------------------------------------------------------------------------
// Migration pipeline
// ---------------------------------------------------------------------------

/// A track read from an exported library table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub identifier: String,
    pub title: String,
    pub artist: String,
    pub album: String,
}

/// Links resolved for one track. Any platform may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformLinks {
    pub tidal: Option<String>,
    pub deezer: Option<String>,
    pub youtube: Option<String>,
}

impl PlatformLinks {
    pub fn is_empty(&self) -> bool {
        self.tidal.is_none() && self.deezer.is_none() && self.youtube.is_none()
    }
}

/// One row of the checkpoint file. Header names match the progress files
/// written by the earlier tooling so those files resume as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    #[serde(rename = "Track URI")]
    pub identifier: String,
    #[serde(rename = "Track Name", default)]
    pub title: String,
    #[serde(rename = "Artist Name(s)", default)]
    pub artist: String,
    #[serde(rename = "Album Name", default)]
    pub album: String,
    #[serde(rename = "Tidal Link", default)]
    pub tidal_link: Option<String>,
    #[serde(rename = "Deezer Link", default)]
    pub deezer_link: Option<String>,
    #[serde(rename = "YouTube Link", default)]
    pub youtube_link: Option<String>,
    #[serde(rename = "isProcessed", with = "processed_flag", default)]
    pub processed: bool,
}

impl EnrichmentRecord {
    pub fn new(item: Item) -> Self {
        Self {
            identifier: item.identifier,
            title: item.title,
            artist: item.artist,
            album: item.album,
            tidal_link: None,
            deezer_link: None,
            youtube_link: None,
            processed: false,
        }
    }

    /// Stores the resolved links and marks the record processed.
    pub fn apply(&mut self, links: PlatformLinks) {
        self.tidal_link = links.tidal;
        self.deezer_link = links.deezer;
        self.youtube_link = links.youtube;
        self.processed = true;
    }

    pub fn links(&self) -> PlatformLinks {
        PlatformLinks {
            tidal: self.tidal_link.clone(),
            deezer: self.deezer_link.clone(),
            youtube: self.youtube_link.clone(),
        }
    }
}

/// Row of the flat links export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkExportRow {
    #[serde(rename = "spotify uri")]
    pub spotify_uri: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    #[serde(rename = "tidal link")]
    pub tidal_link: Option<String>,
    #[serde(rename = "deezer link")]
    pub deezer_link: Option<String>,
    #[serde(rename = "youtube link")]
    pub youtube_link: Option<String>,
    #[serde(rename = "isProcessed", with = "processed_flag")]
    pub processed: bool,
}

impl From<&EnrichmentRecord> for LinkExportRow {
    fn from(record: &EnrichmentRecord) -> Self {
        Self {
            spotify_uri: record.identifier.clone(),
            title: record.title.clone(),
            artist: record.artist.clone(),
            album: record.album.clone(),
            tidal_link: record.tidal_link.clone(),
            deezer_link: record.deezer_link.clone(),
            youtube_link: record.youtube_link.clone(),
            processed: record.processed,
        }
    }
}

#[derive(Tabled)]
pub struct CheckpointStatusRow {
    pub total: usize,
    pub processed: usize,
    pub pending: usize,
    pub tidal: usize,
    pub deezer: usize,
    pub youtube: usize,
}

#[derive(Tabled)]
pub struct PendingTableRow {
    pub name: String,
    pub artists: String,
    pub uri: String,
}

/// Serde adapter for the processed flag.
///
/// Written as `True`/`False`. Read case-insensitively, also accepting
/// `1`/`0`, `yes`/`no` and an empty cell (false).
pub mod processed_flag {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "True" } else { "False" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid processed flag: {raw:?}")))
    }

    pub fn parse(raw: &str) -> Option<bool> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" | "" => Some(false),
            _ => None,
        }
    }
}
