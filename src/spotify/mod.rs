//! # Spotify Integration Module
//!
//! Interface to the Spotify Web API used by spotmig: the OAuth 2.0 PKCE
//! authentication flow and an explicit [`SpotifyClient`] value that carries
//! the HTTP client, the API base URL and the token manager. Commands build
//! one client and pass it to every operation; there is no process-wide
//! session.
//!
//! ## Architecture
//!
//! ```text
//! CLI Layer (shuffle command)
//!          ↓
//! Shuffle workflow (PlaylistService)
//!          ↓
//! SpotifyClient
//!     ├── auth      (PKCE flow, token exchange and refresh)
//!     ├── library   (saved tracks paging)
//!     └── playlist  (list, unfollow, create, add tracks)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## API Coverage
//!
//! - `GET /me` - current user id
//! - `GET /me/playlists` - user's playlists, followed through `next`
//! - `DELETE /playlists/{id}/followers` - unfollow (delete) a playlist
//! - `POST /users/{user_id}/playlists` - create a private playlist
//! - `GET /me/tracks` - liked songs, followed through `next`
//! - `POST /playlists/{id}/tracks` - add up to 100 tracks
//! - `POST /api/token` - code exchange and refresh
//!
//! ## Error Handling
//!
//! Every request goes through `SpotifyClient::execute`, which retries
//! 502 Bad Gateway after 10 seconds and 429 Too Many Requests after the
//! server's `Retry-After` (up to 120 seconds), five attempts at most.
//! Remaining failures are returned as errors.
//!
//! ## Usage
//!
//! ```rust
//! let client = spotify::SpotifyClient::from_cache().await?;
//! let user = client.current_user().await?;
//! let page = client.saved_tracks(None).await?;
//! ```

pub mod auth;
mod client;
mod library;
mod playlist;

pub use client::SpotifyClient;
