//! # CLI Module
//!
//! User-facing command implementations. Each command builds the service
//! clients it needs, delegates to the library modules and reports progress
//! and results with the coloured output macros.
//!
//! ## Commands
//!
//! - [`auth`] - Spotify OAuth authentication with PKCE
//! - [`shuffle`] - Rebuild the "Liked Songs Playlist" in random order
//! - [`links`] - Resolve Tidal, Deezer and YouTube links with a resumable checkpoint
//! - [`deezer`] - Match an exported table against the Deezer catalog
//! - [`status`] - Summarise a checkpoint file
//!
//! ## Layers
//!
//! ```text
//! CLI Layer (User Interface)
//!     ↓
//! Workflows (enrichment runner, shuffle, Deezer table job)
//!     ↓
//! Service clients (Spotify, Odesli, Deezer) and management (checkpoints, tokens)
//! ```
//!
//! Fatal problems (missing columns, unreadable checkpoint, missing token)
//! end the process through `error!`. Per-track failures are warnings.
//!
//! ## Usage
//!
//! ```bash
//! spotmig auth
//! spotmig shuffle
//! spotmig links --input liked_songs.csv --output liked_songs_links.csv
//! spotmig status --progress liked_songs_progress.csv --pending
//! spotmig deezer --input liked_songs.csv --output liked_songs_deezer.csv
//! ```

mod auth;
mod deezer;
mod links;
mod shuffle;
mod status;

pub use auth::auth;
pub use deezer::deezer;
pub use links::links;
pub use shuffle::shuffle;
pub use status::status;
