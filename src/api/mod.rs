//! # API Module
//!
//! Handlers for the short-lived web server started by `spotmig auth`.
//!
//! - [`callback`] - Receives the Spotify authorization redirect and exchanges
//!   the code for a token using the PKCE verifier held in shared state.
//! - [`health`] - Reports that the server is up, with the crate version.
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use spotmig::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
