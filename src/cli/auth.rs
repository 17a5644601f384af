use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{config, info, spotify, types::PkceToken};

/// Interactive login. The cached token is picked up by `shuffle`.
pub async fn auth() {
    info!(
        "Waiting for the Spotify callback on {}",
        config::spotify_redirect_uri()
    );
    let pending: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(None));
    spotify::auth::auth(pending).await;
}
