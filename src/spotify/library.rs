use reqwest::Method;

use crate::{
    Res,
    spotify::SpotifyClient,
    types::{Paging, SavedTrack},
};

/// Largest page size `/me/tracks` accepts.
const SAVED_TRACKS_LIMIT: u32 = 50;

impl SpotifyClient {
    /// One page of the user's saved tracks. Pass the previous page's `next`
    /// URL to continue, `None` to start from the beginning.
    pub async fn saved_tracks(&self, next: Option<&str>) -> Res<Paging<SavedTrack>> {
        let url = match next {
            Some(url) => url.to_string(),
            None => self.endpoint(&format!("me/tracks?limit={SAVED_TRACKS_LIMIT}")),
        };
        let page = self.execute(Method::GET, &url, None).await?.json().await?;
        Ok(page)
    }
}
