use async_trait::async_trait;
use reqwest::Method;

use crate::{
    Res,
    shuffle::{LikedPage, PlaylistService},
    spotify::SpotifyClient,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        CreatePlaylistResponse, Paging, SimplifiedPlaylist,
    },
};

impl SpotifyClient {
    /// All playlists of the current user, following `next` links.
    pub async fn current_user_playlists(&self) -> Res<Vec<SimplifiedPlaylist>> {
        let mut playlists = Vec::new();
        let mut url = self.endpoint("me/playlists?limit=50");

        loop {
            let page: Paging<SimplifiedPlaylist> =
                self.execute(Method::GET, &url, None).await?.json().await?;
            playlists.extend(page.items);
            match page.next {
                Some(next) => url = next,
                None => break,
            }
        }

        Ok(playlists)
    }

    /// Unfollows a playlist, which deletes it for its owner.
    pub async fn unfollow_playlist(&self, playlist_id: &str) -> Res<()> {
        let url = self.endpoint(&format!("playlists/{playlist_id}/followers"));
        self.execute(Method::DELETE, &url, None).await?;
        Ok(())
    }

    pub async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Res<CreatePlaylistResponse> {
        let url = self.endpoint(&format!("users/{user_id}/playlists"));
        let body = serde_json::to_value(CreatePlaylistRequest {
            name: name.to_string(),
            description: description.to_string(),
            public: false,
            collaborative: false,
        })?;
        let playlist = self
            .execute(Method::POST, &url, Some(&body))
            .await?
            .json()
            .await?;
        Ok(playlist)
    }

    /// Adds up to 100 tracks to a playlist.
    pub async fn add_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Res<AddTrackToPlaylistResponse> {
        let url = self.endpoint(&format!("playlists/{playlist_id}/tracks"));
        let body = serde_json::to_value(AddTrackToPlaylistRequest {
            uris: uris.to_vec(),
        })?;
        let response = self
            .execute(Method::POST, &url, Some(&body))
            .await?
            .json()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl PlaylistService for SpotifyClient {
    async fn user_id(&self) -> Res<String> {
        Ok(self.current_user().await?.id)
    }

    async fn playlists(&self) -> Res<Vec<SimplifiedPlaylist>> {
        self.current_user_playlists().await
    }

    async fn delete_playlist(&self, playlist_id: &str) -> Res<()> {
        self.unfollow_playlist(playlist_id).await
    }

    async fn create_playlist(&self, user_id: &str, name: &str, description: &str) -> Res<String> {
        Ok(SpotifyClient::create_playlist(self, user_id, name, description)
            .await?
            .id)
    }

    async fn liked_tracks_page(&self, cursor: Option<&str>) -> Res<LikedPage> {
        let page = self.saved_tracks(cursor).await?;
        Ok(LikedPage {
            uris: page
                .items
                .into_iter()
                .filter_map(|saved| saved.track.map(|t| t.uri))
                .collect(),
            next: page.next,
        })
    }

    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Res<()> {
        SpotifyClient::add_tracks(self, playlist_id, uris).await?;
        Ok(())
    }
}
