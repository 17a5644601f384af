//! Shuffle the liked songs collection into a dedicated playlist.
//!
//! The workflow is not resumable: a failure while submitting batches leaves
//! a partially filled playlist, which the next run deletes and rebuilds.

use async_trait::async_trait;
use rand::Rng;

use crate::{Res, types::SimplifiedPlaylist, utils};

pub const PLAYLIST_NAME: &str = "Liked Songs Playlist";
pub const PLAYLIST_DESCRIPTION: &str = "A playlist of liked songs";

/// Tracks accepted by a single add-to-playlist call.
pub const ADD_TRACKS_BATCH: usize = 100;

/// One page of the liked songs collection.
#[derive(Debug, Clone, Default)]
pub struct LikedPage {
    pub uris: Vec<String>,
    pub next: Option<String>,
}

/// Playlist operations the shuffle needs from a streaming service.
#[async_trait]
pub trait PlaylistService: Send + Sync {
    async fn user_id(&self) -> Res<String>;

    async fn playlists(&self) -> Res<Vec<SimplifiedPlaylist>>;

    /// Deletes (unfollows) a playlist owned by the current user.
    async fn delete_playlist(&self, playlist_id: &str) -> Res<()>;

    /// Creates a private playlist and returns its id.
    async fn create_playlist(&self, user_id: &str, name: &str, description: &str) -> Res<String>;

    /// Fetches a page of liked songs. `cursor` is the `next` value of the
    /// previous page, `None` for the first page.
    async fn liked_tracks_page(&self, cursor: Option<&str>) -> Res<LikedPage>;

    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Res<()>;
}

#[derive(Debug, Clone)]
pub struct ShuffleSummary {
    pub playlist_id: String,
    pub removed: usize,
    pub tracks: usize,
    pub batches: usize,
}

/// Deletes every playlist whose name contains `name` and creates a fresh one.
/// Returns the new playlist id and the number of playlists removed.
pub async fn replace_playlist<P: PlaylistService + ?Sized>(
    service: &P,
    user_id: &str,
    name: &str,
    description: &str,
) -> Res<(String, usize)> {
    let mut removed = 0;
    for playlist in service.playlists().await? {
        if playlist.name.contains(name) {
            service.delete_playlist(&playlist.id).await?;
            removed += 1;
        }
    }

    let playlist_id = service.create_playlist(user_id, name, description).await?;
    Ok((playlist_id, removed))
}

/// Walks the liked songs pages until no `next` cursor is returned.
pub async fn collect_liked_uris<P: PlaylistService + ?Sized>(service: &P) -> Res<Vec<String>> {
    let mut uris = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = service.liked_tracks_page(cursor.as_deref()).await?;
        uris.extend(page.uris);
        match page.next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(uris)
}

/// Adds `uris` to the playlist in batches of [`ADD_TRACKS_BATCH`], in order.
/// Returns the number of batches submitted.
pub async fn submit_in_batches<P: PlaylistService + ?Sized>(
    service: &P,
    playlist_id: &str,
    uris: &[String],
) -> Res<usize> {
    let mut submitted = 0;
    for batch in utils::batches(uris, ADD_TRACKS_BATCH) {
        service.add_tracks(playlist_id, batch).await?;
        submitted += 1;
    }
    Ok(submitted)
}

/// Full shuffle: replace the playlist, collect, shuffle and submit.
pub async fn shuffle_liked_songs<P, R>(service: &P, rng: &mut R) -> Res<ShuffleSummary>
where
    P: PlaylistService + ?Sized,
    R: Rng + ?Sized,
{
    let user_id = service.user_id().await?;
    let (playlist_id, removed) =
        replace_playlist(service, &user_id, PLAYLIST_NAME, PLAYLIST_DESCRIPTION).await?;

    let mut uris = collect_liked_uris(service).await?;
    utils::shuffle_uris(&mut uris, rng);
    let batches = submit_in_batches(service, &playlist_id, &uris).await?;

    Ok(ShuffleSummary {
        playlist_id,
        removed,
        tracks: uris.len(),
        batches,
    })
}
