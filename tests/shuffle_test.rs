use std::{collections::BTreeSet, sync::Mutex};

use async_trait::async_trait;
use rand::{SeedableRng, rngs::StdRng};
use spotmig::{
    Res,
    shuffle::{
        ADD_TRACKS_BATCH, LikedPage, PLAYLIST_NAME, PlaylistService, collect_liked_uris,
        replace_playlist, shuffle_liked_songs,
    },
    types::SimplifiedPlaylist,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Delete(String),
    Create(String, String),
    Add(String, usize),
}

/// In-memory playlist service serving liked songs in pages of 50.
struct FakeService {
    playlists: Vec<SimplifiedPlaylist>,
    liked: Vec<String>,
    fail_add_at: Option<usize>,
    calls: Mutex<Vec<Call>>,
    added: Mutex<Vec<String>>,
    pages_served: Mutex<usize>,
}

impl FakeService {
    fn new(liked: usize, playlists: &[(&str, &str)]) -> Self {
        Self {
            playlists: playlists
                .iter()
                .map(|(id, name)| SimplifiedPlaylist {
                    id: id.to_string(),
                    name: name.to_string(),
                })
                .collect(),
            liked: (0..liked).map(|i| format!("spotify:track:{i:05}")).collect(),
            fail_add_at: None,
            calls: Mutex::new(Vec::new()),
            added: Mutex::new(Vec::new()),
            pages_served: Mutex::new(0),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaylistService for FakeService {
    async fn user_id(&self) -> Res<String> {
        Ok("listener".to_string())
    }

    async fn playlists(&self) -> Res<Vec<SimplifiedPlaylist>> {
        Ok(self.playlists.clone())
    }

    async fn delete_playlist(&self, playlist_id: &str) -> Res<()> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Delete(playlist_id.to_string()));
        Ok(())
    }

    async fn create_playlist(&self, user_id: &str, name: &str, _description: &str) -> Res<String> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Create(user_id.to_string(), name.to_string()));
        Ok("new-playlist".to_string())
    }

    async fn liked_tracks_page(&self, cursor: Option<&str>) -> Res<LikedPage> {
        *self.pages_served.lock().unwrap() += 1;
        let offset: usize = match cursor {
            Some(c) => c.parse()?,
            None => 0,
        };
        let end = (offset + 50).min(self.liked.len());
        Ok(LikedPage {
            uris: self.liked[offset..end].to_vec(),
            next: (end < self.liked.len()).then(|| end.to_string()),
        })
    }

    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Res<()> {
        let batch_no = self
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Add(..)))
            .count();
        if self.fail_add_at == Some(batch_no) {
            return Err("playlist service unavailable".into());
        }
        self.calls
            .lock()
            .unwrap()
            .push(Call::Add(playlist_id.to_string(), uris.len()));
        self.added.lock().unwrap().extend(uris.iter().cloned());
        Ok(())
    }
}

#[tokio::test]
async fn test_collect_follows_every_page() {
    let service = FakeService::new(173, &[]);
    let uris = collect_liked_uris(&service).await.unwrap();

    assert_eq!(uris, service.liked);
    assert_eq!(*service.pages_served.lock().unwrap(), 4);
}

#[tokio::test]
async fn test_collect_empty_library() {
    let service = FakeService::new(0, &[]);
    assert!(collect_liked_uris(&service).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_replace_playlist_deletes_matching_names() {
    let service = FakeService::new(0, &[
        ("p1", "Road trip"),
        ("p2", "Liked Songs Playlist"),
        ("p3", "My Liked Songs Playlist (old)"),
    ]);

    let (id, removed) = replace_playlist(&service, "listener", PLAYLIST_NAME, "desc")
        .await
        .unwrap();

    assert_eq!(id, "new-playlist");
    assert_eq!(removed, 2);
    assert_eq!(
        service.calls(),
        vec![
            Call::Delete("p2".to_string()),
            Call::Delete("p3".to_string()),
            Call::Create("listener".to_string(), PLAYLIST_NAME.to_string()),
        ]
    );
}

#[tokio::test]
async fn test_shuffle_submits_permutation_in_batches() {
    let service = FakeService::new(250, &[("old", PLAYLIST_NAME)]);
    let mut rng = StdRng::seed_from_u64(1);

    let summary = shuffle_liked_songs(&service, &mut rng).await.unwrap();

    assert_eq!(summary.playlist_id, "new-playlist");
    assert_eq!(summary.removed, 1);
    assert_eq!(summary.tracks, 250);
    assert_eq!(summary.batches, 3);

    let added = service.added.lock().unwrap().clone();
    assert_eq!(added.len(), 250);
    let expected: BTreeSet<_> = service.liked.iter().collect();
    let actual: BTreeSet<_> = added.iter().collect();
    assert_eq!(actual, expected);
    assert_ne!(added, service.liked);

    let batch_sizes: Vec<usize> = service
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Add(id, n) => {
                assert_eq!(id, "new-playlist");
                Some(n)
            }
            _ => None,
        })
        .collect();
    assert_eq!(batch_sizes, vec![100, 100, 50]);
    assert!(batch_sizes.iter().all(|n| *n <= ADD_TRACKS_BATCH));
}

#[tokio::test]
async fn test_shuffle_failure_mid_submission_is_reported() {
    let mut service = FakeService::new(250, &[]);
    service.fail_add_at = Some(1);

    let result = shuffle_liked_songs(&service, &mut StdRng::seed_from_u64(3)).await;

    assert!(result.is_err());
    assert_eq!(service.added.lock().unwrap().len(), 100);
}
