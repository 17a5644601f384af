use crate::{
    error, info,
    shuffle::{self, PLAYLIST_NAME},
    spotify::SpotifyClient,
    success, utils,
};

pub async fn shuffle() {
    let client = match SpotifyClient::from_cache().await {
        Ok(client) => client,
        Err(e) => error!("{}", e),
    };

    let pb = utils::spinner(&format!("Shuffling liked songs into {PLAYLIST_NAME}..."));
    let summary = match shuffle::shuffle_liked_songs(&client, &mut rand::rng()).await {
        Ok(summary) => summary,
        Err(e) => {
            pb.finish_and_clear();
            error!(
                "Shuffle failed: {}\nRun spotmig shuffle again to rebuild {}.",
                e,
                PLAYLIST_NAME
            )
        }
    };
    pb.finish_and_clear();

    if summary.removed > 0 {
        info!("Removed {} previous {} playlist(s).", summary.removed, PLAYLIST_NAME);
    }
    success!(
        "Added {} shuffled songs to {} in {} batch(es).",
        summary.tracks,
        PLAYLIST_NAME,
        summary.batches
    );
}
