use std::time::Duration;

use mockito::{Matcher, Server};
use spotmig::{
    management::TokenManager,
    shuffle::PlaylistService,
    spotify::SpotifyClient,
    types::Token,
};

fn fresh_token() -> TokenManager {
    TokenManager::new(Token {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        scope: "user-library-read".to_string(),
        expires_in: 3600,
        obtained_at: chrono::Utc::now().timestamp() as u64,
    })
}

fn client(server: &Server) -> SpotifyClient {
    SpotifyClient::with_api_url(fresh_token(), server.url())
        .with_bad_gateway_delay(Duration::ZERO)
}

const ME: &str = r#"{"id": "listener", "display_name": "Listener"}"#;

#[tokio::test]
async fn test_sends_bearer_token() {
    let mut server = Server::new_async().await;
    let me = server
        .mock("GET", "/me")
        .match_header("authorization", "Bearer access")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ME)
        .create_async()
        .await;

    let user = client(&server).current_user().await.unwrap();

    assert_eq!(user.id, "listener");
    me.assert_async().await;
}

#[tokio::test]
async fn test_retries_bad_gateway() {
    let mut server = Server::new_async().await;
    let bad = server
        .mock("GET", "/me")
        .with_status(502)
        .expect(2)
        .create_async()
        .await;
    let ok = server
        .mock("GET", "/me")
        .with_status(200)
        .with_body(ME)
        .create_async()
        .await;

    let user = client(&server).current_user().await.unwrap();

    assert_eq!(user.id, "listener");
    bad.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test]
async fn test_gives_up_after_five_attempts() {
    let mut server = Server::new_async().await;
    let bad = server
        .mock("GET", "/me")
        .with_status(502)
        .expect(5)
        .create_async()
        .await;

    assert!(client(&server).current_user().await.is_err());
    bad.assert_async().await;
}

#[tokio::test]
async fn test_waits_out_short_retry_after() {
    let mut server = Server::new_async().await;
    let limited = server
        .mock("GET", "/me")
        .with_status(429)
        .with_header("retry-after", "0")
        .expect(1)
        .create_async()
        .await;
    let ok = server
        .mock("GET", "/me")
        .with_status(200)
        .with_body(ME)
        .create_async()
        .await;

    assert!(client(&server).current_user().await.is_ok());
    limited.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test]
async fn test_long_retry_after_is_an_error() {
    let mut server = Server::new_async().await;
    let limited = server
        .mock("GET", "/me")
        .with_status(429)
        .with_header("retry-after", "121")
        .expect(1)
        .create_async()
        .await;

    assert!(client(&server).current_user().await.is_err());
    limited.assert_async().await;
}

#[tokio::test]
async fn test_other_status_is_not_retried() {
    let mut server = Server::new_async().await;
    let missing = server
        .mock("GET", "/me")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    assert!(client(&server).current_user().await.is_err());
    missing.assert_async().await;
}

#[tokio::test]
async fn test_liked_pages_follow_next_and_skip_removed_tracks() {
    let mut server = Server::new_async().await;
    let next = format!("{}/me/tracks?offset=50&limit=50", server.url());
    let first_body = format!(
        r#"{{"items": [
            {{"track": {{"id": "1", "name": "One", "uri": "spotify:track:1"}}}},
            {{"track": null}}
        ], "next": "{next}", "total": 3}}"#
    );
    let first = server
        .mock("GET", "/me/tracks")
        .match_query(Matcher::Regex("^limit=50$".to_string()))
        .with_status(200)
        .with_body(first_body)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/me/tracks")
        .match_query(Matcher::UrlEncoded("offset".to_string(), "50".to_string()))
        .with_status(200)
        .with_body(
            r#"{"items": [{"track": {"id": "2", "name": "Two", "uri": "spotify:track:2"}}],
                "next": null, "total": 3}"#,
        )
        .create_async()
        .await;

    let client = client(&server);
    let page = client.liked_tracks_page(None).await.unwrap();
    assert_eq!(page.uris, vec!["spotify:track:1".to_string()]);
    assert_eq!(page.next.as_deref(), Some(next.as_str()));

    let page = client.liked_tracks_page(page.next.as_deref()).await.unwrap();
    assert_eq!(page.uris, vec!["spotify:track:2".to_string()]);
    assert!(page.next.is_none());

    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_add_tracks_posts_uris() {
    let mut server = Server::new_async().await;
    let add = server
        .mock("POST", "/playlists/pl1/tracks")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "uris": ["spotify:track:1", "spotify:track:2"]
        })))
        .with_status(201)
        .with_body(r#"{"snapshot_id": "snap"}"#)
        .create_async()
        .await;

    let uris = vec!["spotify:track:1".to_string(), "spotify:track:2".to_string()];
    PlaylistService::add_tracks(&client(&server), "pl1", &uris)
        .await
        .unwrap();

    add.assert_async().await;
}
