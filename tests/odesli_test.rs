use mockito::{Matcher, Server};
use reqwest::StatusCode;
use spotmig::odesli::{LinkResolver, OdesliClient, extract_links, parse_links};
use spotmig::types::{LinksResponse, LookupError, PlatformLinks};

const LINKS_PATH: &str = "/v1-alpha.1/links";

const TIDAL_ONLY: &str =
    r#"{"linksByPlatform": {"tidal": {"url": "https://listen.tidal.com/track/7"}}}"#;

fn odesli(server: &Server) -> OdesliClient {
    OdesliClient::new(format!("{}{}", server.url(), LINKS_PATH))
}

#[test]
fn test_parse_links_picks_known_platforms() {
    let body = r#"{
        "entityUniqueId": "SPOTIFY_SONG::0DiWol3AO6WpXZgp0goxAV",
        "userCountry": "US",
        "pageUrl": "https://song.link/s/0DiWol3AO6WpXZgp0goxAV",
        "linksByPlatform": {
            "spotify": {"url": "https://open.spotify.com/track/0DiWol3AO6WpXZgp0goxAV"},
            "tidal": {"url": "https://listen.tidal.com/track/1", "entityUniqueId": "TIDAL_SONG::1"},
            "youtube": {"url": "https://www.youtube.com/watch?v=abc"}
        }
    }"#;

    let links = parse_links(body).unwrap();

    assert_eq!(
        links,
        PlatformLinks {
            tidal: Some("https://listen.tidal.com/track/1".to_string()),
            deezer: None,
            youtube: Some("https://www.youtube.com/watch?v=abc".to_string()),
        }
    );
}

#[test]
fn test_parse_links_without_platform_map() {
    let links = parse_links(r#"{"entityUniqueId": "x"}"#).unwrap();
    assert!(links.is_empty());
}

#[test]
fn test_parse_links_malformed_body() {
    assert!(matches!(
        parse_links("not json"),
        Err(LookupError::Decode(_))
    ));
}

#[test]
fn test_extract_links_ignores_empty_urls() {
    let response: LinksResponse = serde_json::from_str(
        r#"{"linksByPlatform": {"deezer": {"url": ""}, "tidal": {}}}"#,
    )
    .unwrap();

    assert_eq!(extract_links(&response), PlatformLinks::default());
}

#[tokio::test]
async fn test_resolve_sends_key_and_country() {
    let mut server = Server::new_async().await;
    let lookup = server
        .mock("GET", LINKS_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("url".to_string(), "spotify:track:7".to_string()),
            Matcher::UrlEncoded("key".to_string(), "secret".to_string()),
            Matcher::UrlEncoded("userCountry".to_string(), "DE".to_string()),
        ]))
        .with_status(200)
        .with_body(TIDAL_ONLY)
        .create_async()
        .await;

    let client = odesli(&server)
        .with_api_key("secret")
        .with_user_country("DE");
    let links = client.resolve("spotify:track:7").await.unwrap();

    assert_eq!(links.tidal.as_deref(), Some("https://listen.tidal.com/track/7"));
    assert_eq!(links.youtube, None);
    lookup.assert_async().await;
}

#[tokio::test]
async fn test_resolve_error_status_is_a_failure() {
    let mut server = Server::new_async().await;
    let lookup = server
        .mock("GET", LINKS_PATH)
        .match_query(Matcher::Any)
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let result = odesli(&server).resolve("spotify:track:missing").await;

    assert!(matches!(result, Err(LookupError::Status(StatusCode::NOT_FOUND))));
    lookup.assert_async().await;
}

#[tokio::test]
async fn test_resolve_retries_rate_limit_once() {
    let mut server = Server::new_async().await;
    let limited = server
        .mock("GET", LINKS_PATH)
        .match_query(Matcher::Any)
        .with_status(429)
        .with_header("retry-after", "0")
        .expect(1)
        .create_async()
        .await;
    let ok = server
        .mock("GET", LINKS_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(TIDAL_ONLY)
        .create_async()
        .await;

    let links = odesli(&server).resolve("spotify:track:7").await.unwrap();

    assert!(links.tidal.is_some());
    limited.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test]
async fn test_resolve_second_rate_limit_is_a_failure() {
    let mut server = Server::new_async().await;
    let limited = server
        .mock("GET", LINKS_PATH)
        .match_query(Matcher::Any)
        .with_status(429)
        .with_header("retry-after", "0")
        .expect(2)
        .create_async()
        .await;

    let result = odesli(&server).resolve("spotify:track:7").await;

    assert!(matches!(
        result,
        Err(LookupError::Status(StatusCode::TOO_MANY_REQUESTS))
    ));
    limited.assert_async().await;
}

#[tokio::test]
async fn test_resolve_does_not_wait_past_two_minutes() {
    let mut server = Server::new_async().await;
    let limited = server
        .mock("GET", LINKS_PATH)
        .match_query(Matcher::Any)
        .with_status(429)
        .with_header("retry-after", "121")
        .expect(1)
        .create_async()
        .await;

    let result = odesli(&server).resolve("spotify:track:7").await;

    assert!(matches!(
        result,
        Err(LookupError::Status(StatusCode::TOO_MANY_REQUESTS))
    ));
    limited.assert_async().await;
}
