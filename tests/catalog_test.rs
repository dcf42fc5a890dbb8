use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use sporlsync::{
    error::SyncError,
    spotify::{
        CatalogApi, SpotifyCatalog,
        auth::ClientCredentials,
        retry::RetryPolicy,
    },
    utils::{ReleaseKind, ReleaseKinds},
};

/// base64("id:secret")
const BASIC_AUTH: &str = "Basic aWQ6c2VjcmV0";
const DISCOGRAPHY: usize = 3;

#[derive(Default)]
struct FakeSpotify {
    token_calls: AtomicUsize,
    album_hits: AtomicUsize,
    /// How many of the next album requests answer 429.
    rate_limited: AtomicUsize,
    send_retry_after: AtomicBool,
    expires_in: AtomicU64,
    fail_token: AtomicBool,
    track_page_hits: AtomicUsize,
}

type Shared = State<Arc<FakeSpotify>>;

async fn token(State(fake): Shared, headers: HeaderMap) -> Response {
    let n = fake.token_calls.fetch_add(1, Ordering::SeqCst);
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == BASIC_AUTH);

    if fake.fail_token.load(Ordering::SeqCst) || !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid_client" })),
        )
            .into_response();
    }

    Json(json!({
        "access_token": format!("token-{}", n),
        "token_type": "Bearer",
        "expires_in": fake.expires_in.load(Ordering::SeqCst),
    }))
    .into_response()
}

fn bearer(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer token-"))
}

fn album_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Body Talk",
        "artists": [{ "id": "robyn", "name": "Robyn" }],
        "images": [{ "url": format!("https://i.scdn.co/image/{}", id) }],
        "release_date": "2010-06-04",
        "album_type": "album",
        "popularity": 70,
        "external_urls": { "spotify": format!("https://open.spotify.com/album/{}", id) },
        "tracks": { "items": [
            { "id": "t1", "name": "Dancing On My Own", "duration_ms": 287000, "track_number": 1 },
            { "id": null, "name": "Local File", "duration_ms": 1000, "track_number": 2 },
        ]}
    })
}

async fn album(State(fake): Shared, Path(id): Path<String>, headers: HeaderMap) -> Response {
    fake.album_hits.fetch_add(1, Ordering::SeqCst);
    if !bearer(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let limited = fake
        .rate_limited
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if limited {
        if fake.send_retry_after.load(Ordering::SeqCst) {
            return (StatusCode::TOO_MANY_REQUESTS, [("retry-after", "0")]).into_response();
        }
        return StatusCode::TOO_MANY_REQUESTS.into_response();
    }

    if id == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "status": 404, "message": "Non existing id" } })),
        )
            .into_response();
    }

    let mut body = album_json(&id);
    let host = headers
        .get("host")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    match id.as_str() {
        "long" => {
            body["tracks"]["next"] = json!(format!(
                "http://{}/v1/albums/long/tracks?offset=2&limit=2",
                host
            ));
        }
        "foreign" => {
            body["tracks"]["next"] = json!("http://catalog.invalid/v1/me/following");
        }
        _ => {}
    }

    Json(body).into_response()
}

async fn album_tracks(
    State(fake): Shared,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    fake.track_page_hits.fetch_add(1, Ordering::SeqCst);
    if !bearer(&headers) || id != "long" {
        return StatusCode::NOT_FOUND.into_response();
    }

    let host = headers
        .get("host")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let offset: u32 = query.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    // two follow-up pages of one track each, then the end
    let next = (offset < 3).then(|| {
        format!(
            "http://{}/v1/albums/long/tracks?offset={}&limit=1",
            host,
            offset + 1
        )
    });

    Json(json!({
        "items": [{
            "id": format!("t{}", offset + 1),
            "name": "Hang With Me",
            "duration_ms": 259000,
            "track_number": offset + 1,
        }],
        "next": next,
    }))
    .into_response()
}

async fn artist(Path(id): Path<String>, headers: HeaderMap) -> Response {
    if !bearer(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    Json(json!({
        "id": id,
        "name": "Robyn",
        "images": [],
        "external_urls": { "spotify": format!("https://open.spotify.com/artist/{}", id) },
        "genres": ["swedish pop", "dance pop", "swedish pop"],
    }))
    .into_response()
}

async fn artist_albums(
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if query.get("include_groups").map(String::as_str) != Some("album,single") {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let offset: usize = query.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    let limit: usize = query.get("limit").and_then(|v| v.parse().ok()).unwrap_or(20);
    let end = (offset + limit).min(DISCOGRAPHY);
    let items: Vec<_> = (offset.min(end)..end)
        .map(|i| album_json(&format!("{}-{}", id, i)))
        .collect();
    let next = (end < DISCOGRAPHY).then(|| format!("/artists/{}/albums?offset={}", id, end));

    Json(json!({ "items": items, "next": next })).into_response()
}

async fn new_releases(Query(query): Query<HashMap<String, String>>) -> Response {
    let limit: usize = query.get("limit").and_then(|v| v.parse().ok()).unwrap_or(20);
    let items: Vec<_> = (0..limit.min(2))
        .map(|i| album_json(&format!("new-{}", i)))
        .collect();

    Json(json!({ "albums": { "items": items, "next": null } })).into_response()
}

async fn spawn(fake: Arc<FakeSpotify>) -> String {
    let app = Router::new()
        .route("/api/token", post(token))
        .route("/v1/albums/{id}", get(album))
        .route("/v1/albums/{id}/tracks", get(album_tracks))
        .route("/v1/artists/{id}", get(artist))
        .route("/v1/artists/{id}/albums", get(artist_albums))
        .route("/v1/browse/new-releases", get(new_releases))
        .with_state(fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn catalog(base: &str) -> SpotifyCatalog {
    let client = reqwest::Client::new();
    let credentials = ClientCredentials::new(
        client.clone(),
        format!("{}/api/token", base),
        "id".to_string(),
        "secret".to_string(),
    );
    let retry = RetryPolicy {
        base_delay: Duration::ZERO,
        ..RetryPolicy::default()
    };

    SpotifyCatalog::new(client, format!("{}/v1", base), credentials, retry)
}

fn fake(expires_in: u64) -> Arc<FakeSpotify> {
    let fake = FakeSpotify::default();
    fake.expires_in.store(expires_in, Ordering::SeqCst);
    Arc::new(fake)
}

#[tokio::test]
async fn test_album_maps_to_catalog_record() {
    let fake = fake(3600);
    let catalog = catalog(&spawn(fake.clone()).await);

    let album = catalog.get_album("body-talk").await.unwrap();

    assert_eq!(album.id, "body-talk");
    assert_eq!(album.primary_artist_name.as_deref(), Some("Robyn"));
    assert_eq!(album.primary_artist_id.as_deref(), Some("robyn"));
    assert_eq!(album.album_type, ReleaseKind::Album);
    assert_eq!(album.popularity, Some(70));
    let tracks = album.tracks.unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].duration_seconds, 287);
}

#[tokio::test]
async fn test_token_reused_until_expiry() {
    let fake = fake(3600);
    let catalog = catalog(&spawn(fake.clone()).await);

    for id in ["a", "b", "c"] {
        catalog.get_album(id).await.unwrap();
    }
    catalog.get_artist("robyn").await.unwrap();

    assert_eq!(fake.token_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_expired_token_is_refreshed() {
    let fake = fake(0);
    let catalog = catalog(&spawn(fake.clone()).await);

    catalog.get_album("a").await.unwrap();
    catalog.get_album("b").await.unwrap();

    assert_eq!(fake.token_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_concurrent_calls_share_one_token() {
    let fake = fake(3600);
    let catalog = catalog(&spawn(fake.clone()).await);

    let calls = (0..8).map(|i| {
        let catalog = &catalog;
        async move { catalog.get_album(&format!("a{}", i)).await }
    });
    let results = futures::future::join_all(calls).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(fake.token_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rate_limit_retried_with_retry_after() {
    let fake = fake(3600);
    fake.rate_limited.store(3, Ordering::SeqCst);
    fake.send_retry_after.store(true, Ordering::SeqCst);
    let catalog = catalog(&spawn(fake.clone()).await);

    catalog.get_album("a").await.unwrap();

    assert_eq!(fake.album_hits.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_rate_limit_retried_with_backoff() {
    let fake = fake(3600);
    fake.rate_limited.store(2, Ordering::SeqCst);
    let catalog = catalog(&spawn(fake.clone()).await);

    catalog.get_album("a").await.unwrap();

    assert_eq!(fake.album_hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_rate_limit_exhausts_retries() {
    let fake = fake(3600);
    fake.rate_limited.store(4, Ordering::SeqCst);
    let catalog = catalog(&spawn(fake.clone()).await);

    let err = catalog.get_album("a").await.unwrap_err();

    assert!(matches!(err, SyncError::ExhaustedRetries { .. }));
    assert_eq!(err.kind(), "ExhaustedRetries");
    assert_eq!(fake.album_hits.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let fake = fake(3600);
    let catalog = catalog(&spawn(fake.clone()).await);

    let err = catalog.get_album("missing").await.unwrap_err();

    assert!(matches!(err, SyncError::Upstream(_)));
    assert_eq!(fake.album_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rejected_credentials_fail_authentication() {
    let fake = fake(3600);
    fake.fail_token.store(true, Ordering::SeqCst);
    let catalog = catalog(&spawn(fake.clone()).await);

    let err = catalog.get_album("a").await.unwrap_err();

    assert!(matches!(err, SyncError::Authentication(_)));
    assert_eq!(fake.token_calls.load(Ordering::SeqCst), 1);
    assert_eq!(fake.album_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_artist_genres_deduplicated() {
    let fake = fake(3600);
    let catalog = catalog(&spawn(fake.clone()).await);

    let artist = catalog.get_artist("robyn").await.unwrap();

    assert_eq!(artist.name, "Robyn");
    assert_eq!(artist.image_url, None);
    assert_eq!(
        artist.genres.into_iter().collect::<Vec<_>>(),
        vec!["dance pop", "swedish pop"]
    );
}

#[tokio::test]
async fn test_artist_albums_paginate() {
    let fake = fake(3600);
    let catalog = catalog(&spawn(fake.clone()).await);
    let kinds = ReleaseKinds([ReleaseKind::Album, ReleaseKind::Single].into_iter().collect());

    let first = catalog
        .list_artist_albums("robyn", &kinds, 0, 2)
        .await
        .unwrap();
    assert_eq!(first.items.len(), 2);
    assert!(first.has_next);

    let last = catalog
        .list_artist_albums("robyn", &kinds, 2, 2)
        .await
        .unwrap();
    assert_eq!(last.items.len(), 1);
    assert_eq!(last.items[0].id, "robyn-2");
    assert!(!last.has_next);
}

#[tokio::test]
async fn test_new_releases_single_page() {
    let fake = fake(3600);
    let catalog = catalog(&spawn(fake.clone()).await);

    let albums = catalog.list_new_releases(50).await.unwrap();

    assert_eq!(albums.len(), 2);
    assert_eq!(albums[0].id, "new-0");
}

#[tokio::test]
async fn test_album_id_is_a_single_path_segment() {
    let fake = fake(3600);
    let catalog = catalog(&spawn(fake.clone()).await);

    let album = catalog.get_album("a?b#c").await.unwrap();

    assert_eq!(album.id, "a?b#c");
    assert_eq!(fake.album_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_artist_id_cannot_escape_artist_albums() {
    let fake = fake(3600);
    let catalog = catalog(&spawn(fake.clone()).await);
    let kinds = ReleaseKinds([ReleaseKind::Album, ReleaseKind::Single].into_iter().collect());

    let page = catalog
        .list_artist_albums("../me/following?type=artist#", &kinds, 0, 1)
        .await
        .unwrap();

    // answered by the artist-albums route with the id intact
    assert_eq!(page.items[0].id, "../me/following?type=artist#-0");
}

#[tokio::test]
async fn test_album_follows_track_pages() {
    let fake = fake(3600);
    let catalog = catalog(&spawn(fake.clone()).await);

    let album = catalog.get_album("long").await.unwrap();

    let tracks = album.tracks.unwrap();
    let ids: Vec<_> = tracks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t3", "t4"]);
    assert_eq!(tracks[2].track_number, 4);
    assert_eq!(fake.track_page_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_album_refuses_foreign_next_link() {
    let fake = fake(3600);
    let catalog = catalog(&spawn(fake.clone()).await);

    let err = catalog.get_album("foreign").await.unwrap_err();

    assert!(matches!(err, SyncError::Upstream(_)));
    assert_eq!(fake.track_page_hits.load(Ordering::SeqCst), 0);
}
