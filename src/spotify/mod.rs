//! # Spotify Catalog Module
//!
//! This module is the only place that talks to the Spotify Web API. It wraps every
//! outbound call with a cached bearer credential and a bounded retry policy for
//! rate limiting, and converts the raw payloads into catalog records.
//!
//! ## Architecture
//!
//! ```text
//! Sync Orchestrators
//!          ↓
//! CatalogApi (trait)
//!          ↓
//! SpotifyCatalog
//!     ├── TokenCache (client-credentials, expiry-aware)
//!     └── RetryPolicy (429 handling, Retry-After, linear backoff)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Core Modules
//!
//! - [`auth`] - The process-wide [`auth::TokenCache`] and the client-credentials
//!   [`auth::Authenticator`]. A token is reused while the current instant lies
//!   before its expiry and replaced wholesale afterwards.
//! - [`retry`] - The [`retry::RetryPolicy`] value: maximum retries, backoff
//!   function and the retryable-status predicate.
//!
//! ## Rate Limiting
//!
//! - Only `429 Too Many Requests` is retried.
//! - The `Retry-After` header (seconds) is honored when present, otherwise the
//!   delay grows linearly with the retry number.
//! - After the retry budget is spent the call fails with
//!   [`SyncError::ExhaustedRetries`](crate::error::SyncError::ExhaustedRetries).
//! - Every other HTTP or transport failure propagates immediately as an
//!   upstream error.
//!
//! Ids are placed into the request path as single percent-encoded segments.
//!
//! ## API Coverage
//!
//! - `POST /api/token` - Client-credentials exchange
//! - `GET /albums/{id}` - Full album; further track pages are followed via `tracks.next`
//! - `GET /artists/{id}` - Artist profile
//! - `GET /artists/{id}/albums` - Offset-paginated discography
//! - `GET /browse/new-releases` - Currently popular releases

pub mod auth;
pub mod retry;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::{
    config::Settings,
    error::{Result, SyncError},
    types::{
        Album, AlbumResponse, Artist, CatalogAlbum, CatalogArtist, NewReleasesResponse, Page,
        Tracks,
    },
    utils::ReleaseKinds,
};

use self::{
    auth::{Authenticator, ClientCredentials, TokenCache},
    retry::{Attempt, RetryPolicy},
};

/// The catalog operations the sync orchestrators depend on.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Full album detail, including tracks.
    async fn get_album(&self, id: &str) -> Result<CatalogAlbum>;

    /// Full artist profile.
    async fn get_artist(&self, id: &str) -> Result<CatalogArtist>;

    /// One page of an artist's releases of the given kinds.
    async fn list_artist_albums(
        &self,
        artist_id: &str,
        kinds: &ReleaseKinds,
        offset: u32,
        limit: u32,
    ) -> Result<Page<CatalogAlbum>>;

    /// One page of currently popular new releases.
    async fn list_new_releases(&self, limit: u32) -> Result<Vec<CatalogAlbum>>;
}

/// Rate-limited Spotify Web API client.
pub struct SpotifyCatalog<A = ClientCredentials> {
    client: Client,
    api_url: String,
    tokens: TokenCache<A>,
    retry: RetryPolicy,
}

impl SpotifyCatalog<ClientCredentials> {
    /// Builds a client authenticating with the configured client credentials.
    pub fn from_settings(settings: &Settings) -> Self {
        let client = Client::new();
        let authenticator = ClientCredentials::new(
            client.clone(),
            settings.spotify_token_url.clone(),
            settings.spotify_client_id.clone(),
            settings.spotify_client_secret.clone(),
        );

        Self::new(
            client,
            settings.spotify_api_url.clone(),
            authenticator,
            settings.retry.clone(),
        )
    }
}

impl<A: Authenticator> SpotifyCatalog<A> {
    pub fn new(client: Client, api_url: String, authenticator: A, retry: RetryPolicy) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            tokens: TokenCache::new(authenticator),
            retry,
        }
    }

    /// Builds `{api_url}/{segments..}?{query}`.
    ///
    /// Every segment is percent-encoded on its own, so an id can never add
    /// path segments, a query or a fragment to the request.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(&self.api_url).map_err(|e| {
            SyncError::Configuration(format!("invalid catalog url '{}': {}", self.api_url, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                SyncError::Configuration(format!("catalog url '{}' has no path", self.api_url))
            })?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Parses a `next` link returned by the catalog. Links pointing anywhere
    /// but the configured API are refused.
    fn next_page(&self, next: &str) -> Result<Url> {
        if !next.starts_with(&format!("{}/", self.api_url)) {
            return Err(SyncError::Upstream(format!(
                "refusing to follow next link outside the catalog: {}",
                next
            )));
        }

        Url::parse(next)
            .map_err(|e| SyncError::Upstream(format!("invalid next link '{}': {}", next, e)))
    }

    /// Issues `GET url` and decodes the JSON body.
    ///
    /// Every attempt asks the token cache for a token, so a credential that
    /// expires while waiting out a rate limit is refreshed before the retry.
    pub async fn call<T: DeserializeOwned + Send>(&self, url: Url) -> Result<T> {
        let endpoint = url.path().to_string();
        let endpoint = endpoint.as_str();
        let url = &url;
        let client = &self.client;
        let tokens = &self.tokens;
        let policy = &self.retry;

        self.retry
            .execute(endpoint, move || async move {
                let token = tokens.get_token().await?;
                let response = client.get(url.clone()).bearer_auth(token).send().await?;

                let status = response.status();
                if policy.is_retryable(status) {
                    return Ok(Attempt::RateLimited(retry::retry_after(response.headers())));
                }

                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(SyncError::Upstream(format!(
                        "GET {} returned {}: {}",
                        endpoint, status, body
                    )));
                }

                Ok(Attempt::Done(response.json::<T>().await?))
            })
            .await
    }
}

#[async_trait]
impl<A: Authenticator> CatalogApi for SpotifyCatalog<A> {
    /// Fetches the album and then every further page of its track listing.
    async fn get_album(&self, id: &str) -> Result<CatalogAlbum> {
        let mut album: Album = self.call(self.endpoint(&["albums", id], &[])?).await?;

        if let Some(tracks) = album.tracks.as_mut() {
            while let Some(next) = tracks.next.take() {
                let page: Tracks = self.call(self.next_page(&next)?).await?;
                tracks.items.extend(page.items);
                tracks.next = page.next;
            }
        }

        Ok(album.into())
    }

    async fn get_artist(&self, id: &str) -> Result<CatalogArtist> {
        let artist: Artist = self.call(self.endpoint(&["artists", id], &[])?).await?;
        Ok(artist.into())
    }

    async fn list_artist_albums(
        &self,
        artist_id: &str,
        kinds: &ReleaseKinds,
        offset: u32,
        limit: u32,
    ) -> Result<Page<CatalogAlbum>> {
        let url = self.endpoint(
            &["artists", artist_id, "albums"],
            &[
                ("include_groups", kinds.to_string()),
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
            ],
        )?;
        let response: AlbumResponse = self.call(url).await?;

        Ok(Page {
            has_next: response.next.is_some(),
            items: response.items.into_iter().map(CatalogAlbum::from).collect(),
        })
    }

    async fn list_new_releases(&self, limit: u32) -> Result<Vec<CatalogAlbum>> {
        let url = self.endpoint(&["browse", "new-releases"], &[("limit", limit.to_string())])?;
        let response: NewReleasesResponse = self.call(url).await?;

        Ok(response
            .albums
            .items
            .into_iter()
            .map(CatalogAlbum::from)
            .collect())
    }
}
