//! # Record Store Module
//!
//! The relational backend holding the synchronized album and artist rows,
//! reached through its PostgREST interface. Every row is keyed by the catalog's
//! own id, so writes are plain upserts with replace-on-conflict semantics and
//! repeating one is harmless.
//!
//! - [`RecordStore`] - the four operations the orchestrators need
//! - [`PostgrestStore`] - the HTTP implementation used in production
//! - [`gateway`] - maps catalog records onto rows and writes them in bulk

pub mod gateway;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;

use crate::{
    config::Settings,
    error::{Result, SyncError},
    types::{IdRow, StoredAlbum, StoredArtist},
};

pub use gateway::UpsertGateway;

pub const ALBUMS_TABLE: &str = "albums";
pub const ARTISTS_TABLE: &str = "artists";

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Ids of up to `limit` albums whose track list has never been filled.
    async fn select_albums_missing_tracks(&self, limit: u32) -> Result<Vec<String>>;

    /// One page of stored artist ids, in stable id order.
    async fn select_artist_ids(&self, offset: u32, limit: u32) -> Result<Vec<String>>;

    /// Inserts or replaces album rows keyed by id.
    async fn upsert_albums(&self, rows: &[StoredAlbum]) -> Result<()>;

    /// Inserts or replaces artist rows keyed by id.
    async fn upsert_artists(&self, rows: &[StoredArtist]) -> Result<()>;
}

/// Record store client speaking PostgREST (as exposed by Supabase).
pub struct PostgrestStore {
    client: Client,
    rest_url: String,
    service_key: String,
}

impl PostgrestStore {
    pub fn new(client: Client, base_url: &str, service_key: String) -> Self {
        Self {
            client,
            rest_url: format!("{}/rest/v1", base_url.trim_end_matches('/')),
            service_key,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Client::new(),
            &settings.store_url,
            settings.store_service_key.clone(),
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn select_ids(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<String>> {
        let request = self
            .client
            .get(format!("{}/{}", self.rest_url, table))
            .query(query);

        let response = checked(self.authorized(request).send().await?, table).await?;
        let rows = response.json::<Vec<IdRow>>().await?;
        Ok(rows.into_iter().map(|r| r.id).collect())
    }

    async fn upsert<T: Serialize + Sync>(&self, table: &str, rows: &[T]) -> Result<()> {
        let request = self
            .client
            .post(format!("{}/{}", self.rest_url, table))
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows);

        checked(self.authorized(request).send().await?, table).await?;
        Ok(())
    }
}

async fn checked(response: Response, table: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(SyncError::Upstream(format!(
        "record store request on {} failed with {}: {}",
        table, status, body
    )))
}

#[async_trait]
impl RecordStore for PostgrestStore {
    async fn select_albums_missing_tracks(&self, limit: u32) -> Result<Vec<String>> {
        self.select_ids(
            ALBUMS_TABLE,
            &[
                ("select", "id".to_string()),
                ("tracks", "is.null".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn select_artist_ids(&self, offset: u32, limit: u32) -> Result<Vec<String>> {
        self.select_ids(
            ARTISTS_TABLE,
            &[
                ("select", "id".to_string()),
                ("order", "id.asc".to_string()),
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn upsert_albums(&self, rows: &[StoredAlbum]) -> Result<()> {
        self.upsert(ALBUMS_TABLE, rows).await
    }

    async fn upsert_artists(&self, rows: &[StoredArtist]) -> Result<()> {
        self.upsert(ARTISTS_TABLE, rows).await
    }
}
