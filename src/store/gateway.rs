use chrono::Utc;

use crate::{
    error::Result,
    store::RecordStore,
    types::{CatalogAlbum, CatalogArtist, StoredAlbum, StoredArtist},
};

/// Maps catalog records onto stored rows and writes each batch in one call.
///
/// Absent fields get their stored defaults (`unknown` artist, placeholder
/// cover, zero popularity) and every row of a batch is stamped with the same
/// `updated_at`. Rows are keyed by the catalog id, so repeating a batch only
/// moves `updated_at`.
///
/// # Errors
///
/// A batch is all-or-nothing from the caller's point of view: a failed write
/// surfaces the store error and reports nothing about individual rows.
///
/// # Example
///
/// ```
/// let gateway = UpsertGateway::new(ctx.store.as_ref());
/// let albums = fetch_albums(ctx.catalog.as_ref(), &ids).await?;
/// let written = gateway.upsert_albums(albums).await?;
/// info!("Wrote {} albums", written);
/// ```
pub struct UpsertGateway<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> UpsertGateway<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Upserts albums and returns how many rows were written.
    ///
    /// An empty batch returns zero without touching the store.
    pub async fn upsert_albums(&self, albums: Vec<CatalogAlbum>) -> Result<usize> {
        if albums.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let rows: Vec<StoredAlbum> = albums
            .into_iter()
            .map(|album| StoredAlbum::project(album, now))
            .collect();

        self.store.upsert_albums(&rows).await?;
        Ok(rows.len())
    }

    /// Upserts artists and returns how many rows were written.
    ///
    /// An empty batch returns zero without touching the store.
    pub async fn upsert_artists(&self, artists: Vec<CatalogArtist>) -> Result<usize> {
        if artists.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let rows: Vec<StoredArtist> = artists
            .into_iter()
            .map(|artist| StoredArtist::project(artist, now))
            .collect();

        self.store.upsert_artists(&rows).await?;
        Ok(rows.len())
    }
}
