//! # Sync Orchestrators
//!
//! Four independent jobs, each a straight-line procedure driving the catalog
//! client and the upsert gateway:
//!
//! - [`sync_popular_albums`] - one page of new releases, upserted as is
//! - [`sync_artist_discography`] - every release of one artist, with tracks
//! - [`backfill_album_tracks`] - fills stored albums that have no track list
//! - [`backfill_artist_profiles`] - refreshes every stored artist's profile
//!
//! ## Failure Policy
//!
//! Detail fetches inside a batch run concurrently and the batch waits for all
//! of them to settle. A single failed fetch is logged and the item is dropped.
//! A failed listing or store write, or a failed catalog authentication,
//! aborts the run. Nothing is checkpointed: rows that are still missing data
//! are picked up again by the next run.

mod discography;
mod popular;
mod profiles;
mod tracks;

use std::sync::Arc;

use futures::future::join_all;

pub use discography::sync_artist_discography;
pub use popular::sync_popular_albums;
pub use profiles::backfill_artist_profiles;
pub use tracks::backfill_album_tracks;

use crate::{
    config::{Settings, SyncOptions},
    error::{Result, SyncError},
    spotify::{CatalogApi, SpotifyCatalog},
    store::{PostgrestStore, RecordStore},
    types::{CatalogAlbum, CatalogArtist},
    warning,
};

/// The collaborators shared by every sync job.
#[derive(Clone)]
pub struct SyncContext {
    pub catalog: Arc<dyn CatalogApi>,
    pub store: Arc<dyn RecordStore>,
    pub options: SyncOptions,
}

impl SyncContext {
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        store: Arc<dyn RecordStore>,
        options: SyncOptions,
    ) -> Self {
        Self {
            catalog,
            store,
            options,
        }
    }

    /// Wires the Spotify client and the PostgREST store from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Arc::new(SpotifyCatalog::from_settings(settings)),
            Arc::new(PostgrestStore::from_settings(settings)),
            settings.options.clone(),
        )
    }
}

/// Fetches full album details for `ids` concurrently.
///
/// Waits for every fetch to settle, then keeps the successful ones.
pub(crate) async fn fetch_albums<C: CatalogApi + ?Sized>(
    catalog: &C,
    ids: &[String],
) -> Result<Vec<CatalogAlbum>> {
    let results = join_all(ids.iter().map(|id| catalog.get_album(id))).await;
    settle(ids, results, "album")
}

/// Fetches full artist profiles for `ids` concurrently.
pub(crate) async fn fetch_artists<C: CatalogApi + ?Sized>(
    catalog: &C,
    ids: &[String],
) -> Result<Vec<CatalogArtist>> {
    let results = join_all(ids.iter().map(|id| catalog.get_artist(id))).await;
    settle(ids, results, "artist")
}

fn settle<T>(ids: &[String], results: Vec<Result<T>>, kind: &str) -> Result<Vec<T>> {
    let mut settled: Vec<Option<T>> = Vec::with_capacity(results.len());
    for (id, result) in ids.iter().zip(results) {
        match result {
            Ok(item) => settled.push(Some(item)),
            Err(e @ SyncError::Authentication(_)) => return Err(e),
            Err(e) => {
                warning!("Skipping {} {}: {}", kind, id, e);
                settled.push(None);
            }
        }
    }

    Ok(settled.into_iter().flatten().collect())
}
