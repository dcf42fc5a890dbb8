#![allow(dead_code)]

use std::{
    collections::{BTreeMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use sporlsync::{
    config::SyncOptions,
    error::{Result, SyncError},
    spotify::CatalogApi,
    store::RecordStore,
    sync::SyncContext,
    types::{CatalogAlbum, CatalogArtist, CatalogTrack, Page, StoredAlbum, StoredArtist},
    utils::{ReleaseKind, ReleaseKinds},
};

pub fn album(id: &str) -> CatalogAlbum {
    CatalogAlbum {
        id: id.to_string(),
        name: format!("Album {}", id),
        primary_artist_name: Some("Tove Lo".to_string()),
        primary_artist_id: Some("artist-1".to_string()),
        cover_url: Some(format!("https://i.scdn.co/image/{}", id)),
        release_date: Some("2024-01-05".to_string()),
        album_type: ReleaseKind::Album,
        popularity: Some(61),
        external_url: Some(format!("https://open.spotify.com/album/{}", id)),
        tracks: None,
    }
}

pub fn album_with_tracks(id: &str) -> CatalogAlbum {
    CatalogAlbum {
        tracks: Some(vec![CatalogTrack {
            id: format!("{}-t1", id),
            name: "Opener".to_string(),
            duration_seconds: 125,
            track_number: 1,
        }]),
        ..album(id)
    }
}

pub fn artist(id: &str) -> CatalogArtist {
    CatalogArtist {
        id: id.to_string(),
        name: format!("Artist {}", id),
        image_url: None,
        external_url: Some(format!("https://open.spotify.com/artist/{}", id)),
        genres: ["pop".to_string(), "electropop".to_string()]
            .into_iter()
            .collect(),
    }
}

/// In-memory catalog with call counters.
#[derive(Default)]
pub struct FakeCatalog {
    /// Size of the discography every artist has.
    pub discography_size: usize,
    pub new_releases: usize,
    /// Ids whose detail fetch fails with an upstream error.
    pub failing: HashSet<String>,
    /// Every detail fetch fails with an authentication error.
    pub auth_broken: bool,
    pub listing_calls: AtomicUsize,
    pub album_calls: AtomicUsize,
    pub artist_calls: AtomicUsize,
}

impl FakeCatalog {
    fn check(&self, id: &str) -> Result<()> {
        if self.auth_broken {
            return Err(SyncError::Authentication("invalid_client".to_string()));
        }
        if self.failing.contains(id) {
            return Err(SyncError::Upstream(format!("GET /{} returned 404", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn get_album(&self, id: &str) -> Result<CatalogAlbum> {
        self.album_calls.fetch_add(1, Ordering::SeqCst);
        self.check(id)?;
        Ok(album_with_tracks(id))
    }

    async fn get_artist(&self, id: &str) -> Result<CatalogArtist> {
        self.artist_calls.fetch_add(1, Ordering::SeqCst);
        self.check(id)?;
        Ok(artist(id))
    }

    async fn list_artist_albums(
        &self,
        _artist_id: &str,
        _kinds: &ReleaseKinds,
        offset: u32,
        limit: u32,
    ) -> Result<Page<CatalogAlbum>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        let start = (offset as usize).min(self.discography_size);
        let end = (start + limit as usize).min(self.discography_size);

        Ok(Page {
            items: (start..end).map(|i| album(&format!("d{}", i))).collect(),
            has_next: end < self.discography_size,
        })
    }

    async fn list_new_releases(&self, limit: u32) -> Result<Vec<CatalogAlbum>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        let n = self.new_releases.min(limit as usize);
        Ok((0..n).map(|i| album(&format!("new{}", i))).collect())
    }
}

/// In-memory record store keyed by id, with replace-on-conflict upserts.
#[derive(Default)]
pub struct MemoryStore {
    pub albums: Mutex<BTreeMap<String, StoredAlbum>>,
    pub artists: Mutex<BTreeMap<String, StoredArtist>>,
    pub artist_ids: Vec<String>,
    pub fail_writes: bool,
    pub album_writes: AtomicUsize,
    pub artist_writes: AtomicUsize,
    pub select_calls: AtomicUsize,
}

impl MemoryStore {
    /// Seeds albums that have no track list yet.
    pub fn with_albums_missing_tracks(ids: &[String]) -> Self {
        let store = MemoryStore::default();
        {
            let mut albums = store.albums.lock().unwrap();
            for id in ids {
                let row = StoredAlbum::project(album(id), chrono::Utc::now());
                albums.insert(id.clone(), row);
            }
        }
        store
    }

    pub fn album(&self, id: &str) -> Option<StoredAlbum> {
        self.albums.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select_albums_missing_tracks(&self, limit: u32) -> Result<Vec<String>> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .albums
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.tracks.is_none())
            .take(limit as usize)
            .map(|a| a.id.clone())
            .collect())
    }

    async fn select_artist_ids(&self, offset: u32, limit: u32) -> Result<Vec<String>> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .artist_ids
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn upsert_albums(&self, rows: &[StoredAlbum]) -> Result<()> {
        self.album_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(SyncError::Upstream("insert into albums failed".to_string()));
        }
        let mut albums = self.albums.lock().unwrap();
        for row in rows {
            albums.insert(row.id.clone(), row.clone());
        }
        Ok(())
    }

    async fn upsert_artists(&self, rows: &[StoredArtist]) -> Result<()> {
        self.artist_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(SyncError::Upstream("insert into artists failed".to_string()));
        }
        let mut artists = self.artists.lock().unwrap();
        for row in rows {
            artists.insert(row.id.clone(), row.clone());
        }
        Ok(())
    }
}

/// Options with the pauses removed so tests run instantly.
pub fn fast_options() -> SyncOptions {
    SyncOptions {
        track_batch_pause: Duration::ZERO,
        track_page_pause: Duration::ZERO,
        artist_page_pause: Duration::ZERO,
        ..SyncOptions::default()
    }
}

pub fn context(catalog: Arc<FakeCatalog>, store: Arc<MemoryStore>) -> SyncContext {
    SyncContext::new(catalog, store, fast_options())
}

pub fn ids(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{}{:03}", prefix, i)).collect()
}
