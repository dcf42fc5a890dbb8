use std::{collections::BTreeSet, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::utils::{self, ReleaseKind};

// Spotify Web API payloads

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    pub duration_ms: u64,
    pub track_number: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tracks {
    pub items: Vec<Track>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<AlbumArtist>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub release_date: Option<String>,
    pub album_type: Option<String>,
    pub popularity: Option<u8>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub tracks: Option<Tracks>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumResponse {
    pub items: Vec<Album>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReleasesResponse {
    pub albums: AlbumResponse,
}

// Catalog records

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogTrack {
    pub id: String,
    pub name: String,
    pub duration_seconds: u64,
    pub track_number: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogAlbum {
    pub id: String,
    pub name: String,
    pub primary_artist_name: Option<String>,
    pub primary_artist_id: Option<String>,
    pub cover_url: Option<String>,
    pub release_date: Option<String>,
    pub album_type: ReleaseKind,
    pub popularity: Option<u8>,
    pub external_url: Option<String>,
    pub tracks: Option<Vec<CatalogTrack>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogArtist {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub external_url: Option<String>,
    pub genres: BTreeSet<String>,
}

/// One page of an offset-paginated catalog listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next: bool,
}

impl Track {
    fn into_catalog(self) -> Option<CatalogTrack> {
        // local files carry no catalog id
        let id = self.id?;
        Some(CatalogTrack {
            id,
            name: self.name,
            duration_seconds: utils::ms_to_seconds(self.duration_ms),
            track_number: self.track_number,
        })
    }
}

impl From<Album> for CatalogAlbum {
    fn from(album: Album) -> Self {
        let primary = album.artists.into_iter().next();
        let album_type = album
            .album_type
            .as_deref()
            .and_then(|t| t.parse::<ReleaseKind>().ok())
            .unwrap_or(ReleaseKind::Album);

        CatalogAlbum {
            id: album.id,
            name: album.name,
            primary_artist_id: primary.as_ref().and_then(|a| a.id.clone()),
            primary_artist_name: primary.map(|a| a.name),
            cover_url: album.images.into_iter().next().map(|i| i.url),
            release_date: album.release_date,
            album_type,
            popularity: album.popularity,
            external_url: album.external_urls.spotify,
            tracks: album.tracks.map(|t| {
                t.items
                    .into_iter()
                    .filter_map(Track::into_catalog)
                    .collect()
            }),
        }
    }
}

impl From<Artist> for CatalogArtist {
    fn from(artist: Artist) -> Self {
        CatalogArtist {
            id: artist.id,
            name: artist.name,
            image_url: artist.images.into_iter().next().map(|i| i.url),
            external_url: artist.external_urls.spotify,
            genres: artist.genres.into_iter().collect(),
        }
    }
}

// Record store rows

pub const UNKNOWN_ARTIST: &str = "unknown";
pub const PLACEHOLDER_COVER_URL: &str = "https://placehold.co/300x300?text=No+Cover";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTrack {
    pub id: String,
    pub name: String,
    pub duration: u64,
    pub track_number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAlbum {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub artist_id: Option<String>,
    pub cover_url: String,
    pub release_date: Option<String>,
    pub album_type: ReleaseKind,
    pub popularity: u8,
    pub spotify_url: Option<String>,
    // omitted so a listing-only record never wipes a stored track list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracks: Option<Vec<StoredTrack>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredArtist {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub spotify_url: Option<String>,
    pub genres: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdRow {
    pub id: String,
}

impl StoredAlbum {
    /// Projects a catalog album onto its stored row, filling absent fields
    /// with their defaults and stamping `updated_at`.
    pub fn project(album: CatalogAlbum, updated_at: DateTime<Utc>) -> Self {
        StoredAlbum {
            id: album.id,
            name: album.name,
            artist: album
                .primary_artist_name
                .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            artist_id: album.primary_artist_id,
            cover_url: album
                .cover_url
                .unwrap_or_else(|| PLACEHOLDER_COVER_URL.to_string()),
            release_date: album.release_date,
            album_type: album.album_type,
            popularity: album.popularity.unwrap_or(0),
            spotify_url: album.external_url,
            tracks: album.tracks.map(|tracks| {
                tracks
                    .into_iter()
                    .map(|t| StoredTrack {
                        id: t.id,
                        name: t.name,
                        duration: t.duration_seconds,
                        track_number: t.track_number,
                    })
                    .collect()
            }),
            updated_at,
        }
    }
}

impl StoredArtist {
    /// Projects a catalog artist onto its stored row.
    pub fn project(artist: CatalogArtist, updated_at: DateTime<Utc>) -> Self {
        StoredArtist {
            id: artist.id,
            name: artist.name,
            image_url: artist.image_url,
            spotify_url: artist.external_url,
            genres: artist.genres.into_iter().collect(),
            updated_at,
        }
    }
}

// Sync reports

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncJob {
    PopularAlbums,
    ArtistDiscography,
    AlbumTracks,
    ArtistProfiles,
}

impl fmt::Display for SyncJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncJob::PopularAlbums => "popular-albums",
            SyncJob::ArtistDiscography => "artist-discography",
            SyncJob::AlbumTracks => "album-tracks",
            SyncJob::ArtistProfiles => "artist-profiles",
        };
        f.write_str(s)
    }
}

/// Outcome of one orchestrator run, returned as the JSON body of a
/// successful request.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub job: SyncJob,
    pub message: String,
    pub count: usize,
    pub pages: usize,
}

#[derive(Tabled)]
pub struct ReportTableRow {
    pub job: String,
    pub pages: usize,
    pub written: usize,
    pub message: String,
}

impl From<&SyncReport> for ReportTableRow {
    fn from(report: &SyncReport) -> Self {
        ReportTableRow {
            job: report.job.to_string(),
            pages: report.pages,
            written: report.count,
            message: report.message.clone(),
        }
    }
}
