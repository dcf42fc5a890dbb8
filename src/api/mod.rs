//! # API Module
//!
//! HTTP handlers exposing each sync job as its own endpoint.
//!
//! ## Endpoints
//!
//! - `POST /sync/popular-albums` - [`popular_albums`]
//! - `POST /sync/artist-discography` - [`artist_discography`], body
//!   `{"artistId": "...", "includeGroups": "album,single"}` (groups optional)
//! - `POST /backfill/album-tracks` - [`album_tracks`]
//! - `POST /backfill/artist-profiles` - [`artist_profiles`]
//! - `OPTIONS` on each of the above - [`preflight`]
//! - `GET /health` - [`health`]
//!
//! Successful runs answer `200` with the run's report (`message`, `count`).
//! Any failure, including a missing `artistId`, answers `500` with
//! `{"error": <kind>, "details": <message>}`. All sync responses carry
//! permissive CORS headers.

mod cors;
mod health;
mod sync;

pub use cors::{CORS_HEADERS, preflight};
pub use health::health;
pub use sync::{DiscographyRequest, album_tracks, artist_discography, artist_profiles, popular_albums};
