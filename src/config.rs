//! Configuration management for the catalog sync service.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. Required secrets are never defaulted: a missing
//! one surfaces as [`SyncError::Configuration`] and is treated as fatal by the
//! entry points.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. `.env` file in the working directory
//! 4. Application defaults (optional settings only)

use std::{env, path::PathBuf, time::Duration};

use crate::{
    error::{Result, SyncError},
    spotify::retry::RetryPolicy,
};

pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_API_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";

/// Loads environment variables from `.env` files.
///
/// Looks for `sporlsync/.env` in the platform-specific local data directory
/// first and then for `.env` in the working directory. Neither file is
/// required; variables that are already set in the process environment are
/// never overwritten.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/sporlsync/.env`
/// - macOS: `~/Library/Application Support/sporlsync/.env`
/// - Windows: `%LOCALAPPDATA%/sporlsync/.env`
///
/// # Errors
///
/// Returns an error string if a `.env` file exists but cannot be parsed.
pub async fn load_env() -> std::result::Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sporlsync/.env");
    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
    }

    match dotenv::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

fn required(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(SyncError::Configuration(format!("{} must be set", name))),
    }
}

fn optional(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Returns the Spotify client id used for the client-credentials exchange.
///
/// Reads `SPOTIFY_CLIENT_ID`.
pub fn spotify_client_id() -> Result<String> {
    required("SPOTIFY_CLIENT_ID")
}

/// Returns the Spotify client secret used for the client-credentials exchange.
///
/// Reads `SPOTIFY_CLIENT_SECRET`. The secret should be kept confidential and
/// never exposed in logs.
pub fn spotify_client_secret() -> Result<String> {
    required("SPOTIFY_CLIENT_SECRET")
}

/// Returns the base URL of the record store's REST interface.
///
/// Reads `SUPABASE_URL`, e.g. `https://project.supabase.co`.
pub fn store_url() -> Result<String> {
    required("SUPABASE_URL")
}

/// Returns the service credential for the record store.
///
/// Reads `SUPABASE_SERVICE_ROLE_KEY`.
pub fn store_service_key() -> Result<String> {
    required("SUPABASE_SERVICE_ROLE_KEY")
}

/// Returns the Spotify Web API base URL (`SPOTIFY_API_URL`).
pub fn spotify_apiurl() -> String {
    optional("SPOTIFY_API_URL", DEFAULT_SPOTIFY_API_URL)
}

/// Returns the Spotify token exchange URL (`SPOTIFY_API_TOKEN_URL`).
pub fn spotify_apitoken_url() -> String {
    optional("SPOTIFY_API_TOKEN_URL", DEFAULT_SPOTIFY_API_TOKEN_URL)
}

/// Returns the address the HTTP surface binds to (`SERVER_ADDRESS`).
pub fn server_addr() -> String {
    optional("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Everything a sync job needs to reach the catalog and the record store.
#[derive(Debug, Clone)]
pub struct Settings {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_api_url: String,
    pub spotify_token_url: String,
    pub store_url: String,
    pub store_service_key: String,
    pub server_addr: String,
    pub retry: RetryPolicy,
    pub options: SyncOptions,
}

impl Settings {
    /// Collects the settings from the environment.
    ///
    /// Fails on the first missing required secret.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            spotify_client_id: spotify_client_id()?,
            spotify_client_secret: spotify_client_secret()?,
            spotify_api_url: spotify_apiurl(),
            spotify_token_url: spotify_apitoken_url(),
            store_url: store_url()?,
            store_service_key: store_service_key()?,
            server_addr: server_addr(),
            retry: RetryPolicy::default(),
            options: SyncOptions::default(),
        })
    }
}

/// Page sizes and pauses used by the sync orchestrators.
///
/// The pauses are deliberate backpressure against the catalog's rate limit.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Number of new releases fetched by the popular-albums sync.
    pub popular_limit: u32,
    /// Page size when listing an artist's releases.
    pub discography_page_size: u32,
    /// Number of albums without tracks pulled from the store per page.
    pub track_page_size: u32,
    /// Number of album details fetched concurrently per sub-batch.
    pub track_batch_size: usize,
    /// Pause between two sub-batches of the missing-track backfill.
    pub track_batch_pause: Duration,
    /// Pause between two pages of the missing-track backfill.
    pub track_page_pause: Duration,
    /// Number of artist ids pulled from the store per page.
    pub artist_page_size: u32,
    /// Pause between two pages of the artist-profile backfill.
    pub artist_page_pause: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            popular_limit: 50,
            discography_page_size: 50,
            track_page_size: 50,
            track_batch_size: 10,
            track_batch_pause: Duration::from_secs(1),
            track_page_pause: Duration::from_secs(2),
            artist_page_size: 50,
            artist_page_pause: Duration::from_secs(1),
        }
    }
}
