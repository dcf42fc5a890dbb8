//! Spotify Catalog Sync Library
//!
//! This library keeps a relational record store in step with the Spotify
//! catalog. It fetches albums, artists and tracks through a rate-limited
//! client that caches its bearer credential, maps them onto the stored
//! projections and writes them back in idempotent, id-keyed bulk upserts.
//!
//! # Modules
//!
//! - `api` - HTTP handlers exposing each sync job as a `POST` endpoint
//! - `cli` - One-shot command-line runs of the sync jobs
//! - `config` - Environment loading, required secrets and tunables
//! - `error` - The error taxonomy shared by every layer
//! - `server` - Router construction and the HTTP listener
//! - `spotify` - Catalog client, token cache and retry policy
//! - `store` - Record store client and the batch upsert gateway
//! - `sync` - The four sync orchestrators
//! - `types` - Catalog, stored and report data structures
//! - `utils` - Release kind parsing and small conversions
//!
//! # Example
//!
//! ```
//! use sporlsync::{config, sync};
//!
//! #[tokio::main]
//! async fn main() -> sporlsync::Res<()> {
//!     config::load_env().await?;
//!     let settings = config::Settings::from_env()?;
//!     // Build a catalog client and a store, then run a job...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod server;
pub mod spotify;
pub mod store;
pub mod sync;
pub mod types;
pub mod utils;

/// A convenient Result type alias for the binary entry points.
///
/// Library code returns [`error::Result`] with the typed [`error::SyncError`];
/// this boxed alias is what `main` and the CLI glue use when they only need
/// to report a failure.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Used for progress updates such as page numbers, counts written and
/// pauses between batches.
///
/// # Example
///
/// ```
/// info!("Fetched page {} with {} ids", page, ids.len());
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Upserted {} albums", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only used for fatal startup conditions, e.g. a required secret that is
/// missing from the environment. Code after this macro does not execute.
///
/// # Example
///
/// ```
/// error!("Missing required environment variable: {}", var_name);
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues: a single album or artist that failed to
/// fetch and was dropped from its batch, a rate-limit pause, or a failed run
/// that is reported back to the caller.
///
/// # Example
///
/// ```
/// warning!("Rate limited on {}, retrying in {:?}", endpoint, delay);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
