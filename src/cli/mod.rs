//! # CLI Module
//!
//! Command-line entry points around the sync jobs. The same orchestrators the
//! HTTP surface exposes can be run once, in-process, from a terminal or a
//! scheduler:
//!
//! - [`run`] - runs one job with a spinner and prints its report as a table
//! - [`serve`] - starts the HTTP surface
//!
//! ## Usage Patterns
//!
//! ```bash
//! sporlsync run popular-albums
//! sporlsync run discography --artist-id 4NHQUGzhtTLFvgF5SZesLK --type album,single
//! sporlsync run album-tracks
//! sporlsync run artist-profiles
//! sporlsync serve
//! ```
//!
//! Failures are fatal here: the error is printed and the process exits with
//! status 1 so a scheduler can notice and re-trigger the job.

mod jobs;

pub use jobs::{Job, run, serve};
