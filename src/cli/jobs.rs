use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    error, server,
    sync::{self, SyncContext},
    types::{ReportTableRow, SyncReport},
    utils::ReleaseKinds,
};

/// One sync job selected on the command line.
#[derive(Debug, Clone)]
pub enum Job {
    PopularAlbums,
    Discography {
        artist_id: String,
        kinds: ReleaseKinds,
    },
    AlbumTracks,
    ArtistProfiles,
}

impl Job {
    fn describe(&self) -> String {
        match self {
            Job::PopularAlbums => "Syncing popular albums...".to_string(),
            Job::Discography { artist_id, .. } => {
                format!("Syncing discography of artist {}...", artist_id)
            }
            Job::AlbumTracks => "Filling missing album tracks...".to_string(),
            Job::ArtistProfiles => "Refreshing artist profiles...".to_string(),
        }
    }
}

/// Runs `job` to completion and prints its report.
pub async fn run(ctx: SyncContext, job: Job) {
    let pb = ProgressBar::new_spinner();
    pb.set_message(job.describe());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let result = match &job {
        Job::PopularAlbums => sync::sync_popular_albums(&ctx).await,
        Job::Discography { artist_id, kinds } => {
            sync::sync_artist_discography(&ctx, artist_id, kinds).await
        }
        Job::AlbumTracks => sync::backfill_album_tracks(&ctx).await,
        Job::ArtistProfiles => sync::backfill_artist_profiles(&ctx).await,
    };
    pb.finish_and_clear();

    match result {
        Ok(report) => print_report(&report),
        Err(e) => error!("{} failed. Err: {}", job.describe().trim_end_matches("..."), e),
    }
}

/// Serves the HTTP surface on `addr`.
pub async fn serve(ctx: SyncContext, addr: &str) {
    if let Err(e) = server::start_api_server(ctx, addr).await {
        error!("Server stopped. Err: {}", e);
    }
}

fn print_report(report: &SyncReport) {
    let table = Table::new([ReportTableRow::from(report)]);
    println!("{}", table);
}
