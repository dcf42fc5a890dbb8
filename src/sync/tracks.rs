use tokio::time::sleep;

use crate::{
    error::Result,
    info,
    store::UpsertGateway,
    success,
    sync::{SyncContext, fetch_albums},
    types::{SyncJob, SyncReport},
    warning,
};

/// Fills the track list of stored albums that have none yet.
///
/// Repeatedly pulls a page of such albums, fetches their details in
/// fixed-size concurrent sub-batches and upserts each sub-batch. Stops the
/// first time a page comes back empty, or when a whole page could not be
/// fetched (the same page would otherwise be selected forever).
///
/// # Pacing
///
/// - `track_page_size` albums are selected per page
/// - `track_batch_size` details are fetched concurrently per sub-batch
/// - `track_batch_pause` is slept between sub-batches and
///   `track_page_pause` between pages
///
/// # Errors
///
/// Selecting a page or writing a sub-batch fails the run, as does a failed
/// catalog authentication. Sub-batches written before the failure stay
/// written; the next run picks up whatever is still missing.
pub async fn backfill_album_tracks(ctx: &SyncContext) -> Result<SyncReport> {
    let opts = &ctx.options;
    let gateway = UpsertGateway::new(ctx.store.as_ref());
    let mut total = 0;
    let mut pages = 0;

    loop {
        let ids = ctx
            .store
            .select_albums_missing_tracks(opts.track_page_size)
            .await?;
        if ids.is_empty() {
            info!("No albums without tracks left");
            break;
        }
        pages += 1;
        info!("Page {}: {} albums without tracks", pages, ids.len());

        let mut written = 0;
        for (i, batch) in ids.chunks(opts.track_batch_size.max(1)).enumerate() {
            if i > 0 {
                sleep(opts.track_batch_pause).await;
            }

            let mut albums = fetch_albums(ctx.catalog.as_ref(), batch).await?;
            for album in albums.iter_mut() {
                // an album without tracks still counts as filled
                album.tracks.get_or_insert_with(Vec::new);
            }
            written += gateway.upsert_albums(albums).await?;
        }

        total += written;
        if written == 0 {
            warning!(
                "None of the {} albums on page {} could be fetched, stopping",
                ids.len(),
                pages
            );
            break;
        }

        sleep(opts.track_page_pause).await;
    }

    success!("Filled tracks for {} albums", total);
    Ok(SyncReport {
        job: SyncJob::AlbumTracks,
        message: format!("Filled tracks for {} albums", total),
        count: total,
        pages,
    })
}
