use tokio::time::sleep;

use crate::{
    error::Result,
    info,
    store::UpsertGateway,
    success,
    sync::{SyncContext, fetch_artists},
    types::{SyncJob, SyncReport},
};

/// Refreshes the profile of every stored artist.
///
/// Walks the stored artist ids by offset, fetches each profile concurrently,
/// upserts the page and pauses before the next one. Stops on the first empty
/// page.
///
/// The offset advances by the number of ids returned, so artists whose fetch
/// failed are skipped rather than selected again.
///
/// # Errors
///
/// - `Upstream` when selecting ids or writing a page fails
/// - `Authentication` when the catalog credential cannot be obtained
pub async fn backfill_artist_profiles(ctx: &SyncContext) -> Result<SyncReport> {
    let opts = &ctx.options;
    let gateway = UpsertGateway::new(ctx.store.as_ref());
    let mut offset: u32 = 0;
    let mut total = 0;
    let mut pages = 0;

    loop {
        let ids = ctx
            .store
            .select_artist_ids(offset, opts.artist_page_size)
            .await?;
        if ids.is_empty() {
            break;
        }
        pages += 1;

        let artists = fetch_artists(ctx.catalog.as_ref(), &ids).await?;
        let written = gateway.upsert_artists(artists).await?;
        total += written;
        info!(
            "Page {}: updated {} of {} artists (offset {})",
            pages,
            written,
            ids.len(),
            offset
        );

        offset += ids.len() as u32;
        sleep(opts.artist_page_pause).await;
    }

    success!("Updated {} artist profiles", total);
    Ok(SyncReport {
        job: SyncJob::ArtistProfiles,
        message: format!("Updated {} artist profiles", total),
        count: total,
        pages,
    })
}
