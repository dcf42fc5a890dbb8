use crate::{
    error::Result,
    info,
    store::UpsertGateway,
    success,
    sync::SyncContext,
    types::{SyncJob, SyncReport},
};

/// Fetches one page of currently popular releases and upserts all of them.
///
/// Single pass: the listing is not paginated further, and the listing's
/// albums carry no track lists, so tracks already stored are left untouched.
///
/// # Errors
///
/// - [`SyncError::ExhaustedRetries`](crate::error::SyncError::ExhaustedRetries)
///   or `Upstream` when the listing fails
/// - `Upstream` when the store rejects the write
pub async fn sync_popular_albums(ctx: &SyncContext) -> Result<SyncReport> {
    let limit = ctx.options.popular_limit;
    info!("Fetching {} new releases...", limit);

    let albums = ctx.catalog.list_new_releases(limit).await?;
    let count = UpsertGateway::new(ctx.store.as_ref())
        .upsert_albums(albums)
        .await?;

    success!("Synced {} popular albums", count);
    Ok(SyncReport {
        job: SyncJob::PopularAlbums,
        message: format!("Synced {} popular albums", count),
        count,
        pages: 1,
    })
}
