use crate::{
    error::{Result, SyncError},
    info,
    store::UpsertGateway,
    success,
    sync::{SyncContext, fetch_albums},
    types::{SyncJob, SyncReport},
    utils::{self, ReleaseKinds},
};

/// Syncs every release of one artist, including track listings.
///
/// Pages through the artist's releases by offset until the catalog reports
/// no further page, then fetches full detail for each release and upserts
/// the whole batch at once.
///
/// # Arguments
///
/// * `ctx` - Catalog, store and tunables of this run
/// * `artist_id` - Catalog id of the artist (base62, e.g. `4NHQUGzhtTLFvgF5SZesLK`)
/// * `kinds` - Release kinds to list (album, single, compilation, appears_on)
///
/// # Returns
///
/// A [`SyncReport`] whose `count` is the number of releases written and
/// whose `pages` is the number of listing calls made.
///
/// # Errors
///
/// - `Validation` when `artist_id` is blank or not a catalog id; nothing is
///   requested from the catalog in that case
/// - `ExhaustedRetries` or `Upstream` when a listing page fails
/// - `Authentication` when the catalog credential cannot be obtained
/// - `Upstream` when the store rejects the batch
///
/// A failed detail fetch of a single release is logged and the release is
/// left out of the batch.
///
/// # Example
///
/// ```
/// let kinds = utils::parse_release_kinds("album,single")?;
/// let report = sync_artist_discography(&ctx, "4NHQUGzhtTLFvgF5SZesLK", &kinds).await?;
/// println!("{}", report.message);
/// ```
pub async fn sync_artist_discography(
    ctx: &SyncContext,
    artist_id: &str,
    kinds: &ReleaseKinds,
) -> Result<SyncReport> {
    let artist_id = artist_id.trim();
    if artist_id.is_empty() {
        return Err(SyncError::Validation("artistId is required".to_string()));
    }
    if !utils::is_catalog_id(artist_id) {
        return Err(SyncError::Validation(format!(
            "artistId '{}' is not a catalog id",
            artist_id
        )));
    }

    let page_size = ctx.options.discography_page_size;
    let mut album_ids: Vec<String> = Vec::new();
    let mut offset = 0;
    let mut pages = 0;

    loop {
        let page = ctx
            .catalog
            .list_artist_albums(artist_id, kinds, offset, page_size)
            .await?;
        pages += 1;

        let fetched = page.items.len();
        album_ids.extend(page.items.into_iter().map(|album| album.id));
        info!(
            "Listed {} releases of artist {} (page {})",
            fetched, artist_id, pages
        );

        if !page.has_next || fetched == 0 {
            break;
        }
        offset += page_size;
    }

    utils::remove_duplicate_ids(&mut album_ids);

    let albums = fetch_albums(ctx.catalog.as_ref(), &album_ids).await?;
    let count = UpsertGateway::new(ctx.store.as_ref())
        .upsert_albums(albums)
        .await?;

    success!(
        "Synced {} of {} releases for artist {}",
        count,
        album_ids.len(),
        artist_id
    );
    Ok(SyncReport {
        job: SyncJob::ArtistDiscography,
        message: format!("Synced {} albums for artist {}", count, artist_id),
        count,
        pages,
    })
}
