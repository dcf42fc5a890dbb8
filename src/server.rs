use axum::{
    Router,
    routing::{get, post},
};
use std::{net::SocketAddr, str::FromStr};

use crate::{Res, api, info, sync::SyncContext};

/// Builds the router serving every sync endpoint plus `/health`.
pub fn router(ctx: SyncContext) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route(
            "/sync/popular-albums",
            post(api::popular_albums).options(api::preflight),
        )
        .route(
            "/sync/artist-discography",
            post(api::artist_discography).options(api::preflight),
        )
        .route(
            "/backfill/album-tracks",
            post(api::album_tracks).options(api::preflight),
        )
        .route(
            "/backfill/artist-profiles",
            post(api::artist_profiles).options(api::preflight),
        )
        .with_state(ctx)
}

/// Binds `addr` and serves the router until the process is stopped.
pub async fn start_api_server(ctx: SyncContext, addr: &str) -> Res<()> {
    let addr = SocketAddr::from_str(addr)?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(ctx)).await?;
    Ok(())
}
