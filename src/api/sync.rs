use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    api::cors::CORS_HEADERS,
    error::{Result, SyncError},
    sync::{self, SyncContext},
    types::SyncReport,
    utils::{self, ReleaseKinds},
    warning,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscographyRequest {
    pub artist_id: Option<String>,
    pub include_groups: Option<String>,
}

impl IntoResponse for SyncError {
    /// Every failure is a 500; there is no separate client-error class.
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.kind(),
            "details": self.to_string(),
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, CORS_HEADERS, body).into_response()
    }
}

fn respond(result: Result<SyncReport>) -> Response {
    match result {
        Ok(report) => (StatusCode::OK, CORS_HEADERS, Json(report)).into_response(),
        Err(e) => {
            warning!("Sync run failed: {}", e);
            e.into_response()
        }
    }
}

pub async fn popular_albums(State(ctx): State<SyncContext>) -> Response {
    respond(sync::sync_popular_albums(&ctx).await)
}

pub async fn artist_discography(State(ctx): State<SyncContext>, body: Bytes) -> Response {
    let request = match parse_discography_request(&body) {
        Ok(request) => request,
        Err(e) => return respond(Err(e)),
    };

    respond(sync::sync_artist_discography(&ctx, &request.0, &request.1).await)
}

pub async fn album_tracks(State(ctx): State<SyncContext>) -> Response {
    respond(sync::backfill_album_tracks(&ctx).await)
}

pub async fn artist_profiles(State(ctx): State<SyncContext>) -> Response {
    respond(sync::backfill_artist_profiles(&ctx).await)
}

fn parse_discography_request(body: &[u8]) -> Result<(String, ReleaseKinds)> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(SyncError::Validation("artistId is required".to_string()));
    }

    let request: DiscographyRequest = serde_json::from_slice(body)
        .map_err(|e| SyncError::Validation(format!("invalid request body: {}", e)))?;

    let artist_id = request
        .artist_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| SyncError::Validation("artistId is required".to_string()))?;
    if !utils::is_catalog_id(artist_id.trim()) {
        return Err(SyncError::Validation(format!(
            "artistId '{}' is not a catalog id",
            artist_id
        )));
    }

    let kinds = match request.include_groups.as_deref() {
        Some(groups) => utils::parse_release_kinds(groups).map_err(SyncError::Validation)?,
        None => ReleaseKinds::default(),
    };

    Ok((artist_id, kinds))
}
