use axum::response::Json;
use serde_json::{Value, json};

/// Liveness check; does not touch the catalog or the record store.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
