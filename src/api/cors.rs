use axum::http::{StatusCode, header};

/// Permissive CORS headers attached to every sync response.
pub const CORS_HEADERS: [(header::HeaderName, &str); 3] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        "authorization, x-client-info, apikey, content-type",
    ),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
];

/// Answers an `OPTIONS` preflight.
pub async fn preflight() -> (StatusCode, [(header::HeaderName, &'static str); 3]) {
    (StatusCode::OK, CORS_HEADERS)
}
