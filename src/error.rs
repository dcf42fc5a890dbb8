//! Error taxonomy shared by the catalog client, the record store and the
//! sync orchestrators.

/// Every failure that can end a sync run.
///
/// Per-item fetch failures inside a concurrent batch never reach this type's
/// callers; they are logged and the item is dropped. Anything else unwinds to
/// the top of the job and is reported once.
#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    /// A required secret or setting is missing from the environment.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A required request field is missing or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// The catalog kept answering 429 until the retry budget ran out.
    #[error("exhausted retries for {endpoint}")]
    ExhaustedRetries { endpoint: String },

    /// The catalog refused or failed the client-credentials exchange. Unlike
    /// other catalog failures this aborts a run even inside a batch.
    #[error("catalog authentication failed: {0}")]
    Authentication(String),

    /// Any non-429 catalog failure, transport failure or store write failure.
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl SyncError {
    /// Short machine-friendly name of the error class, used as the `error`
    /// field of JSON error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Configuration(_) => "ConfigurationError",
            SyncError::Validation(_) => "ValidationError",
            SyncError::ExhaustedRetries { .. } => "ExhaustedRetries",
            SyncError::Authentication(_) | SyncError::Upstream(_) => "UpstreamError",
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Upstream(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Upstream(format!("malformed payload: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_each_class() {
        assert_eq!(
            SyncError::Configuration("x".into()).kind(),
            "ConfigurationError"
        );
        assert_eq!(SyncError::Validation("x".into()).kind(), "ValidationError");
        assert_eq!(
            SyncError::ExhaustedRetries {
                endpoint: "/albums/1".into()
            }
            .kind(),
            "ExhaustedRetries"
        );
        assert_eq!(SyncError::Upstream("x".into()).kind(), "UpstreamError");
        assert_eq!(SyncError::Authentication("x".into()).kind(), "UpstreamError");
    }

    #[test]
    fn exhausted_retries_names_endpoint() {
        let err = SyncError::ExhaustedRetries {
            endpoint: "/browse/new-releases".into(),
        };
        assert_eq!(err.to_string(), "exhausted retries for /browse/new-releases");
    }
}
