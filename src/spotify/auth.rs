use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{
    error::{Result, SyncError},
    info,
    types::TokenResponse,
};

/// A bearer token and the instant it stops being valid.
#[derive(Debug, Clone)]
pub struct Credential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Exchanges static client credentials for a fresh bearer token.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self) -> Result<TokenResponse>;
}

/// Client-credentials grant against the Spotify accounts service.
///
/// Posts `grant_type=client_credentials` to the token URL with the client id
/// and secret in a basic `Authorization` header, and reads back the access
/// token together with its lifetime in seconds.
pub struct ClientCredentials {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl ClientCredentials {
    pub fn new(client: Client, token_url: String, client_id: String, client_secret: String) -> Self {
        Self {
            client,
            token_url,
            client_id,
            client_secret,
        }
    }
}

#[async_trait]
impl Authenticator for ClientCredentials {
    async fn authenticate(&self) -> Result<TokenResponse> {
        let basic = STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));

        let response = self
            .client
            .post(&self.token_url)
            .header(reqwest::header::AUTHORIZATION, format!("Basic {}", basic))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| SyncError::Authentication(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Authentication(format!(
                "token exchange failed with {}: {}",
                status, body
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| SyncError::Authentication(e.to_string()))
    }
}

/// Holds the single process-wide credential and refreshes it on demand.
///
/// The slot is guarded by an async mutex that stays locked across a refresh,
/// so concurrent callers that find the credential expired wait for one
/// exchange instead of each issuing their own.
pub struct TokenCache<A> {
    authenticator: A,
    credential: Mutex<Option<Credential>>,
}

impl<A: Authenticator> TokenCache<A> {
    pub fn new(authenticator: A) -> Self {
        Self {
            authenticator,
            credential: Mutex::new(None),
        }
    }

    /// Returns a token that is valid right now.
    pub async fn get_token(&self) -> Result<String> {
        self.get_token_at(Utc::now()).await
    }

    /// Returns the cached token when `now` lies before its expiry, otherwise
    /// authenticates and replaces the cached credential wholesale.
    pub async fn get_token_at(&self, now: DateTime<Utc>) -> Result<String> {
        let mut slot = self.credential.lock().await;
        if let Some(credential) = slot.as_ref() {
            if credential.is_valid_at(now) {
                return Ok(credential.token.clone());
            }
        }

        let fresh = self.authenticator.authenticate().await?;
        let expires_in = fresh.expires_in.min(u64::from(u32::MAX)) as i64;
        let credential = Credential {
            token: fresh.access_token,
            expires_at: now + Duration::seconds(expires_in),
        };
        info!(
            "Obtained catalog token valid until {}",
            credential.expires_at.format("%Y-%m-%d %H:%M:%S")
        );

        let token = credential.token.clone();
        *slot = Some(credential);
        Ok(token)
    }

    /// The cached credential, if any.
    pub async fn current(&self) -> Option<Credential> {
        self.credential.lock().await.clone()
    }
}
