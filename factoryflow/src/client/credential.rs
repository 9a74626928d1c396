//! Bearer token acquisition for the management API.

use async_trait::async_trait;
use chrono::Duration;
use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::config::FactoryConfig;
use crate::errors::{ConfigError, FactoryError};
use crate::utils::{now_utc, Timestamp};

/// OAuth2 scope of the management API.
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Source of bearer tokens.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a bearer token valid for the management API.
    async fn token(&self) -> Result<String, FactoryError>;
}

/// Returns a fixed token.
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Creates a provider for a pre-acquired token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<String, FactoryError> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Timestamp,
}

/// Client-credentials grant against the identity platform.
pub struct ClientSecretCredential {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ClientSecretCredential {
    /// Creates a credential for a service principal.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        authority_host: &str,
        tenant_id: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token_url: format!(
                "{}/{}/oauth2/v2.0/token",
                authority_host.trim_end_matches('/'),
                tenant_id
            ),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            cached: Mutex::new(None),
        }
    }

    /// Token endpoint this credential posts to.
    #[must_use]
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    fn cached_token(&self) -> Option<String> {
        self.cached
            .lock()
            .as_ref()
            .filter(|t| t.expires_at > now_utc())
            .map(|t| t.value.clone())
    }
}

impl std::fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenProvider for ClientSecretCredential {
    async fn token(&self) -> Result<String, FactoryError> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }

        debug!(token_url = %self.token_url, "token: requesting new token");
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", MANAGEMENT_SCOPE),
        ];
        let response = self.http.post(&self.token_url).form(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!(%status, "token: request rejected");
            return Err(FactoryError::Credential(format!(
                "token request failed with {status}: {text}"
            )));
        }

        let body: TokenResponse = response.json().await?;
        let lifetime = body.expires_in.unwrap_or(3600) - EXPIRY_MARGIN_SECS;
        *self.cached.lock() = Some(CachedToken {
            value: body.access_token.clone(),
            expires_at: now_utc() + Duration::seconds(lifetime.max(0)),
        });
        Ok(body.access_token)
    }
}

/// Builds the token provider selected by the configuration.
///
/// A static access token wins over a client secret.
pub fn token_provider_from_config(
    config: &FactoryConfig,
    http: reqwest::Client,
) -> Result<Arc<dyn TokenProvider>, ConfigError> {
    if let Some(token) = &config.access_token {
        return Ok(Arc::new(StaticTokenProvider::new(token.clone())));
    }
    match (&config.client_id, &config.client_secret) {
        (Some(id), Some(secret)) if !config.tenant_id.is_empty() => {
            Ok(Arc::new(ClientSecretCredential::new(
                http,
                &config.authority_host,
                &config.tenant_id,
                id.clone(),
                secret.clone(),
            )))
        }
        _ => {
            config.validate()?;
            Err(ConfigError::Missing(
                "AZURE_ACCESS_TOKEN or AZURE_CLIENT_ID".to_string(),
            ))
        }
    }
}
