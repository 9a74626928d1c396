//! Service configuration.
//!
//! The configuration is read once at start-up, validated, and then shared
//! read-only (behind an `Arc`) with every orchestrator. Business logic never
//! reads the process environment itself.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ConfigError;

/// Default control-plane API version.
pub const DEFAULT_API_VERSION: &str = "2018-06-01";

/// Configuration of the factory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryConfig {
    /// Version reported by `/version`.
    #[serde(default = "default_app_version")]
    pub app_version: String,
    /// HTTP listen port.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Subscription holding the data factory.
    pub subscription_id: String,
    /// Tenant used for token acquisition.
    #[serde(default)]
    pub tenant_id: String,
    /// Resource group holding the data factory.
    pub resource_group_name: String,
    /// Data factory account name.
    pub datafactory_name: String,
    /// Linked service used by the source and join datasets.
    pub source_linked_service: String,
    /// Linked service used by the sink dataset.
    pub sink_linked_service: String,
    /// Management API base URL.
    #[serde(default = "default_management_endpoint")]
    pub management_endpoint: String,
    /// OAuth2 authority host.
    #[serde(default = "default_authority_host")]
    pub authority_host: String,
    /// Management API version.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Service principal client id.
    #[serde(default)]
    pub client_id: Option<String>,
    /// Service principal secret.
    #[serde(default, skip_serializing)]
    pub client_secret: Option<String>,
    /// Pre-acquired bearer token; takes precedence over the client secret.
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
}

fn default_app_version() -> String {
    "1.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    5000
}

fn default_management_endpoint() -> String {
    "https://management.azure.com".to_string()
}

fn default_authority_host() -> String {
    "https://login.microsoftonline.com".to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_timeout() -> u64 {
    60
}

impl FactoryConfig {
    /// Creates a configuration with the required identifiers and defaults
    /// for everything else.
    #[must_use]
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group_name: impl Into<String>,
        datafactory_name: impl Into<String>,
    ) -> Self {
        Self {
            app_version: default_app_version(),
            http_port: default_http_port(),
            subscription_id: subscription_id.into(),
            tenant_id: String::new(),
            resource_group_name: resource_group_name.into(),
            datafactory_name: datafactory_name.into(),
            source_linked_service: String::new(),
            sink_linked_service: String::new(),
            management_endpoint: default_management_endpoint(),
            authority_host: default_authority_host(),
            api_version: default_api_version(),
            timeout_seconds: default_timeout(),
            client_id: None,
            client_secret: None,
            access_token: None,
        }
    }

    /// Sets the linked services.
    #[must_use]
    pub fn with_linked_services(
        mut self,
        source: impl Into<String>,
        sink: impl Into<String>,
    ) -> Self {
        self.source_linked_service = source.into();
        self.sink_linked_service = sink.into();
        self
    }

    /// Sets the management endpoint.
    #[must_use]
    pub fn with_management_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.management_endpoint = endpoint.into();
        self
    }

    /// Sets the app version.
    #[must_use]
    pub fn with_app_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = version.into();
        self
    }

    /// Sets a static bearer token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through a variable lookup function.
    ///
    /// Empty values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let required = |key: &str| get(key).ok_or_else(|| ConfigError::Missing(key.to_string()));

        let http_port = match get("PORT_HTTP") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "PORT_HTTP".to_string(),
                value,
            })?,
            None => default_http_port(),
        };
        let timeout_seconds = match get("FACTORYFLOW_HTTP_TIMEOUT_SECS") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "FACTORYFLOW_HTTP_TIMEOUT_SECS".to_string(),
                value,
            })?,
            None => default_timeout(),
        };

        let config = Self {
            app_version: get("APP_VERSION").unwrap_or_else(default_app_version),
            http_port,
            subscription_id: required("AZURE_SUBSCRIPTION_ID")?,
            tenant_id: get("AZURE_TENANT_ID").unwrap_or_default(),
            resource_group_name: required("DATAFACTORY_RESOURCE_GROUP_NAME")?,
            datafactory_name: required("DATAFACTORY_ACCOUNT_NAME")?,
            source_linked_service: required("DATAFACTORY_SOURCE_LINKED_SERVICE")?,
            sink_linked_service: required("DATAFACTORY_SINK_LINKED_SERVICE")?,
            management_endpoint: get("AZURE_MANAGEMENT_ENDPOINT")
                .unwrap_or_else(default_management_endpoint),
            authority_host: get("AZURE_AUTHORITY_HOST").unwrap_or_else(default_authority_host),
            api_version: get("DATAFACTORY_API_VERSION").unwrap_or_else(default_api_version),
            timeout_seconds,
            client_id: get("AZURE_CLIENT_ID"),
            client_secret: get("AZURE_CLIENT_SECRET"),
            access_token: get("AZURE_ACCESS_TOKEN"),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that a credential can be obtained with this configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_token.is_some() {
            return Ok(());
        }
        match (&self.client_id, &self.client_secret) {
            (Some(_), Some(_)) if self.tenant_id.is_empty() => {
                Err(ConfigError::Missing("AZURE_TENANT_ID".to_string()))
            }
            (Some(_), Some(_)) => Ok(()),
            (None, _) => Err(ConfigError::Missing(
                "AZURE_ACCESS_TOKEN or AZURE_CLIENT_ID".to_string(),
            )),
            (Some(_), None) => Err(ConfigError::Missing("AZURE_CLIENT_SECRET".to_string())),
        }
    }

    /// Gets timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Base URL of the data factory resource.
    #[must_use]
    pub fn factory_url(&self) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.DataFactory/factories/{}",
            self.management_endpoint.trim_end_matches('/'),
            self.subscription_id,
            self.resource_group_name,
            self.datafactory_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn base_env() -> HashMap<String, String> {
        env(&[
            ("AZURE_SUBSCRIPTION_ID", "03030303-aaaa-yuio-bbbb-030303030303"),
            ("AZURE_TENANT_ID", "02020202-aaaa-erty-olki-020202020202"),
            ("DATAFACTORY_ACCOUNT_NAME", "datafactory-account"),
            ("DATAFACTORY_RESOURCE_GROUP_NAME", "datafactory-rg"),
            ("DATAFACTORY_SOURCE_LINKED_SERVICE", "datafactory-source-ls"),
            ("DATAFACTORY_SINK_LINKED_SERVICE", "datafactory-sink-ls"),
            ("AZURE_ACCESS_TOKEN", "token"),
        ])
    }

    #[test]
    fn test_from_lookup_defaults() {
        let vars = base_env();
        let config = FactoryConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.app_version, "1.0.0.1");
        assert_eq!(config.http_port, 5000);
        assert_eq!(config.datafactory_name, "datafactory-account");
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let mut vars = base_env();
        vars.insert("APP_VERSION".to_string(), "1.0.0.0".to_string());
        vars.insert("PORT_HTTP".to_string(), "8080".to_string());
        let config = FactoryConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.app_version, "1.0.0.0");
        assert_eq!(config.http_port, 8080);
    }

    #[test]
    fn test_from_lookup_missing_required() {
        let mut vars = base_env();
        vars.insert("DATAFACTORY_ACCOUNT_NAME".to_string(), String::new());
        let err = FactoryConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATAFACTORY_ACCOUNT_NAME".to_string()));
    }

    #[test]
    fn test_from_lookup_invalid_port() {
        let mut vars = base_env();
        vars.insert("PORT_HTTP".to_string(), "http".to_string());
        let err = FactoryConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "PORT_HTTP"));
    }

    #[test]
    fn test_validate_credentials() {
        let config = FactoryConfig::new("sub", "rg", "adf");
        assert!(config.validate().is_err());

        let mut with_secret = config.clone();
        with_secret.client_id = Some("id".to_string());
        with_secret.client_secret = Some("secret".to_string());
        assert_eq!(
            with_secret.validate(),
            Err(ConfigError::Missing("AZURE_TENANT_ID".to_string()))
        );
        with_secret.tenant_id = "tenant".to_string();
        assert!(with_secret.validate().is_ok());

        assert!(config.with_access_token("t").validate().is_ok());
    }

    #[test]
    fn test_factory_url() {
        let config =
            FactoryConfig::new("sub", "rg", "adf").with_management_endpoint("http://localhost:1/");
        assert_eq!(
            config.factory_url(),
            "http://localhost:1/subscriptions/sub/resourceGroups/rg/providers/Microsoft.DataFactory/factories/adf"
        );
    }
}
