//! Sample requests and a wired-up service for tests.

use std::sync::Arc;

use super::InMemoryFactoryClient;
use crate::config::FactoryConfig;
use crate::core::{Dataset, PipelineSpec};
use crate::orchestrator::{PipelineOrchestrator, RunOrchestrator};

/// Source linked service of [`test_config`].
pub const SOURCE_LINKED_SERVICE: &str = "datafactory-source-ls";
/// Sink linked service of [`test_config`].
pub const SINK_LINKED_SERVICE: &str = "datafactory-sink-ls";
/// Storage account behind both linked services.
pub const STORAGE_ACCOUNT: &str = "teststorage";

/// A configuration pointing at nothing, with a static token.
#[must_use]
pub fn test_config() -> FactoryConfig {
    FactoryConfig::new("subscription", "datafactory-rg", "datafactory-account")
        .with_linked_services(SOURCE_LINKED_SERVICE, SINK_LINKED_SERVICE)
        .with_access_token("test-token")
}

/// An in-memory control plane holding both linked services of [`test_config`].
#[must_use]
pub fn test_client() -> InMemoryFactoryClient {
    let endpoint = format!("https://{STORAGE_ACCOUNT}.blob.core.windows.net/");
    InMemoryFactoryClient::new()
        .with_linked_service(SOURCE_LINKED_SERVICE, endpoint.as_str())
        .with_linked_service(SINK_LINKED_SERVICE, endpoint)
}

/// A three-column join request.
#[must_use]
pub fn sample_spec() -> PipelineSpec {
    let rg = "datafactory-rg";
    PipelineSpec::new(
        Dataset::new(
            rg,
            STORAGE_ACCOUNT,
            "source",
            "factory/n1/dataset-2024-01-01",
            "input-00001.csv",
        ),
        Dataset::new(rg, STORAGE_ACCOUNT, "reference", "lists", "customers.csv"),
        Dataset::new(rg, STORAGE_ACCOUNT, "sink", "results", "output-00001.csv"),
        vec!["key".to_string(), "phone".to_string(), "email".to_string()],
    )
}

/// Both orchestrators over one shared client.
#[derive(Debug, Clone)]
pub struct TestService {
    /// The in-memory control plane.
    pub client: Arc<InMemoryFactoryClient>,
    /// The configuration in use.
    pub config: Arc<FactoryConfig>,
    /// Pipeline orchestrator.
    pub pipelines: PipelineOrchestrator,
    /// Run orchestrator.
    pub runs: RunOrchestrator,
}

impl TestService {
    /// Wires [`test_client`] and [`test_config`] together.
    #[must_use]
    pub fn new() -> Self {
        Self::with_client(test_client())
    }

    /// Wires the given client with [`test_config`].
    #[must_use]
    pub fn with_client(client: InMemoryFactoryClient) -> Self {
        let client = Arc::new(client);
        let config = Arc::new(test_config());
        Self {
            pipelines: PipelineOrchestrator::new(client.clone(), config.clone()),
            runs: RunOrchestrator::new(client.clone()),
            client,
            config,
        }
    }
}

impl Default for TestService {
    fn default() -> Self {
        Self::new()
    }
}
