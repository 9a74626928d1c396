//! REST implementation of [`FactoryClient`] over the management API.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::credential::{token_provider_from_config, TokenProvider};
use super::models::{
    CreateRunResponse, DataFlowResource, DatasetResource, LinkedServiceResource,
    PipelineResource, PipelineRun,
};
use super::FactoryClient;
use crate::config::FactoryConfig;
use crate::errors::FactoryError;

#[derive(Debug, Default, Deserialize)]
struct CloudErrorBody {
    #[serde(default)]
    error: Option<CloudError>,
}

#[derive(Debug, Default, Deserialize)]
struct CloudError {
    #[serde(default)]
    message: String,
}

/// Extracts the service message from an error body, falling back to the raw text.
fn error_message(text: &str) -> String {
    serde_json::from_str::<CloudErrorBody>(text)
        .ok()
        .and_then(|body| body.error)
        .map(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| text.to_string())
}

/// Client for one data factory.
pub struct RestFactoryClient {
    http: Client,
    factory_url: String,
    api_version: String,
    credentials: Arc<dyn TokenProvider>,
}

impl std::fmt::Debug for RestFactoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestFactoryClient")
            .field("factory_url", &self.factory_url)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl RestFactoryClient {
    /// Creates a client from explicit parts.
    #[must_use]
    pub fn new(
        http: Client,
        factory_url: impl Into<String>,
        api_version: impl Into<String>,
        credentials: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            http,
            factory_url: factory_url.into(),
            api_version: api_version.into(),
            credentials,
        }
    }

    /// Creates a client from the service configuration.
    pub fn from_config(config: &FactoryConfig) -> Result<Self, FactoryError> {
        debug!(factory = %config.datafactory_name, "from_config: called");
        let http = Client::builder().timeout(config.timeout()).build()?;
        let credentials = token_provider_from_config(config, http.clone())?;
        Ok(Self::new(
            http,
            config.factory_url(),
            config.api_version.clone(),
            credentials,
        ))
    }

    /// URL of a factory sub-resource.
    #[must_use]
    pub fn resource_url(&self, path: &str) -> String {
        format!(
            "{}/{}?api-version={}",
            self.factory_url, path, self.api_version
        )
    }

    async fn send<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Option<String>, FactoryError> {
        let url = self.resource_url(path);
        debug!(%method, %url, "send: called");

        let token = self.credentials.token().await?;
        let mut request = self.http.request(method, &url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|e| {
            debug!(error = %e, "send: network error");
            FactoryError::Http(e)
        })?;

        let status = response.status();
        let text = response.text().await?;
        if status == StatusCode::NOT_FOUND {
            debug!(%path, "send: not found");
            return Err(FactoryError::not_found(path, error_message(&text)));
        }
        if !status.is_success() {
            debug!(%status, "send: API error");
            return Err(FactoryError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        debug!(%status, bytes = text.len(), "send: success");
        Ok(Some(text).filter(|t| !t.trim().is_empty()))
    }

    async fn put<B, R>(&self, path: &str, body: &B) -> Result<Option<R>, FactoryError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        self.send(Method::PUT, path, Some(body))
            .await?
            .map(|text| serde_json::from_str(&text))
            .transpose()
            .map_err(FactoryError::from)
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, FactoryError> {
        let text = self
            .send::<()>(Method::GET, path, None)
            .await?
            .ok_or_else(|| FactoryError::Internal(format!("empty response for {path}")))?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl FactoryClient for RestFactoryClient {
    async fn create_or_update_dataset(
        &self,
        name: &str,
        dataset: &DatasetResource,
    ) -> Result<Option<DatasetResource>, FactoryError> {
        self.put(&format!("datasets/{name}"), dataset).await
    }

    async fn get_dataset(&self, name: &str) -> Result<DatasetResource, FactoryError> {
        self.get(&format!("datasets/{name}")).await
    }

    async fn get_linked_service(&self, name: &str) -> Result<LinkedServiceResource, FactoryError> {
        self.get(&format!("linkedservices/{name}")).await
    }

    async fn create_or_update_data_flow(
        &self,
        name: &str,
        data_flow: &DataFlowResource,
    ) -> Result<Option<DataFlowResource>, FactoryError> {
        self.put(&format!("dataflows/{name}"), data_flow).await
    }

    async fn get_data_flow(&self, name: &str) -> Result<DataFlowResource, FactoryError> {
        self.get(&format!("dataflows/{name}")).await
    }

    async fn create_or_update_pipeline(
        &self,
        name: &str,
        pipeline: &PipelineResource,
    ) -> Result<Option<PipelineResource>, FactoryError> {
        self.put(&format!("pipelines/{name}"), pipeline).await
    }

    async fn get_pipeline(&self, name: &str) -> Result<PipelineResource, FactoryError> {
        self.get(&format!("pipelines/{name}")).await
    }

    async fn create_run(
        &self,
        pipeline_name: &str,
        parameters: &HashMap<String, String>,
    ) -> Result<CreateRunResponse, FactoryError> {
        let text = self
            .send(
                Method::POST,
                &format!("pipelines/{pipeline_name}/createRun"),
                Some(parameters),
            )
            .await?;
        match text {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Ok(CreateRunResponse::default()),
        }
    }

    async fn get_pipeline_run(&self, run_id: &str) -> Result<PipelineRun, FactoryError> {
        self.get(&format!("pipelineruns/{run_id}")).await
    }
}
