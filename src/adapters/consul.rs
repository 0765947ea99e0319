use crate::config::RegistryConfig;
use crate::core::{Registry, ServiceRegistration};
use crate::domain::model::AgentServiceRegistration;
use crate::utils::error::{BridgeError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use url::Url;

const TOKEN_HEADER: &str = "X-Consul-Token";

/// Registry backed by the local Consul agent's HTTP API.
#[derive(Debug, Clone)]
pub struct ConsulRegistry {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl ConsulRegistry {
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let base = Url::parse(&config.address).map_err(|e| BridgeError::RegistryClientError {
            message: format!("invalid agent address {}: {}", config.address, e),
        })?;
        if base.cannot_be_a_base() {
            return Err(BridgeError::RegistryClientError {
                message: format!("agent address {} cannot carry a path", config.address),
            });
        }

        let client = Client::builder()
            .build()
            .map_err(|e| BridgeError::RegistryClientError {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base,
            token: config.token.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(TOKEN_HEADER, token),
            None => request,
        }
    }

    async fn check_status(operation: &'static str, id: &str, response: Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(BridgeError::RegistryError {
            operation,
            id: id.to_string(),
            message: format!("{}: {}", status, body.trim()),
        })
    }
}

#[async_trait]
impl Registry for ConsulRegistry {
    async fn register(&self, registration: &ServiceRegistration) -> Result<()> {
        let url = self.endpoint(&["v1", "agent", "service", "register"]);
        tracing::debug!(url = %url, id = %registration.id, "registering service");

        let response = self
            .authorize(self.client.put(url))
            .json(&AgentServiceRegistration::from(registration))
            .send()
            .await?;
        Self::check_status("register", &registration.id, response).await
    }

    async fn deregister(&self, service_id: &str) -> Result<()> {
        let url = self.endpoint(&["v1", "agent", "service", "deregister", service_id]);
        tracing::debug!(url = %url, id = service_id, "deregistering service");

        let response = self.authorize(self.client.put(url)).send().await?;
        Self::check_status("deregister", service_id, response).await
    }
}
