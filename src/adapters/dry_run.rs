use crate::core::{Registry, ServiceRegistration};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Accepts every call without contacting a registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunRegistry;

#[async_trait]
impl Registry for DryRunRegistry {
    async fn register(&self, registration: &ServiceRegistration) -> Result<()> {
        tracing::info!(
            id = %registration.id,
            address = %registration.address,
            port = registration.port,
            checks = registration.checks.len(),
            "dry run: would register service"
        );
        Ok(())
    }

    async fn deregister(&self, service_id: &str) -> Result<()> {
        tracing::info!(id = service_id, "dry run: would deregister service");
        Ok(())
    }
}
