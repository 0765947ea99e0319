use crate::domain::model::{JobSpec, ServiceRegistration};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The discovery registry the bridge projects registrations into.
#[async_trait]
pub trait Registry: Send + Sync {
    async fn register(&self, registration: &ServiceRegistration) -> Result<()>;
    async fn deregister(&self, service_id: &str) -> Result<()>;
}

pub trait JobSource {
    fn load(&self) -> Result<JobSpec>;
}
