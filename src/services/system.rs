use async_trait::async_trait;

use super::types::ServiceResult;

/// Service that provides common system facilities
#[async_trait]
pub trait SystemService: Send + Sync {
    /// Healthcheck
    async fn healthcheck(&self) -> ServiceResult<String>;
}

#[derive(Clone, Debug, Default)]
pub struct SystemServiceImpl;

#[async_trait]
impl SystemService for SystemServiceImpl {
    async fn healthcheck(&self) -> ServiceResult<String> {
        Ok("Ok".to_string())
    }
}
