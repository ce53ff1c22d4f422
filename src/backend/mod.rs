use crate::error::AppError;
use crate::models::{
    ApiConfigResponse, ProviderId, SaveConfigResponse, SaveRequest, TestConnectionResult,
};
use async_trait::async_trait;

pub mod cache;
pub mod http;

/// The configuration backend this crate talks to: hydration source,
/// connection verification endpoints and the save endpoint.
#[async_trait]
pub trait ConfigBackend: Send + Sync {
    async fn load_config(&self) -> Result<ApiConfigResponse, AppError>;

    async fn test_dify(&self, base_url: &str, api_key: &str)
        -> Result<TestConnectionResult, AppError>;

    async fn test_generic_llm(
        &self,
        base_url: &str,
        api_key: &str,
        provider: ProviderId,
    ) -> Result<TestConnectionResult, AppError>;

    async fn save_config(&self, request: &SaveRequest) -> Result<SaveConfigResponse, AppError>;

    /// Called after a successful save so cached copies of the configuration
    /// are not served again.
    fn invalidate_cached_config(&self) {}
}

#[async_trait]
impl<B: ConfigBackend + ?Sized> ConfigBackend for std::sync::Arc<B> {
    async fn load_config(&self) -> Result<ApiConfigResponse, AppError> {
        (**self).load_config().await
    }

    async fn test_dify(
        &self,
        base_url: &str,
        api_key: &str,
    ) -> Result<TestConnectionResult, AppError> {
        (**self).test_dify(base_url, api_key).await
    }

    async fn test_generic_llm(
        &self,
        base_url: &str,
        api_key: &str,
        provider: ProviderId,
    ) -> Result<TestConnectionResult, AppError> {
        (**self).test_generic_llm(base_url, api_key, provider).await
    }

    async fn save_config(&self, request: &SaveRequest) -> Result<SaveConfigResponse, AppError> {
        (**self).save_config(request).await
    }

    fn invalidate_cached_config(&self) {
        (**self).invalidate_cached_config()
    }
}
