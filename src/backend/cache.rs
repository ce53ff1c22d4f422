use crate::backend::ConfigBackend;
use crate::error::AppError;
use crate::models::{
    ApiConfigResponse, ProviderId, SaveConfigResponse, SaveRequest, TestConnectionResult,
};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Keeps the last configuration snapshot for `ttl`. Everything other than
/// `load_config` goes straight to the inner backend.
pub struct CachedBackend<B> {
    inner: B,
    ttl: Duration,
    snapshot: Mutex<Option<(Instant, ApiConfigResponse)>>,
}

impl<B: ConfigBackend> CachedBackend<B> {
    pub fn new(inner: B, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            snapshot: Mutex::new(None),
        }
    }

    fn cached(&self) -> Option<ApiConfigResponse> {
        let guard = self.snapshot.lock().ok()?;
        match guard.as_ref() {
            Some((stored_at, snapshot)) if stored_at.elapsed() < self.ttl => Some(snapshot.clone()),
            _ => None,
        }
    }

    fn store(&self, snapshot: &ApiConfigResponse) {
        if let Ok(mut guard) = self.snapshot.lock() {
            *guard = Some((Instant::now(), snapshot.clone()));
        }
    }
}

#[async_trait]
impl<B: ConfigBackend> ConfigBackend for CachedBackend<B> {
    async fn load_config(&self) -> Result<ApiConfigResponse, AppError> {
        if let Some(snapshot) = self.cached() {
            debug!("configuration served from cache");
            return Ok(snapshot);
        }
        let snapshot = self.inner.load_config().await?;
        self.store(&snapshot);
        Ok(snapshot)
    }

    async fn test_dify(
        &self,
        base_url: &str,
        api_key: &str,
    ) -> Result<TestConnectionResult, AppError> {
        self.inner.test_dify(base_url, api_key).await
    }

    async fn test_generic_llm(
        &self,
        base_url: &str,
        api_key: &str,
        provider: ProviderId,
    ) -> Result<TestConnectionResult, AppError> {
        self.inner.test_generic_llm(base_url, api_key, provider).await
    }

    async fn save_config(&self, request: &SaveRequest) -> Result<SaveConfigResponse, AppError> {
        self.inner.save_config(request).await
    }

    fn invalidate_cached_config(&self) {
        if let Ok(mut guard) = self.snapshot.lock() {
            *guard = None;
        }
        debug!("cached configuration invalidated");
        self.inner.invalidate_cached_config();
    }
}
