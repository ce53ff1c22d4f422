use crate::backend::cache::CachedBackend;
use crate::backend::http::HttpBackend;
use crate::backend::ConfigBackend;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::store::ConfigurationStore;
use crate::tester::ConnectionTester;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct ConfigService<B> {
    backend: B,
}

impl ConfigService<CachedBackend<HttpBackend>> {
    /// HTTP backend with the configured timeouts, wrapped in the snapshot cache.
    pub fn connect(cfg: &AppConfig, session_token: Option<String>) -> Result<Self, AppError> {
        let http = HttpBackend::new(cfg, session_token)?;
        let ttl = Duration::from_secs(cfg.config_cache_ttl_secs);
        Ok(Self::new(CachedBackend::new(http, ttl)))
    }
}

impl<B: ConfigBackend> ConfigService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn tester(&self) -> ConnectionTester<'_, B> {
        ConnectionTester::new(&self.backend)
    }

    /// Loads the persisted configuration into `store`.
    pub async fn hydrate(&self, store: &mut ConfigurationStore) -> Result<(), AppError> {
        let snapshot = self.backend.load_config().await?;
        store.hydrate(&snapshot);
        Ok(())
    }

    /// Submits the store's configuration. Only a store that passes the save
    /// gate gets as far as the network.
    pub async fn save(&self, store: &mut ConfigurationStore) -> Result<String, AppError> {
        let (request, ticket) = store.begin_save()?;
        debug!(provider = %request.generic_llm.provider, "saving configuration");

        match self.backend.save_config(&request).await {
            Ok(response) => {
                if !store.finish_save(ticket, true) {
                    debug!("configuration changed during save; store stays dirty");
                }
                self.backend.invalidate_cached_config();
                info!("configuration saved");
                Ok(response.message)
            }
            Err(e) => {
                store.finish_save(ticket, false);
                warn!(error = %e, "configuration save failed");
                Err(e)
            }
        }
    }
}
