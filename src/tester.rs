use crate::backend::ConfigBackend;
use crate::error::AppError;
use crate::logging::mask_secret;
use crate::models::{SlotKind, SlotStatus};
use crate::store::{ConfigurationStore, TestTarget};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct TestOutcome {
    pub slot: SlotKind,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<String>>,
    pub duration_ms: u128,
    pub checked_at: DateTime<Utc>,
    /// False when the slot changed while the test was running and the
    /// result was dropped.
    pub applied: bool,
}

pub struct ConnectionTester<'a, B: ?Sized> {
    backend: &'a B,
}

impl<'a, B: ConfigBackend + ?Sized> ConnectionTester<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Runs the remote check for `target`. Failures are folded into the
    /// outcome; this never returns an error.
    pub async fn verify(&self, target: &TestTarget) -> TestOutcome {
        info!(
            slot = %target.slot,
            address = %target.address,
            key = %mask_secret(&target.key),
            "testing connection"
        );
        let started = Instant::now();
        let result = match (target.slot, target.variant) {
            (SlotKind::Dify, _) => self.backend.test_dify(&target.address, &target.key).await,
            (SlotKind::GenericLlm, Some(provider)) => {
                self.backend
                    .test_generic_llm(&target.address, &target.key, provider)
                    .await
            }
            (SlotKind::GenericLlm, None) => Err(AppError::SlotNotTestable {
                slot: target.slot,
                status: SlotStatus::Filled,
            }),
        };
        let duration_ms = started.elapsed().as_millis();

        match result {
            Ok(response) => TestOutcome {
                slot: target.slot,
                success: true,
                message: response.message,
                models: response.models,
                duration_ms,
                checked_at: Utc::now(),
                applied: false,
            },
            Err(e) => {
                warn!(slot = %target.slot, error = %e, "connection test failed");
                TestOutcome {
                    slot: target.slot,
                    success: false,
                    message: e.user_message(),
                    models: None,
                    duration_ms,
                    checked_at: Utc::now(),
                    applied: false,
                }
            }
        }
    }

    /// Borrows the store for the whole round trip. Callers that need the
    /// `Testing` state visible meanwhile use [`ConfigurationStore::begin_test`],
    /// [`Self::verify`] and [`ConfigurationStore::record_outcome`] directly.
    pub async fn test(
        &self,
        store: &mut ConfigurationStore,
        kind: SlotKind,
    ) -> Result<TestOutcome, AppError> {
        let target = store.begin_test(kind)?;
        let outcome = self.verify(&target).await;
        Ok(store.record_outcome(&target, outcome))
    }

    /// Tests both slots concurrently. Neither slot changes unless both are testable.
    pub async fn test_both(
        &self,
        store: &mut ConfigurationStore,
    ) -> Result<(TestOutcome, TestOutcome), AppError> {
        store.prepare_test(SlotKind::Dify)?;
        store.prepare_test(SlotKind::GenericLlm)?;
        let dify = store.begin_test(SlotKind::Dify)?;
        let generic = store.begin_test(SlotKind::GenericLlm)?;

        let (dify_outcome, generic_outcome) =
            tokio::join!(self.verify(&dify), self.verify(&generic));

        Ok((
            store.record_outcome(&dify, dify_outcome),
            store.record_outcome(&generic, generic_outcome),
        ))
    }
}
