//! Aggregate root holding both credential slots and the model parameters.

use crate::error::AppError;
use crate::models::{
    ApiConfigResponse, CredentialField, DifyCredentialPayload, FieldErrors,
    GenericLlmCredentialPayload, ProviderId, SaveRequest, SlotKind, SlotStatus,
};
use crate::params::{ParamErrors, ParamUpdate, ParameterBlock};
use crate::slot::{reduce, CredentialSlot, SlotEvent};
use crate::tester::TestOutcome;
use crate::validator::{clamp_input, normalize, validate, PROVIDER_REQUIRED};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitAction {
    Saved,
    Cleared,
    ValidationFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    pub success: bool,
    pub action: SubmitAction,
}

impl SubmitOutcome {
    fn saved() -> Self {
        Self {
            success: true,
            action: SubmitAction::Saved,
        }
    }

    fn cleared() -> Self {
        Self {
            success: true,
            action: SubmitAction::Cleared,
        }
    }

    fn validation_failed() -> Self {
        Self {
            success: false,
            action: SubmitAction::ValidationFailed,
        }
    }
}

/// The exact credential values a connection test was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestTarget {
    pub slot: SlotKind,
    pub address: String,
    pub key: String,
    pub variant: Option<ProviderId>,
}

impl TestTarget {
    fn matches(&self, slot: &CredentialSlot) -> bool {
        slot.kind() == self.slot
            && slot.service_address() == self.address
            && slot.secret_key() == self.key
            && slot.variant() == self.variant
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket {
    revision: u64,
}

#[derive(Debug, Clone)]
pub struct ConfigurationStore {
    dify: CredentialSlot,
    generic_llm: CredentialSlot,
    params: ParameterBlock,
    is_hydrated: bool,
    is_dirty: bool,
    revision: u64,
    save_in_flight: bool,
}

impl Default for ConfigurationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationStore {
    pub fn new() -> Self {
        Self {
            dify: CredentialSlot::new(SlotKind::Dify),
            generic_llm: CredentialSlot::new(SlotKind::GenericLlm),
            params: ParameterBlock::default(),
            is_hydrated: false,
            is_dirty: false,
            revision: 0,
            save_in_flight: false,
        }
    }

    pub fn slot(&self, kind: SlotKind) -> &CredentialSlot {
        match kind {
            SlotKind::Dify => &self.dify,
            SlotKind::GenericLlm => &self.generic_llm,
        }
    }

    pub fn dify(&self) -> &CredentialSlot {
        &self.dify
    }

    pub fn generic_llm(&self) -> &CredentialSlot {
        &self.generic_llm
    }

    pub fn params(&self) -> &ParameterBlock {
        &self.params
    }

    pub fn param_errors(&self) -> ParamErrors {
        self.params.errors()
    }

    pub fn is_hydrated(&self) -> bool {
        self.is_hydrated
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn is_saving(&self) -> bool {
        self.save_in_flight
    }

    fn dispatch(&mut self, kind: SlotKind, event: SlotEvent) {
        let slot = match kind {
            SlotKind::Dify => &mut self.dify,
            SlotKind::GenericLlm => &mut self.generic_llm,
        };
        *slot = reduce(slot, event);
    }

    fn mark_dirty(&mut self) {
        self.is_dirty = true;
        self.revision += 1;
    }

    pub fn edit_field(&mut self, kind: SlotKind, field: CredentialField, value: &str) {
        let value = clamp_input(field, value);
        self.dispatch(kind, SlotEvent::FieldEdited { field, value });
        self.mark_dirty();
    }

    /// Marks a field as visited so later edits re-validate it.
    pub fn touch_field(&mut self, kind: SlotKind, field: CredentialField) {
        self.dispatch(kind, SlotEvent::FieldTouched(field));
    }

    /// Switches the generic-model provider, discarding whatever was typed for the old one.
    pub fn select_variant(&mut self, variant: ProviderId) {
        self.dispatch(SlotKind::GenericLlm, SlotEvent::VariantSelected(variant));
        self.mark_dirty();
        debug!(provider = %variant, "generic-llm provider selected");
    }

    pub fn submit(&mut self, kind: SlotKind) -> SubmitOutcome {
        let slot = self.slot(kind);
        let address = slot.service_address().trim().to_string();
        let key = slot.secret_key().trim().to_string();

        if address.is_empty() && key.is_empty() {
            self.dispatch(kind, SlotEvent::Cleared);
            self.mark_dirty();
            info!(slot = %kind, "credential cleared");
            return SubmitOutcome::cleared();
        }

        let validation = validate(&address, &key);
        let missing_variant = kind.requires_variant() && slot.variant().is_none();
        if !validation.valid || missing_variant {
            let errors = FieldErrors {
                variant: missing_variant.then(|| PROVIDER_REQUIRED.to_string()),
                ..validation.errors
            };
            debug!(slot = %kind, errors = ?errors.messages(), "submission rejected");
            self.dispatch(kind, SlotEvent::SubmitRejected { errors });
            return SubmitOutcome::validation_failed();
        }

        let address = normalize(&address);
        info!(slot = %kind, address = %address, "credential submitted");
        self.dispatch(kind, SlotEvent::Submitted { address, key });
        self.mark_dirty();
        SubmitOutcome::saved()
    }

    /// Captures what a connection test for `kind` would verify, without
    /// changing any state.
    pub fn prepare_test(&self, kind: SlotKind) -> Result<TestTarget, AppError> {
        let slot = self.slot(kind);
        let testable = matches!(
            slot.status(),
            SlotStatus::Filled
                | SlotStatus::Saved
                | SlotStatus::Valid
                | SlotStatus::Invalid
                | SlotStatus::Testing
        );
        if !testable || !slot.has_target() {
            return Err(AppError::SlotNotTestable {
                slot: kind,
                status: slot.status(),
            });
        }
        Ok(TestTarget {
            slot: kind,
            address: slot.service_address().to_string(),
            key: slot.secret_key().to_string(),
            variant: slot.variant(),
        })
    }

    pub fn begin_test(&mut self, kind: SlotKind) -> Result<TestTarget, AppError> {
        let target = self.prepare_test(kind)?;
        self.dispatch(kind, SlotEvent::TestStarted);
        self.mark_dirty();
        Ok(target)
    }

    /// Records a finished test. Returns `false` when the slot no longer holds
    /// the values that were tested, in which case nothing changes.
    pub fn apply_test_result(
        &mut self,
        target: &TestTarget,
        result: Result<String, String>,
    ) -> bool {
        if !target.matches(self.slot(target.slot)) {
            debug!(slot = %target.slot, "discarding test result for superseded credential values");
            return false;
        }
        let event = match result {
            Ok(message) => SlotEvent::TestSucceeded { message },
            Err(message) => SlotEvent::TestFailed { message },
        };
        self.dispatch(target.slot, event);
        self.mark_dirty();
        true
    }

    /// Records a finished [`TestOutcome`] for `target`, reporting through
    /// `applied` whether it reached the slot.
    pub fn record_outcome(&mut self, target: &TestTarget, outcome: TestOutcome) -> TestOutcome {
        let result = if outcome.success {
            Ok(outcome.message.clone())
        } else {
            Err(outcome.message.clone())
        };
        let applied = self.apply_test_result(target, result);
        TestOutcome { applied, ..outcome }
    }

    pub fn hydrate(&mut self, snapshot: &ApiConfigResponse) {
        if snapshot.has_dify_key {
            if let Some(address) = non_blank(snapshot.dify_base_url.as_deref()) {
                self.dispatch(
                    SlotKind::Dify,
                    SlotEvent::Hydrated {
                        address,
                        variant: None,
                        masked_key: snapshot.masked_dify_key.clone(),
                    },
                );
            }
        }

        if snapshot.has_generic_llm_key {
            if let Some(address) = non_blank(snapshot.generic_llm_base_url.as_deref()) {
                let variant = snapshot.generic_llm_provider.as_deref().and_then(|raw| {
                    raw.parse::<ProviderId>()
                        .map_err(|e| warn!(error = %e, "ignoring unknown provider from backend"))
                        .ok()
                });
                self.dispatch(
                    SlotKind::GenericLlm,
                    SlotEvent::Hydrated {
                        address,
                        variant,
                        masked_key: snapshot.masked_generic_llm_key.clone(),
                    },
                );
            }
        }

        self.params = ParameterBlock::from(snapshot.teacher_settings);
        self.is_hydrated = true;
        self.is_dirty = false;
        info!(
            dify = %self.dify.status(),
            generic_llm = %self.generic_llm.status(),
            "configuration hydrated"
        );
    }

    pub fn set_params(&mut self, update: ParamUpdate) {
        self.params.apply(update);
        self.mark_dirty();
    }

    pub fn reset_params(&mut self) {
        self.params = ParameterBlock::default();
        self.mark_dirty();
    }

    /// Save gate. A `Saved` slot never satisfies it: the secret was not
    /// verified in this session.
    pub fn can_save(&self) -> bool {
        self.dify.status() == SlotStatus::Valid
            && self.generic_llm.status() == SlotStatus::Valid
            && !self.dify.secret_key().is_empty()
            && !self.generic_llm.secret_key().is_empty()
            && !self.params.has_errors()
    }

    /// Builds the payload for the save endpoint, re-checking every condition
    /// of the save gate regardless of what the caller already checked.
    pub fn build_save_request(&self) -> Result<SaveRequest, AppError> {
        let dify = &self.dify;
        let generic = &self.generic_llm;

        let dify_ready = dify.status() == SlotStatus::Valid
            && !dify.secret_key().is_empty()
            && !dify.service_address().is_empty();
        let generic_ready = generic.status() == SlotStatus::Valid
            && !generic.secret_key().is_empty()
            && !generic.service_address().is_empty();

        let Some(provider) = generic.variant() else {
            warn!("save request refused: generic-llm provider missing");
            return Err(AppError::IncompleteConfiguration);
        };
        if !dify_ready || !generic_ready || self.params.has_errors() {
            warn!(
                dify = %dify.status(),
                generic_llm = %generic.status(),
                params_invalid = self.params.has_errors(),
                "save request refused"
            );
            return Err(AppError::IncompleteConfiguration);
        }

        Ok(SaveRequest {
            dify: DifyCredentialPayload {
                base_url: dify.service_address().to_string(),
                api_key: dify.secret_key().to_string(),
            },
            generic_llm: GenericLlmCredentialPayload {
                provider,
                base_url: generic.service_address().to_string(),
                api_key: generic.secret_key().to_string(),
            },
            teacher_settings: self.params.to_wire(),
        })
    }

    pub fn begin_save(&mut self) -> Result<(SaveRequest, SaveTicket), AppError> {
        if self.save_in_flight {
            return Err(AppError::SaveInFlight);
        }
        let request = self.build_save_request()?;
        self.save_in_flight = true;
        Ok((
            request,
            SaveTicket {
                revision: self.revision,
            },
        ))
    }

    /// Ends the pending save. Slot statuses are left alone; the dirty flag is
    /// cleared only if nothing changed while the save was in flight.
    pub fn finish_save(&mut self, ticket: SaveTicket, succeeded: bool) -> bool {
        self.save_in_flight = false;
        if succeeded && ticket.revision == self.revision {
            self.is_dirty = false;
            return true;
        }
        false
    }
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeacherSettingsWire;

    fn fill(store: &mut ConfigurationStore, kind: SlotKind, address: &str, key: &str) {
        store.edit_field(kind, CredentialField::Address, address);
        store.edit_field(kind, CredentialField::Key, key);
    }

    fn verified_store() -> ConfigurationStore {
        let mut store = ConfigurationStore::new();
        fill(&mut store, SlotKind::Dify, "https://api.dify.ai", "app-test");
        assert!(store.submit(SlotKind::Dify).success);
        store.select_variant(ProviderId::SiliconFlow);
        fill(
            &mut store,
            SlotKind::GenericLlm,
            "https://api.siliconflow.cn",
            "sk-test",
        );
        assert!(store.submit(SlotKind::GenericLlm).success);
        for kind in [SlotKind::Dify, SlotKind::GenericLlm] {
            let target = store.begin_test(kind).expect("testable");
            assert!(store.apply_test_result(&target, Ok("ok".into())));
        }
        store
    }

    fn snapshot() -> ApiConfigResponse {
        ApiConfigResponse {
            has_dify_key: true,
            has_generic_llm_key: true,
            dify_base_url: Some("https://x.com".into()),
            generic_llm_base_url: Some("https://api.siliconflow.cn".into()),
            generic_llm_provider: Some("siliconflow".into()),
            masked_dify_key: Some("app-****abcd".into()),
            masked_generic_llm_key: Some("sk-1****wxyz".into()),
            teacher_settings: TeacherSettingsWire {
                temperature: 1.2,
                top_p: 0.5,
                max_tokens: 1024,
            },
        }
    }

    #[test]
    fn submit_well_formed_dify_credential() {
        let mut store = ConfigurationStore::new();
        fill(&mut store, SlotKind::Dify, "https://api.dify.ai", "app-test");
        let outcome = store.submit(SlotKind::Dify);
        assert_eq!(
            outcome,
            SubmitOutcome {
                success: true,
                action: SubmitAction::Saved
            }
        );
        assert_eq!(store.dify().service_address(), "https://api.dify.ai");
        assert_eq!(store.dify().secret_key(), "app-test");
        assert_eq!(store.dify().status(), SlotStatus::Filled);
    }

    #[test]
    fn submit_normalizes_address_and_trims_key() {
        let mut store = ConfigurationStore::new();
        fill(
            &mut store,
            SlotKind::Dify,
            "  https://api.dify.ai/v1/  ",
            "  app-test ",
        );
        assert!(store.submit(SlotKind::Dify).success);
        assert_eq!(store.dify().service_address(), "https://api.dify.ai");
        assert_eq!(store.dify().secret_key(), "app-test");
    }

    #[test]
    fn submit_invalid_address_reports_field_error() {
        let mut store = ConfigurationStore::new();
        fill(&mut store, SlotKind::Dify, "invalid-url", "x");
        let outcome = store.submit(SlotKind::Dify);
        assert_eq!(
            outcome,
            SubmitOutcome {
                success: false,
                action: SubmitAction::ValidationFailed
            }
        );
        let slot = store.dify();
        assert_eq!(
            slot.field_errors().address.as_deref(),
            Some("must be a valid HTTP/HTTPS address")
        );
        assert_eq!(slot.service_address(), "invalid-url");
        assert!(slot.touched().address && slot.touched().key);
    }

    #[test]
    fn submit_blank_fields_clears_and_keeps_variant() {
        let mut store = ConfigurationStore::new();
        store.select_variant(ProviderId::ModelScope);
        fill(&mut store, SlotKind::GenericLlm, "https://m.example.com", "k");
        store.submit(SlotKind::GenericLlm);
        fill(&mut store, SlotKind::GenericLlm, "  ", "");

        let outcome = store.submit(SlotKind::GenericLlm);
        assert_eq!(outcome.action, SubmitAction::Cleared);
        let slot = store.generic_llm();
        assert_eq!(slot.status(), SlotStatus::Empty);
        assert_eq!(slot.service_address(), "");
        assert_eq!(slot.secret_key(), "");
        assert_eq!(slot.variant(), Some(ProviderId::ModelScope));
    }

    #[test]
    fn generic_submit_fails_closed_without_variant() {
        let mut store = ConfigurationStore::new();
        fill(
            &mut store,
            SlotKind::GenericLlm,
            "https://api.siliconflow.cn",
            "sk-1",
        );
        let outcome = store.submit(SlotKind::GenericLlm);
        assert_eq!(outcome.action, SubmitAction::ValidationFailed);
        assert_eq!(
            store.generic_llm().field_errors().variant.as_deref(),
            Some("provider required")
        );
        assert_eq!(store.generic_llm().status(), SlotStatus::Empty);
    }

    #[test]
    fn slots_are_isolated_from_each_other() {
        let mut store = ConfigurationStore::new();
        fill(&mut store, SlotKind::Dify, "https://api.dify.ai", "app-1");
        store.submit(SlotKind::Dify);
        let dify_before = store.dify().clone();

        store.select_variant(ProviderId::SiliconFlow);
        fill(&mut store, SlotKind::GenericLlm, "garbage", "");
        store.touch_field(SlotKind::GenericLlm, CredentialField::Address);
        store.submit(SlotKind::GenericLlm);
        store.select_variant(ProviderId::ModelScope);
        assert_eq!(store.dify(), &dify_before);

        let generic_before = store.generic_llm().clone();
        fill(&mut store, SlotKind::Dify, "", "");
        store.submit(SlotKind::Dify);
        assert_eq!(store.generic_llm(), &generic_before);
    }

    #[test]
    fn edits_are_clamped_at_the_input_boundary() {
        let mut store = ConfigurationStore::new();
        store.edit_field(SlotKind::Dify, CredentialField::Key, &"k".repeat(1000));
        assert_eq!(store.dify().secret_key().len(), 256);
    }

    #[test]
    fn empty_slot_cannot_be_tested() {
        let mut store = ConfigurationStore::new();
        let err = store.begin_test(SlotKind::Dify).expect_err("empty slot");
        assert!(matches!(
            err,
            AppError::SlotNotTestable {
                slot: SlotKind::Dify,
                status: SlotStatus::Empty
            }
        ));
        assert_eq!(store.dify().status(), SlotStatus::Empty);
    }

    #[test]
    fn stale_test_result_is_discarded_after_edit() {
        let mut store = ConfigurationStore::new();
        fill(&mut store, SlotKind::Dify, "https://api.dify.ai", "app-1");
        let target = store.begin_test(SlotKind::Dify).expect("testable");
        assert_eq!(store.dify().status(), SlotStatus::Testing);

        store.edit_field(SlotKind::Dify, CredentialField::Key, "app-2");
        assert!(!store.apply_test_result(&target, Ok("ok".into())));
        assert_eq!(store.dify().status(), SlotStatus::Filled);
    }

    #[test]
    fn last_resolution_wins_for_same_values() {
        let mut store = ConfigurationStore::new();
        fill(&mut store, SlotKind::Dify, "https://api.dify.ai", "app-1");
        let first = store.begin_test(SlotKind::Dify).expect("testable");
        let second = store.begin_test(SlotKind::Dify).expect("retestable");

        store.apply_test_result(&second, Err("timeout".into()));
        store.apply_test_result(&first, Ok("ok".into()));
        assert_eq!(store.dify().status(), SlotStatus::Valid);
    }

    fn outcome(slot: SlotKind, success: bool, message: &str) -> TestOutcome {
        TestOutcome {
            slot,
            success,
            message: message.into(),
            models: None,
            duration_ms: 12,
            checked_at: chrono::Utc::now(),
            applied: false,
        }
    }

    #[test]
    fn record_outcome_reports_whether_result_was_applied() {
        let mut store = ConfigurationStore::new();
        fill(&mut store, SlotKind::Dify, "https://api.dify.ai", "app-1");

        let target = store.begin_test(SlotKind::Dify).expect("testable");
        let recorded =
            store.record_outcome(&target, outcome(SlotKind::Dify, false, "invalid API key"));
        assert!(recorded.applied);
        assert_eq!(store.dify().status(), SlotStatus::Invalid);
        assert_eq!(store.dify().test_message(), Some("invalid API key"));

        let target = store.begin_test(SlotKind::Dify).expect("retestable");
        store.edit_field(SlotKind::Dify, CredentialField::Address, "https://other.dify.ai");
        let recorded = store.record_outcome(&target, outcome(SlotKind::Dify, true, "ok"));
        assert!(!recorded.applied);
        assert_eq!(store.dify().status(), SlotStatus::Filled);
    }

    #[test]
    fn can_save_requires_both_valid_slots_and_clean_params() {
        let mut store = verified_store();
        assert!(store.can_save());

        store.set_params(ParamUpdate {
            temperature: Some(5.0),
            ..ParamUpdate::default()
        });
        assert!(!store.can_save());
        store.reset_params();
        assert!(store.can_save());

        let target = store.begin_test(SlotKind::GenericLlm).expect("testable");
        assert!(!store.can_save());
        store.apply_test_result(&target, Err("bad key".into()));
        assert_eq!(store.generic_llm().status(), SlotStatus::Invalid);
        assert!(!store.can_save());
    }

    #[test]
    fn hydrated_slots_never_satisfy_save_gate() {
        let mut store = ConfigurationStore::new();
        store.hydrate(&snapshot());

        let dify = store.dify();
        assert_eq!(dify.status(), SlotStatus::Saved);
        assert_eq!(dify.service_address(), "https://x.com");
        assert_eq!(dify.secret_key(), "");
        assert_eq!(dify.masked_key(), Some("app-****abcd"));
        assert_eq!(store.generic_llm().variant(), Some(ProviderId::SiliconFlow));
        assert_eq!(store.params().max_tokens, 1024);
        assert!(store.is_hydrated());
        assert!(!store.is_dirty());
        assert!(!store.can_save());
        assert!(matches!(
            store.build_save_request(),
            Err(AppError::IncompleteConfiguration)
        ));
    }

    #[test]
    fn hydration_skips_unconfigured_credentials() {
        let mut store = ConfigurationStore::new();
        let mut snap = snapshot();
        snap.has_dify_key = false;
        snap.generic_llm_base_url = Some("   ".into());
        store.hydrate(&snap);
        assert_eq!(store.dify().status(), SlotStatus::Empty);
        assert_eq!(store.generic_llm().status(), SlotStatus::Empty);
    }

    #[test]
    fn hydration_with_unknown_provider_leaves_variant_unset() {
        let mut store = ConfigurationStore::new();
        let mut snap = snapshot();
        snap.generic_llm_provider = Some("deepseek".into());
        store.hydrate(&snap);
        assert_eq!(store.generic_llm().status(), SlotStatus::Saved);
        assert_eq!(store.generic_llm().variant(), None);
        assert!(store.begin_test(SlotKind::GenericLlm).is_err());
    }

    #[test]
    fn build_save_request_rechecks_directly_mutated_state() {
        let mut store = verified_store();
        store.dify.secret_key.clear();
        assert!(!store.can_save());
        assert!(matches!(
            store.build_save_request(),
            Err(AppError::IncompleteConfiguration)
        ));

        let mut store = verified_store();
        store.generic_llm.variant = None;
        assert!(store.can_save());
        assert!(matches!(
            store.build_save_request(),
            Err(AppError::IncompleteConfiguration)
        ));

        let mut store = verified_store();
        store.dify.status = SlotStatus::Saved;
        assert!(store.build_save_request().is_err());
    }

    #[test]
    fn build_save_request_copies_verified_values() {
        let store = verified_store();
        let req = store.build_save_request().expect("complete configuration");
        assert_eq!(req.dify.base_url, "https://api.dify.ai");
        assert_eq!(req.dify.api_key, "app-test");
        assert_eq!(req.generic_llm.provider, ProviderId::SiliconFlow);
        assert_eq!(req.generic_llm.api_key, "sk-test");
        assert_eq!(req.teacher_settings.max_tokens, 2048);
    }

    #[test]
    fn save_is_single_flight_and_clears_dirty() {
        let mut store = verified_store();
        assert!(store.is_dirty());

        let (_, ticket) = store.begin_save().expect("save allowed");
        assert!(store.is_saving());
        assert!(matches!(store.begin_save(), Err(AppError::SaveInFlight)));

        assert!(store.finish_save(ticket, true));
        assert!(!store.is_saving());
        assert!(!store.is_dirty());
        assert_eq!(store.dify().status(), SlotStatus::Valid);
        assert_eq!(store.generic_llm().status(), SlotStatus::Valid);
    }

    #[test]
    fn edits_during_save_keep_store_dirty() {
        let mut store = verified_store();
        let (_, ticket) = store.begin_save().expect("save allowed");
        store.set_params(ParamUpdate {
            top_p: Some(0.4),
            ..ParamUpdate::default()
        });
        assert!(!store.finish_save(ticket, true));
        assert!(store.is_dirty());
    }

    #[test]
    fn failed_save_leaves_store_dirty() {
        let mut store = verified_store();
        let (_, ticket) = store.begin_save().expect("save allowed");
        assert!(!store.finish_save(ticket, false));
        assert!(store.is_dirty());
        assert!(!store.is_saving());
    }

    #[test]
    fn variant_switch_after_verification_requires_new_credentials() {
        let mut store = verified_store();
        store.select_variant(ProviderId::ModelScope);
        let slot = store.generic_llm();
        assert_eq!(slot.status(), SlotStatus::Empty);
        assert_eq!(slot.secret_key(), "");
        assert!(!store.can_save());
    }
}
