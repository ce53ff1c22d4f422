//! Lifecycle of a single credential.
//!
//! Every status change goes through [`reduce`]; the store never assigns
//! `status` directly.

use crate::models::{CredentialField, FieldErrors, ProviderId, SlotKind, SlotStatus};
use crate::validator::validate_field;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Touched {
    pub address: bool,
    pub key: bool,
}

impl Touched {
    fn get(self, field: CredentialField) -> bool {
        match field {
            CredentialField::Address => self.address,
            CredentialField::Key => self.key,
        }
    }

    fn set(&mut self, field: CredentialField) {
        match field {
            CredentialField::Address => self.address = true,
            CredentialField::Key => self.key = true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CredentialSlot {
    pub(crate) kind: SlotKind,
    pub(crate) service_address: String,
    #[serde(skip_serializing)]
    pub(crate) secret_key: String,
    pub(crate) variant: Option<ProviderId>,
    pub(crate) status: SlotStatus,
    pub(crate) field_errors: FieldErrors,
    #[serde(skip_serializing)]
    pub(crate) touched: Touched,
    pub(crate) test_message: Option<String>,
    pub(crate) masked_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotEvent {
    FieldEdited {
        field: CredentialField,
        value: String,
    },
    FieldTouched(CredentialField),
    /// Address and key have passed validation and been normalized.
    Submitted {
        address: String,
        key: String,
    },
    SubmitRejected {
        errors: FieldErrors,
    },
    Cleared,
    VariantSelected(ProviderId),
    TestStarted,
    TestSucceeded {
        message: String,
    },
    TestFailed {
        message: String,
    },
    Hydrated {
        address: String,
        variant: Option<ProviderId>,
        masked_key: Option<String>,
    },
}

impl CredentialSlot {
    pub fn new(kind: SlotKind) -> Self {
        Self {
            kind,
            service_address: String::new(),
            secret_key: String::new(),
            variant: None,
            status: SlotStatus::Empty,
            field_errors: FieldErrors::default(),
            touched: Touched::default(),
            test_message: None,
            masked_key: None,
        }
    }

    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    pub fn service_address(&self) -> &str {
        &self.service_address
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn variant(&self) -> Option<ProviderId> {
        self.variant
    }

    pub fn status(&self) -> SlotStatus {
        self.status
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn touched(&self) -> Touched {
        self.touched
    }

    /// Message from the most recent connection test, success or failure.
    pub fn test_message(&self) -> Option<&str> {
        self.test_message.as_deref()
    }

    pub fn masked_key(&self) -> Option<&str> {
        self.masked_key.as_deref()
    }

    fn field_value(&self, field: CredentialField) -> &str {
        match field {
            CredentialField::Address => &self.service_address,
            CredentialField::Key => &self.secret_key,
        }
    }

    pub(crate) fn has_target(&self) -> bool {
        !self.kind.requires_variant() || self.variant.is_some()
    }

    /// Status a slot rests in when no test result applies.
    fn idle_status(&self) -> SlotStatus {
        let filled =
            !self.service_address.trim().is_empty() && !self.secret_key.trim().is_empty();
        if filled && self.has_target() {
            SlotStatus::Filled
        } else {
            SlotStatus::Empty
        }
    }

    fn blank(&mut self) {
        self.service_address.clear();
        self.secret_key.clear();
        self.field_errors = FieldErrors::default();
        self.touched = Touched::default();
        self.test_message = None;
        self.masked_key = None;
    }
}

pub fn reduce(slot: &CredentialSlot, event: SlotEvent) -> CredentialSlot {
    let mut next = slot.clone();
    match event {
        SlotEvent::FieldEdited { field, value } => {
            match field {
                CredentialField::Address => next.service_address = value,
                CredentialField::Key => next.secret_key = value,
            }
            if next.touched.get(field) {
                let error = validate_field(field, next.field_value(field));
                next.field_errors.set(field, error);
            }
            next.test_message = None;
            next.status = next.idle_status();
        }
        SlotEvent::FieldTouched(field) => {
            next.touched.set(field);
            let error = validate_field(field, next.field_value(field));
            next.field_errors.set(field, error);
        }
        SlotEvent::Submitted { address, key } => {
            next.service_address = address;
            next.secret_key = key;
            next.field_errors = FieldErrors::default();
            next.test_message = None;
            next.status = next.idle_status();
        }
        SlotEvent::SubmitRejected { errors } => {
            next.field_errors = errors;
            next.touched = Touched {
                address: true,
                key: true,
            };
        }
        SlotEvent::Cleared => {
            next.blank();
            next.status = SlotStatus::Empty;
        }
        SlotEvent::VariantSelected(variant) => {
            next.blank();
            next.variant = Some(variant);
            next.status = next.idle_status();
        }
        SlotEvent::TestStarted => {
            next.test_message = None;
            next.status = SlotStatus::Testing;
        }
        SlotEvent::TestSucceeded { message } => {
            next.test_message = Some(message);
            next.status = SlotStatus::Valid;
        }
        SlotEvent::TestFailed { message } => {
            next.test_message = Some(message);
            next.status = SlotStatus::Invalid;
        }
        SlotEvent::Hydrated {
            address,
            variant,
            masked_key,
        } => {
            next.blank();
            next.service_address = address;
            if next.kind.requires_variant() {
                next.variant = variant;
            }
            next.masked_key = masked_key;
            next.status = SlotStatus::Saved;
        }
    }
    if next.has_target() {
        next.field_errors.variant = None;
    }
    next
}
