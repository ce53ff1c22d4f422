//! Well-formedness checks shared by both credential forms.

use crate::models::{CredentialField, FieldErrors};
use url::Url;

pub const ADDRESS_MAX_LENGTH: usize = 512;
pub const KEY_MAX_LENGTH: usize = 256;

pub const ADDRESS_REQUIRED: &str = "address required";
pub const ADDRESS_INVALID: &str = "must be a valid HTTP/HTTPS address";
pub const KEY_REQUIRED: &str = "key required";
pub const PROVIDER_REQUIRED: &str = "provider required";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: FieldErrors,
}

pub fn is_valid_url(raw: &str) -> bool {
    Url::parse(raw).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

pub fn validate_field(field: CredentialField, value: &str) -> Option<String> {
    match field {
        CredentialField::Address => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Some(ADDRESS_REQUIRED.to_string())
            } else if !is_valid_url(trimmed) {
                Some(ADDRESS_INVALID.to_string())
            } else {
                None
            }
        }
        CredentialField::Key => value
            .trim()
            .is_empty()
            .then(|| KEY_REQUIRED.to_string()),
    }
}

pub fn validate(address: &str, key: &str) -> ValidationResult {
    let errors = FieldErrors {
        address: validate_field(CredentialField::Address, address),
        key: validate_field(CredentialField::Key, key),
        variant: None,
    };
    ValidationResult {
        valid: errors.is_empty(),
        errors,
    }
}

/// Reduces an address to its origin. Never fails: unparseable input comes back
/// trimmed with trailing slashes removed.
pub fn normalize(address: &str) -> String {
    let stripped = address.trim().trim_end_matches('/');
    match Url::parse(stripped) {
        Ok(parsed) => {
            let origin = parsed.origin();
            if origin.is_tuple() {
                origin.ascii_serialization()
            } else {
                stripped.to_string()
            }
        }
        Err(_) => stripped.to_string(),
    }
}

/// Hard input ceiling applied at the edit boundary.
pub fn clamp_input(field: CredentialField, value: &str) -> String {
    let max = match field {
        CredentialField::Address => ADDRESS_MAX_LENGTH,
        CredentialField::Key => KEY_MAX_LENGTH,
    };
    if value.chars().count() <= max {
        value.to_string()
    } else {
        value.chars().take(max).collect()
    }
}
