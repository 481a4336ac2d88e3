//! Allowlist-level validation with collected, structured errors.
//!
//! Unlike the fail-fast parser, validation evaluates every check and
//! reports all detected problems together, so a user correcting a large
//! allowlist is not forced through one fix-and-resubmit cycle per error.
//! Callers branch on the presence of category keys (`"units"`,
//! `"address"`), not on error counts, so the map shape is part of the
//! contract.

use crate::allowlist::AllowlistEntry;
use crate::ethereum::validate_address;
use alloy_primitives::U256;
use serde::Serialize;
use std::collections::BTreeMap;

/// One validation failure: a plain message or the list of offending values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ValidationError {
    Message(String),
    Values(Vec<String>),
}

/// Outcome of [`validate_allowlist`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: BTreeMap<String, ValidationError>,
}

/// Validates a finalized allowlist against its expected total supply.
///
/// Checks, all evaluated:
/// - the unit sum equals `expected_total_units` exactly,
/// - the unit sum is greater than zero,
/// - every address is well-formed (all offenders are collected).
pub fn validate_allowlist(
    entries: &[AllowlistEntry],
    expected_total_units: U256,
) -> ValidationResult {
    let mut errors = BTreeMap::new();

    let total = entries
        .iter()
        .try_fold(U256::ZERO, |total, entry| total.checked_add(entry.units));
    match total {
        Some(total) if total != expected_total_units => {
            errors.insert(
                "units".to_string(),
                ValidationError::Message(format!(
                    "Total units in allowlist must match total units [expected: {expected_total_units}, got: {total}]"
                )),
            );
        }
        Some(total) if total.is_zero() => {
            errors.insert(
                "units".to_string(),
                ValidationError::Message(
                    "Total units in allowlist must be greater than 0".to_string(),
                ),
            );
        }
        Some(_) => {}
        None => {
            errors.insert(
                "units".to_string(),
                ValidationError::Message("Total units in allowlist overflow uint256".to_string()),
            );
        }
    }

    let invalid: Vec<String> = entries
        .iter()
        .filter(|entry| !validate_address(&entry.address))
        .map(|entry| entry.address.clone())
        .collect();
    if !invalid.is_empty() {
        errors.insert("address".to_string(), ValidationError::Values(invalid));
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
    }
}
