//! Allowlist parsing, unit redistribution, and deduplication.
//!
//! An allowlist starts life as CSV text with a header row containing at
//! least `address` and `fractions` columns (other columns are ignored).
//! Parsing is fail-fast: allowlists are financial commitments, so a single
//! malformed row aborts the whole operation instead of silently dropping
//! the row. All row errors are collected into the returned error so a
//! large list can be corrected in one pass.
//!
//! An optional additions list reserves a share of the final supply for
//! extra recipients (e.g. a creator cut). The CSV-derived units are treated
//! as `(1 - total added percentage)` of the eventual whole, and each added
//! entry receives `floor(totalSupply * percentage)` units. The floor
//! truncation means the nominal total and the actual sum can drift apart
//! slightly; that slack is accepted and never rebalanced, because the
//! committed unit counts are what claimants will present on-chain.

use crate::error::{AllowlistError, Result};
use crate::ethereum::normalize_address;
use crate::utils::units_as_decimal;
use alloy_primitives::U256;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One finalized allowlist entry.
///
/// `address` is canonical: 0x-prefixed lowercase hex. `units` is the number
/// of fractions this address may claim; values beyond the 53-bit range are
/// common, hence the 256-bit representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowlistEntry {
    pub address: String,
    #[serde(with = "units_as_decimal")]
    pub units: U256,
}

/// A percentage-of-total allocation appended after CSV parsing.
///
/// `percentage` is the fraction of the final (post-addition) total supply
/// this address should receive, in `[0.0, 1.0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalAllocation {
    pub address: String,
    pub percentage: f64,
}

/// Parses allowlist CSV text into finalized entries.
///
/// Processing order matters and is fixed, because the total-supply math for
/// additions depends on it:
///
/// 1. parse all rows (collecting every row error; any error aborts),
/// 2. sum the CSV units and reject a non-positive total,
/// 3. bounds-check the additions list,
/// 4. derive the final total supply and append one entry per addition,
/// 5. optionally deduplicate (first-seen order, units summed per address).
///
/// With `deduplicate` false the concatenated list is returned as-is: CSV
/// rows first, then additions, duplicates preserved as independent entries.
pub fn parse_allowlist_csv(
    csv_text: &str,
    deduplicate: bool,
    additions: &[AdditionalAllocation],
) -> Result<Vec<AllowlistEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(csv_text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AllowlistError::malformed(format!("Failed to parse CSV header: {e}")))?
        .clone();
    let address_col = headers.iter().position(|h| h == "address");
    let fractions_col = headers.iter().position(|h| h == "fractions");
    let (address_col, fractions_col) = match (address_col, fractions_col) {
        (Some(a), Some(f)) => (a, f),
        _ => {
            return Err(AllowlistError::malformed(
                "CSV header must contain `address` and `fractions` columns",
            ))
        }
    };

    let mut entries = Vec::new();
    let mut row_errors = Vec::new();
    for (row_index, record) in reader.records().enumerate() {
        // header occupies line 1
        let line = row_index + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                row_errors.push(format!("row {line}: {e}"));
                continue;
            }
        };

        let address = match record.get(address_col).filter(|raw| !raw.is_empty()) {
            Some(raw) => match normalize_address(raw) {
                Ok(address) => Some(address),
                Err(e) => {
                    row_errors.push(format!("row {line}: {e}"));
                    None
                }
            },
            None => {
                row_errors.push(format!("row {line}: missing address"));
                None
            }
        };

        let units = match record.get(fractions_col).filter(|raw| !raw.is_empty()) {
            Some(raw) => match U256::from_str_radix(raw, 10) {
                Ok(units) => Some(units),
                Err(_) => {
                    row_errors.push(format!(
                        "row {line}: fractions value `{raw}` is not a non-negative integer"
                    ));
                    None
                }
            },
            None => {
                row_errors.push(format!("row {line}: missing fractions"));
                None
            }
        };

        if let (Some(address), Some(units)) = (address, units) {
            entries.push(AllowlistEntry { address, units });
        }
    }

    if !row_errors.is_empty() {
        return Err(AllowlistError::MalformedData {
            message: "Failed to parse allowlist CSV".to_string(),
            errors: row_errors,
        });
    }

    let csv_total = total_units(&entries)?;
    if csv_total.is_zero() {
        return Err(AllowlistError::malformed(
            "Allowlist must contain more than zero total units",
        ));
    }

    let add_total = validate_additions(additions)?;

    if !additions.is_empty() {
        // the CSV-derived units represent (1 - add_total) of the whole
        let total_supply = units_to_f64(csv_total) / (1.0 - add_total);
        debug!(
            "csv total {csv_total}, additions claim {add_total}, derived total supply {total_supply}"
        );
        for addition in additions {
            let address = normalize_address(&addition.address)?;
            let units = units_from_f64(total_supply * addition.percentage)?;
            entries.push(AllowlistEntry { address, units });
        }
        // appended units can only overflow here, not in the dedup pass
        total_units(&entries)?;
    }

    if deduplicate {
        entries = deduplicate_entries(entries);
    }

    Ok(entries)
}

/// Merges duplicate addresses into one entry each, summing units.
///
/// Order of first appearance is preserved. Addresses are expected to be in
/// canonical form already; no normalization happens here.
pub fn deduplicate_entries(entries: Vec<AllowlistEntry>) -> Vec<AllowlistEntry> {
    let mut merged: Vec<AllowlistEntry> = Vec::with_capacity(entries.len());
    let mut index_by_address: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        match index_by_address.get(&entry.address) {
            Some(&i) => merged[i].units = merged[i].units.saturating_add(entry.units),
            None => {
                index_by_address.insert(entry.address.clone(), merged.len());
                merged.push(entry);
            }
        }
    }

    merged
}

/// Sums entry units, rejecting uint256 overflow.
pub fn total_units(entries: &[AllowlistEntry]) -> Result<U256> {
    entries
        .iter()
        .try_fold(U256::ZERO, |total, entry| total.checked_add(entry.units))
        .ok_or_else(|| AllowlistError::out_of_bounds("Total allowlist units overflow uint256"))
}

fn validate_additions(additions: &[AdditionalAllocation]) -> Result<f64> {
    let mut total = 0.0;
    for addition in additions {
        let percentage = addition.percentage;
        if !(0.0..1.0).contains(&percentage) {
            return Err(AllowlistError::out_of_bounds(format!(
                "Allocation percentage for {} must be within [0.0, 1.0), got {percentage}",
                addition.address
            )));
        }
        total += percentage;
    }
    if !(0.0..1.0).contains(&total) {
        return Err(AllowlistError::out_of_bounds(format!(
            "Total allocation percentage must be within [0.0, 1.0), got {total}"
        )));
    }
    Ok(total)
}

// Added unit counts derive from real-number division and multiplication,
// floored back to integers. Counts far beyond 2^53 lose precision on this
// path; whatever this math produces is what gets committed.
fn units_to_f64(units: U256) -> f64 {
    units.to_string().parse::<f64>().unwrap_or(f64::MAX)
}

fn units_from_f64(value: f64) -> Result<U256> {
    let floored = value.floor();
    if !floored.is_finite() || floored < 0.0 {
        return Err(AllowlistError::out_of_bounds(format!(
            "Computed unit count {value} is not representable"
        )));
    }
    U256::from_str_radix(&format!("{floored:.0}"), 10).map_err(|_| {
        AllowlistError::out_of_bounds(format!(
            "Computed unit count {value} exceeds the uint256 range"
        ))
    })
}
