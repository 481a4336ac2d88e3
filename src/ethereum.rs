//! Ethereum address validation and normalization utilities.
//!
//! The canonical form of an address throughout this crate is a 0x-prefixed,
//! 40-character lowercase hex string. Everything that stores or hashes an
//! address normalizes it through here first.

use crate::error::{AllowlistError, Result};
use crate::utils::validate_and_strip_hex;

/// Expected length of an Ethereum address in hex characters (excluding 0x prefix)
/// Ethereum addresses are 20 bytes = 40 hex characters
pub const ADDRESS_HEX_LENGTH: usize = 40;

/// Validates and normalizes a single Ethereum address.
///
/// The 0x prefix is required: an allowlist row that omits it does not
/// conform and fails the parse.
///
/// # Arguments
///
/// * `address` - The Ethereum address to validate and normalize
///
/// # Returns
///
/// A normalized address: 0x prefix followed by 40 lowercase hex characters
///
/// # Errors
///
/// Returns an error if:
/// - The address does not start with "0x"
/// - The address is not exactly 40 hex characters after the prefix
/// - The address contains non-hex characters
pub fn normalize_address(address: &str) -> Result<String> {
    let trimmed = address.trim();
    if !trimmed.starts_with("0x") && !trimmed.starts_with("0X") {
        return Err(AllowlistError::malformed(format!(
            "Invalid address '{trimmed}': missing 0x prefix"
        )));
    }
    let stripped = validate_and_strip_hex(trimmed, ADDRESS_HEX_LENGTH).map_err(|e| {
        AllowlistError::malformed(format!("Invalid address '{trimmed}': {e}"))
    })?;
    Ok(format!("0x{}", stripped.to_lowercase()))
}

/// Validates a single Ethereum address.
///
/// An address is considered valid if:
/// - It is exactly 42 characters (including 0x prefix)
/// - It starts with "0x"
/// - All remaining characters are valid hex digits
///
/// # Arguments
///
/// * `address` - The Ethereum address to validate
///
/// # Returns
///
/// `true` if the address is valid, `false` otherwise
#[must_use]
pub fn validate_address(address: &str) -> bool {
    address.len() == 42
        && address.starts_with("0x")
        && address[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Validates a batch of Ethereum addresses.
///
/// Returns true if all addresses are valid, false otherwise.
#[must_use]
pub fn validate_addresses_batch(addresses: &[String]) -> bool {
    addresses.iter().all(|addr| validate_address(addr))
}

/// Decodes a normalized or checksummed Ethereum address to its 20 bytes.
pub fn address_to_bytes(address: &str) -> Result<[u8; 20]> {
    let stripped = validate_and_strip_hex(address, ADDRESS_HEX_LENGTH)?;
    let mut bytes = [0u8; 20];
    hex::decode_to_slice(stripped.to_lowercase(), &mut bytes)
        .map_err(|e| AllowlistError::malformed(format!("Invalid address encoding: {e}")))?;
    Ok(bytes)
}
