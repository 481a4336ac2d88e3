//! Utility functions for hex validation and formatting.

use crate::error::{AllowlistError, Result};

/// Length of a 32-byte hash in hex characters (excluding 0x prefix).
pub const HASH_HEX_LENGTH: usize = 64;

fn is_valid_hex_string(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_hexdigit())
}

pub(crate) fn strip_hex_prefix(input: &str) -> &str {
    input
        .trim()
        .strip_prefix("0x")
        .or_else(|| input.trim().strip_prefix("0X"))
        .unwrap_or_else(|| input.trim())
}

/// Validates and strips hex prefix from a string.
///
/// # Arguments
///
/// * `input` - The hex string to validate (may include "0x" or "0X" prefix)
/// * `expected_len` - Expected length of the hex string after stripping prefix
///
/// # Errors
/// Returns an error if:
/// - The hex string has incorrect length
/// - The hex string contains non-hex characters
pub fn validate_and_strip_hex(input: &str, expected_len: usize) -> Result<String> {
    let stripped = strip_hex_prefix(input);

    if stripped.len() != expected_len {
        return Err(AllowlistError::malformed(format!(
            "Invalid hex string: must be {} characters (got {})",
            expected_len,
            stripped.len()
        )));
    }

    if !is_valid_hex_string(stripped) {
        return Err(AllowlistError::malformed(
            "Invalid hex string: contains non-hex characters",
        ));
    }

    Ok(stripped.to_string())
}

/// Decodes a 32-byte hash from a hex string, with or without 0x prefix.
pub fn decode_hash_hex(input: &str) -> Result<[u8; 32]> {
    let stripped = validate_and_strip_hex(input, HASH_HEX_LENGTH)?;
    let mut hash = [0u8; 32];
    hex::decode_to_slice(&stripped, &mut hash)
        .map_err(|e| AllowlistError::malformed(format!("Invalid hash encoding: {e}")))?;
    Ok(hash)
}

/// Encodes a 32-byte hash as a lowercase 0x-prefixed hex string.
pub fn encode_hash_hex(hash: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Serde adapter storing a 32-byte hash as a 0x-prefixed hex string.
pub(crate) mod hash_hex {
    use super::{decode_hash_hex, encode_hash_hex};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode_hash_hex(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let raw = String::deserialize(deserializer)?;
        decode_hash_hex(&raw).map_err(D::Error::custom)
    }
}

/// Serde adapter storing a list of 32-byte hashes as hex strings.
pub(crate) mod hash_vec_hex {
    use super::{decode_hash_hex, encode_hash_hex};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        hashes: &[[u8; 32]],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(hashes.iter().map(encode_hash_hex))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<[u8; 32]>, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        raw.iter()
            .map(|s| decode_hash_hex(s).map_err(D::Error::custom))
            .collect()
    }
}

/// Serde adapter storing a unit count as a decimal string.
///
/// Unit counts routinely exceed the 53-bit safe-integer range of JSON
/// consumers, so they are never written as JSON numbers.
pub(crate) mod units_as_decimal {
    use alloy_primitives::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(units: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&units.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(deserializer)?;
        U256::from_str_radix(raw.trim(), 10).map_err(D::Error::custom)
    }
}
