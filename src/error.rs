//! Error taxonomy for the allowlist engine.
//!
//! Three classes of failure are surfaced to callers, matching the way the
//! rest of the minting stack branches on them:
//!
//! - [`AllowlistError::MalformedData`]: the input does not conform to the
//!   expected shape (bad CSV, missing columns, unparseable units, empty
//!   allowlist). Fatal to the current operation and never retried.
//! - [`AllowlistError::OutOfBounds`]: a numeric value violates its
//!   documented range (allocation percentages, unit totals). Fatal.
//! - [`AllowlistError::Minting`]: claim-time verification failed: the
//!   claimant address is malformed or the proof does not reduce to the
//!   expected root. Fatal for that claim attempt only; the allowlist
//!   itself remains valid for other claimants.
//!
//! None of these are transient: retrying without changing the input is
//! meaningless, so no retry machinery lives here.

use thiserror::Error;

/// Errors produced while parsing, committing, and verifying allowlists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllowlistError {
    /// Input does not conform to the expected shape.
    #[error("{message}")]
    MalformedData {
        message: String,
        /// Collected detail, e.g. one line per failed CSV row.
        errors: Vec<String>,
    },

    /// A numeric value violates its documented range.
    #[error("{message}")]
    OutOfBounds { message: String },

    /// Claim-time address or proof verification failed.
    #[error("{message}")]
    Minting {
        message: String,
        /// Root the proof was checked against, when one was in play.
        root: Option<String>,
        /// The offending proof, hex-encoded, when one was in play.
        proof: Option<Vec<String>>,
    },
}

impl AllowlistError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedData {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn out_of_bounds(message: impl Into<String>) -> Self {
        Self::OutOfBounds {
            message: message.into(),
        }
    }

    pub(crate) fn minting(message: impl Into<String>) -> Self {
        Self::Minting {
            message: message.into(),
            root: None,
            proof: None,
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AllowlistError>;
