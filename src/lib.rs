//! Allowlist accounting and Merkle commitments for claim minting.
//!
//! This library turns a raw CSV of `(address, fractions)` entitlements into
//! a deterministic cryptographic commitment, and verifies claimed
//! memberships against it before a transaction is submitted.
//!
//! # Components
//!
//! - [`parse_allowlist_csv`]: CSV parsing, unit redistribution for
//!   additional recipients, and deduplication
//! - [`StandardMerkleTree`]: OpenZeppelin-compatible Merkle commitment over
//!   `(address, uint256)` tuples, with serializable dumps
//! - [`proof_for_account`] / [`verify_claim_proof`] /
//!   [`verify_claim_proofs`]: claim-time proof extraction and verification
//! - [`validate_allowlist`]: allowlist-level invariant checks with
//!   collected, structured errors
//!
//! The whole pipeline is a sequence of pure functions: no shared mutable
//! state, no caches, and identical input always yields an identical root.
//!
//! # Example
//!
//! ```
//! use hypercert_allowlist::{parse_allowlist_csv, proof_for_account, StandardMerkleTree};
//!
//! let csv = "address,fractions\n0x742d35Cc6634C0532925a3b844Bc454e4438f44e,100\n";
//! let entries = parse_allowlist_csv(csv, true, &[]).unwrap();
//! let tree = StandardMerkleTree::of(&entries).unwrap();
//! let claim = proof_for_account(&tree, "0x742d35cc6634c0532925a3b844bc454e4438f44e").unwrap();
//! assert_eq!(claim.root, tree.root());
//! ```

pub mod allowlist;
pub mod claims;
pub mod config;
pub mod error;
pub mod ethereum;
pub mod merkle;
pub mod utils;
pub mod validator;

pub use allowlist::{
    deduplicate_entries, parse_allowlist_csv, total_units, AdditionalAllocation, AllowlistEntry,
};
pub use claims::{proof_for_account, verify_claim_proof, verify_claim_proofs, ClaimProof};
pub use error::AllowlistError;
pub use merkle::{StandardMerkleTree, TreeDump};
pub use validator::{validate_allowlist, ValidationError, ValidationResult};
