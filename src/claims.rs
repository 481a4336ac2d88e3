//! Claim-time proof extraction and verification.
//!
//! Verification runs client-side before a transaction is submitted: a
//! doomed claim should be caught before the claimant pays gas for the
//! on-chain verifier to reject it. The hash scheme therefore matches the
//! contract exactly (see [`crate::merkle`]).

use crate::allowlist::AllowlistEntry;
use crate::error::{AllowlistError, Result};
use crate::ethereum::validate_address;
use crate::merkle::StandardMerkleTree;
use crate::utils::{encode_hash_hex, hash_hex, hash_vec_hex, units_as_decimal};
use alloy_primitives::U256;
use log::debug;
use serde::{Deserialize, Serialize};

/// Proof bundle for a single claim, in the shape the claim-mint call wants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimProof {
    #[serde(with = "hash_vec_hex")]
    pub proof: Vec<[u8; 32]>,
    #[serde(with = "units_as_decimal")]
    pub units: U256,
    #[serde(with = "hash_hex")]
    pub root: [u8; 32],
}

/// Finds `account` in a tree and extracts its proof.
///
/// Matching is case-insensitive and the first matching leaf wins. A miss
/// is an explicit error, never an empty result.
pub fn proof_for_account(tree: &StandardMerkleTree, account: &str) -> Result<ClaimProof> {
    let needle = account.trim().to_lowercase();
    for (index, entry) in tree.entries() {
        if entry.address.to_lowercase() == needle {
            let proof = tree.get_proof(index)?;
            debug!(
                "found {account} at index {index} with a {}-node proof",
                proof.len()
            );
            return Ok(ClaimProof {
                proof,
                units: entry.units,
                root: tree.root(),
            });
        }
    }
    Err(AllowlistError::minting(format!(
        "Proof not found for account {account}"
    )))
}

/// Verifies a single claimed `(account, units)` membership against a root.
///
/// Distinguishes a malformed claimant address from a proof whose hash
/// chain does not reduce to the root; both abort this claim attempt only.
pub fn verify_claim_proof(
    root: &[u8; 32],
    account: &str,
    units: U256,
    proof: &[[u8; 32]],
) -> Result<()> {
    if !validate_address(account.trim()) {
        return Err(AllowlistError::minting(format!(
            "Invalid claimant address {account}"
        )));
    }

    let entry = AllowlistEntry {
        address: account.trim().to_lowercase(),
        units,
    };
    if !StandardMerkleTree::verify(root, &entry, proof)? {
        return Err(AllowlistError::Minting {
            message: "Merkle proof verification failed".to_string(),
            root: Some(encode_hash_hex(root)),
            proof: Some(proof.iter().map(encode_hash_hex).collect()),
        });
    }
    Ok(())
}

/// Verifies a batch of claims for one claimant.
///
/// The three arrays are parallel: one root, unit count, and proof per
/// claim. Unequal lengths abort before any verification; afterwards each
/// claim is checked independently and the first failure aborts.
pub fn verify_claim_proofs(
    roots: &[[u8; 32]],
    account: &str,
    units: &[U256],
    proofs: &[Vec<[u8; 32]>],
) -> Result<()> {
    if roots.len() != units.len() || roots.len() != proofs.len() {
        return Err(AllowlistError::malformed(format!(
            "Mismatched claim batch: {} roots, {} unit counts, {} proofs",
            roots.len(),
            units.len(),
            proofs.len()
        )));
    }

    for ((root, units), proof) in roots.iter().zip(units).zip(proofs) {
        verify_claim_proof(root, account, *units, proof)?;
    }
    Ok(())
}
