//! Merkle commitment over finalized allowlist entries.
//!
//! This is a port of OpenZeppelin's `StandardMerkleTree` specialized to the
//! `["address", "uint256"]` leaf encoding. The hash scheme is an external
//! contract (the on-chain verifier recomputes the same hashes from the
//! claimant's proof), so none of it is negotiable here:
//!
//! - a leaf is `keccak256(keccak256(abi.encode(address, uint256)))`; the
//!   double hash prevents second-preimage attacks where an internal node is
//!   presented as a leaf,
//! - an internal node is `keccak256(left || right)` with the pair sorted
//!   bytewise first, so proofs carry no direction bits,
//! - leaves are ordered by leaf hash and packed into an array-backed
//!   complete binary tree of `2n - 1` nodes with the root at index 0.
//!
//! A built tree is immutable. Changing membership means building a new tree
//! and publishing a new root.

use crate::allowlist::AllowlistEntry;
use crate::error::{AllowlistError, Result};
use crate::ethereum::address_to_bytes;
use crate::utils::{decode_hash_hex, encode_hash_hex};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

/// Leaf encoding tag recorded in tree dumps.
pub const LEAF_ENCODING: [&str; 2] = ["address", "uint256"];

/// Dump format identifier, shared with the JS implementation.
pub const DUMP_FORMAT: &str = "standard-v1";

/// Hashes two sibling nodes into their parent.
///
/// The pair is sorted bytewise before hashing, matching
/// `MerkleProof.processProof` in the verifying contract.
pub fn hash_pair(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let (left, right) = if a <= b { (a, b) } else { (b, a) };
    let digest = Keccak256::new()
        .chain_update(left)
        .chain_update(right)
        .finalize();
    digest.into()
}

/// Computes the double-keccak leaf hash of an entry.
///
/// The inner preimage is the ABI encoding of `(address, uint256)`: two
/// 32-byte words, the address left-padded with zeros and the unit count
/// big-endian.
pub fn leaf_hash(entry: &AllowlistEntry) -> Result<[u8; 32]> {
    let address = address_to_bytes(&entry.address)?;
    let mut encoded = [0u8; 64];
    encoded[12..32].copy_from_slice(&address);
    encoded[32..64].copy_from_slice(&entry.units.to_be_bytes::<32>());
    let inner: [u8; 32] = Keccak256::digest(encoded).into();
    Ok(Keccak256::digest(inner).into())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct IndexedEntry {
    entry: AllowlistEntry,
    tree_index: usize,
}

/// An immutable Merkle commitment over an ordered list of allowlist entries.
///
/// Entries keep their input order; `get_proof` takes the same index that
/// [`entries`](StandardMerkleTree::entries) yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardMerkleTree {
    nodes: Vec<[u8; 32]>,
    values: Vec<IndexedEntry>,
}

/// Serializable dump of a [`StandardMerkleTree`].
///
/// The shape follows the JS library's `standard-v1` convention so dumps are
/// stable across implementations: stored blobs are referenced indefinitely
/// by content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeDump {
    pub format: String,
    pub tree: Vec<String>,
    pub values: Vec<DumpValue>,
    #[serde(rename = "leafEncoding")]
    pub leaf_encoding: Vec<String>,
}

/// One `(address, units)` value inside a dump, with its node position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpValue {
    pub value: (String, String),
    #[serde(rename = "treeIndex")]
    pub tree_index: usize,
}

impl StandardMerkleTree {
    /// Builds a tree over the given entries.
    ///
    /// The parser already rejects empty allowlists; an empty entry list is
    /// still rejected here so the builder cannot commit to nothing.
    pub fn of(entries: &[AllowlistEntry]) -> Result<Self> {
        if entries.is_empty() {
            return Err(AllowlistError::malformed(
                "Cannot build a Merkle tree over zero entries",
            ));
        }

        let mut hashed: Vec<(usize, [u8; 32])> = entries
            .iter()
            .enumerate()
            .map(|(value_index, entry)| leaf_hash(entry).map(|hash| (value_index, hash)))
            .collect::<Result<_>>()?;
        hashed.sort_by(|a, b| a.1.cmp(&b.1));

        let leaf_count = hashed.len();
        let total = 2 * leaf_count - 1;
        let mut nodes = vec![[0u8; 32]; total];
        for (leaf_index, (_, hash)) in hashed.iter().enumerate() {
            nodes[total - 1 - leaf_index] = *hash;
        }
        for i in (0..total - leaf_count).rev() {
            nodes[i] = hash_pair(&nodes[2 * i + 1], &nodes[2 * i + 2]);
        }

        let mut values: Vec<IndexedEntry> = entries
            .iter()
            .cloned()
            .map(|entry| IndexedEntry {
                entry,
                tree_index: 0,
            })
            .collect();
        for (leaf_index, (value_index, _)) in hashed.iter().enumerate() {
            values[*value_index].tree_index = total - 1 - leaf_index;
        }

        Ok(Self { nodes, values })
    }

    /// The committed root, published on-chain as the source of truth.
    pub fn root(&self) -> [u8; 32] {
        self.nodes[0]
    }

    /// The root as a 0x-prefixed hex string.
    pub fn root_hex(&self) -> String {
        encode_hash_hex(&self.root())
    }

    /// Number of entries committed to.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates entries in their original input order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &AllowlistEntry)> {
        self.values
            .iter()
            .enumerate()
            .map(|(index, value)| (index, &value.entry))
    }

    /// Produces the sibling path for the entry at `index`.
    ///
    /// The stored leaf is cross-checked against the recomputed hash first,
    /// which catches dumps whose values and nodes disagree.
    pub fn get_proof(&self, index: usize) -> Result<Vec<[u8; 32]>> {
        let value = self.values.get(index).ok_or_else(|| {
            AllowlistError::malformed(format!("No allowlist entry at index {index}"))
        })?;

        let expected = leaf_hash(&value.entry)?;
        if self.nodes.get(value.tree_index) != Some(&expected) {
            return Err(AllowlistError::malformed(format!(
                "Merkle tree does not contain the entry at index {index}"
            )));
        }

        let mut proof = Vec::new();
        let mut i = value.tree_index;
        while i > 0 {
            let sibling = if i % 2 == 1 { i + 1 } else { i - 1 };
            proof.push(self.nodes[sibling]);
            i = (i - 1) / 2;
        }
        Ok(proof)
    }

    /// Reduces a leaf and its sibling path back to a root.
    pub fn process_proof(leaf: [u8; 32], proof: &[[u8; 32]]) -> [u8; 32] {
        proof
            .iter()
            .fold(leaf, |node, sibling| hash_pair(&node, sibling))
    }

    /// Checks membership of `entry` under `root` using only the proof.
    pub fn verify(root: &[u8; 32], entry: &AllowlistEntry, proof: &[[u8; 32]]) -> Result<bool> {
        let leaf = leaf_hash(entry)?;
        Ok(Self::process_proof(leaf, proof) == *root)
    }

    /// Serializes the tree for off-chain storage.
    pub fn dump(&self) -> TreeDump {
        TreeDump {
            format: DUMP_FORMAT.to_string(),
            tree: self.nodes.iter().map(encode_hash_hex).collect(),
            values: self
                .values
                .iter()
                .map(|value| DumpValue {
                    value: (value.entry.address.clone(), value.entry.units.to_string()),
                    tree_index: value.tree_index,
                })
                .collect(),
            leaf_encoding: LEAF_ENCODING.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Restores a tree from a dump.
    ///
    /// Shape is validated here; leaf integrity is validated per access in
    /// [`get_proof`](StandardMerkleTree::get_proof).
    pub fn load(dump: TreeDump) -> Result<Self> {
        if dump.format != DUMP_FORMAT {
            return Err(AllowlistError::malformed(format!(
                "Unknown tree dump format `{}`, expected `{DUMP_FORMAT}`",
                dump.format
            )));
        }
        if dump.leaf_encoding != LEAF_ENCODING {
            return Err(AllowlistError::malformed(format!(
                "Unsupported leaf encoding {:?}, expected {LEAF_ENCODING:?}",
                dump.leaf_encoding
            )));
        }
        if dump.values.is_empty() || dump.tree.len() != 2 * dump.values.len() - 1 {
            return Err(AllowlistError::malformed(
                "Tree dump node count does not match its value count",
            ));
        }

        let nodes = dump
            .tree
            .iter()
            .map(|raw| decode_hash_hex(raw))
            .collect::<Result<Vec<_>>>()?;

        let leaf_start = nodes.len() - dump.values.len();
        let values = dump
            .values
            .into_iter()
            .map(|value| {
                if value.tree_index < leaf_start || value.tree_index >= nodes.len() {
                    return Err(AllowlistError::malformed(format!(
                        "Tree dump value points at non-leaf node {}",
                        value.tree_index
                    )));
                }
                let (address, units) = value.value;
                let units = U256::from_str_radix(units.trim(), 10).map_err(|_| {
                    AllowlistError::malformed(format!(
                        "Tree dump unit count `{units}` is not a non-negative integer"
                    ))
                })?;
                Ok(IndexedEntry {
                    entry: AllowlistEntry { address, units },
                    tree_index: value.tree_index,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { nodes, values })
    }
}
