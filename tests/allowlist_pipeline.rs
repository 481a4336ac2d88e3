use alloy_primitives::U256;
use hypercert_allowlist::{
    parse_allowlist_csv, proof_for_account, total_units, validate_allowlist, verify_claim_proof,
    verify_claim_proofs, AdditionalAllocation, AllowlistError, AllowlistEntry,
    StandardMerkleTree, TreeDump,
};
use rand::Rng;
use std::fs;

const SIMPLE_CSV: &str = "index,address,price,fractions\n\
0,0x20326E144532f17f76AcA759e61E19aF20A58ef3,0.0,100\n\
1,0x15c7281842A45465B4cbb8F89111d99e36e5bab8,0.0,50\n\
2,0x1cca19b823afa773b09708d94d2ee6ff96c60057,0.0,40\n";

const DUPLICATED_CSV: &str = "index,address,price,fractions\n\
0,0x20326E144532f17f76AcA759e61E19aF20A58ef3,0.0,100\n\
1,0x15c7281842A45465B4cbb8F89111d99e36e5bab8,0.0,50\n\
2,0x1cca19b823afa773b09708d94d2ee6ff96c60057,0.0,40\n\
3,0x20326E144532f17f76AcA759e61E19aF20A58ef3,0.0,100\n\
4,0x1cca19b823afa773b09708d94d2ee6ff96c60057,0.0,40\n";

fn entry(address: &str, units: u64) -> AllowlistEntry {
    AllowlistEntry {
        address: address.to_string(),
        units: U256::from(units),
    }
}

fn random_address(rng: &mut impl Rng) -> String {
    let mut bytes = [0u8; 20];
    rng.fill(&mut bytes[..]);
    format!("0x{}", hex::encode(bytes))
}

#[test]
fn test_parses_simple_allowlist() {
    let expected = vec![
        entry("0x20326e144532f17f76aca759e61e19af20a58ef3", 100),
        entry("0x15c7281842a45465b4cbb8f89111d99e36e5bab8", 50),
        entry("0x1cca19b823afa773b09708d94d2ee6ff96c60057", 40),
    ];

    let deduped = parse_allowlist_csv(SIMPLE_CSV, true, &[]).unwrap();
    assert_eq!(deduped, expected);

    let not_deduped = parse_allowlist_csv(SIMPLE_CSV, false, &[]).unwrap();
    assert_eq!(not_deduped, expected);
}

#[test]
fn test_output_units_match_input_sum() {
    let entries = parse_allowlist_csv(SIMPLE_CSV, false, &[]).unwrap();
    assert_eq!(total_units(&entries).unwrap(), U256::from(190u64));
}

#[test]
fn test_parses_with_duplication() {
    let result = parse_allowlist_csv(DUPLICATED_CSV, true, &[]).unwrap();
    assert_eq!(
        result,
        vec![
            entry("0x20326e144532f17f76aca759e61e19af20a58ef3", 200),
            entry("0x15c7281842a45465b4cbb8f89111d99e36e5bab8", 50),
            entry("0x1cca19b823afa773b09708d94d2ee6ff96c60057", 80),
        ]
    );
}

#[test]
fn test_parses_without_deduplication() {
    let result = parse_allowlist_csv(DUPLICATED_CSV, false, &[]).unwrap();
    assert_eq!(
        result,
        vec![
            entry("0x20326e144532f17f76aca759e61e19af20a58ef3", 100),
            entry("0x15c7281842a45465b4cbb8f89111d99e36e5bab8", 50),
            entry("0x1cca19b823afa773b09708d94d2ee6ff96c60057", 40),
            entry("0x20326e144532f17f76aca759e61e19af20a58ef3", 100),
            entry("0x1cca19b823afa773b09708d94d2ee6ff96c60057", 40),
        ]
    );
}

#[test]
fn test_parses_with_new_added_address() {
    // csv total 190 represents 25% of the whole, so the whole is 760 and
    // the added entry receives floor(760 * 0.75) = 570
    let additions = vec![AdditionalAllocation {
        address: "0x22E4b9b003Cc7B7149CF2135dfCe2BaddC7a534f".to_string(),
        percentage: 0.75,
    }];
    let result = parse_allowlist_csv(SIMPLE_CSV, true, &additions).unwrap();
    assert_eq!(
        result,
        vec![
            entry("0x20326e144532f17f76aca759e61e19af20a58ef3", 100),
            entry("0x15c7281842a45465b4cbb8f89111d99e36e5bab8", 50),
            entry("0x1cca19b823afa773b09708d94d2ee6ff96c60057", 40),
            entry("0x22e4b9b003cc7b7149cf2135dfce2baddc7a534f", 570),
        ]
    );
}

#[test]
fn test_parses_with_adding_existing_address() {
    let additions = vec![
        AdditionalAllocation {
            address: "0x22e4b9b003cc7b7149cf2135dfce2baddc7a534f".to_string(),
            percentage: 0.5,
        },
        AdditionalAllocation {
            address: "0x20326e144532f17f76aca759e61e19af20a58ef3".to_string(),
            percentage: 0.25,
        },
    ];
    let result = parse_allowlist_csv(SIMPLE_CSV, true, &additions).unwrap();
    assert_eq!(
        result,
        vec![
            entry("0x20326e144532f17f76aca759e61e19af20a58ef3", 290),
            entry("0x15c7281842a45465b4cbb8f89111d99e36e5bab8", 50),
            entry("0x1cca19b823afa773b09708d94d2ee6ff96c60057", 40),
            entry("0x22e4b9b003cc7b7149cf2135dfce2baddc7a534f", 380),
        ]
    );
}

#[test]
fn test_existing_address_stays_separate_without_dedup() {
    // observable historical behavior: two leaves for the same address
    let additions = vec![AdditionalAllocation {
        address: "0x20326e144532f17f76aca759e61e19af20a58ef3".to_string(),
        percentage: 0.25,
    }];
    let result = parse_allowlist_csv(SIMPLE_CSV, false, &additions).unwrap();
    assert_eq!(result.len(), 4);
    assert_eq!(result[0].address, result[3].address);
    assert_eq!(result[0].units, U256::from(100u64));
    // total 190 / 0.75 = 253.33.., floored share of 25%
    assert_eq!(result[3].units, U256::from(63u64));
}

#[test]
fn test_total_percentage_out_of_bounds() {
    let additions = vec![
        AdditionalAllocation {
            address: "0x22e4b9b003cc7b7149cf2135dfce2baddc7a534f".to_string(),
            percentage: 0.5,
        },
        AdditionalAllocation {
            address: "0x20326e144532f17f76aca759e61e19af20a58ef3".to_string(),
            percentage: 0.5,
        },
    ];
    let err = parse_allowlist_csv(SIMPLE_CSV, true, &additions).unwrap_err();
    assert!(matches!(err, AllowlistError::OutOfBounds { .. }));
}

#[test]
fn test_individual_percentage_out_of_bounds() {
    let additions = vec![
        AdditionalAllocation {
            address: "0x20326e144532f17f76aca759e61e19af20a58ef3".to_string(),
            percentage: 1.5,
        },
        AdditionalAllocation {
            address: "0x15c7281842A45465B4cbb8F89111d99e36e5bab8".to_string(),
            percentage: -0.75,
        },
    ];
    let err = parse_allowlist_csv(SIMPLE_CSV, true, &additions).unwrap_err();
    assert!(matches!(err, AllowlistError::OutOfBounds { .. }));
}

#[test]
fn test_empty_allowlist_rejected() {
    let csv = "index,address,price,fractions\n0,0x20326E144532f17f76AcA759e61E19aF20A58ef3,0.0,0";
    let err = parse_allowlist_csv(csv, true, &[]).unwrap_err();
    assert!(matches!(err, AllowlistError::MalformedData { .. }));
}

#[test]
fn test_missing_columns_rejected() {
    let csv = "index,account,amount\n0,0x20326E144532f17f76AcA759e61E19aF20A58ef3,100\n";
    let err = parse_allowlist_csv(csv, true, &[]).unwrap_err();
    assert!(matches!(err, AllowlistError::MalformedData { .. }));
}

#[test]
fn test_any_bad_row_aborts_whole_parse() {
    let csv = "address,fractions\n\
0x20326E144532f17f76AcA759e61E19aF20A58ef3,100\n\
not-an-address,50\n\
0x1cca19b823afa773b09708d94d2ee6ff96c60057,1.5\n";
    match parse_allowlist_csv(csv, true, &[]).unwrap_err() {
        AllowlistError::MalformedData { errors, .. } => {
            // both bad rows reported together
            assert_eq!(errors.len(), 2);
            assert!(errors[0].contains("row 3"));
            assert!(errors[1].contains("row 4"));
        }
        other => panic!("expected MalformedData, got {other:?}"),
    }
}

#[test]
fn test_units_beyond_53_bits_survive_the_pipeline() {
    let big = "18446744073709551616"; // 2^64
    let csv = format!(
        "address,fractions\n0x20326E144532f17f76AcA759e61E19aF20A58ef3,{big}\n"
    );
    let entries = parse_allowlist_csv(&csv, true, &[]).unwrap();
    assert_eq!(entries[0].units, U256::from(1u128 << 64));

    let tree = StandardMerkleTree::of(&entries).unwrap();
    let claim = proof_for_account(&tree, &entries[0].address).unwrap();
    assert_eq!(claim.units.to_string(), big);
    assert!(verify_claim_proof(&tree.root(), &entries[0].address, claim.units, &claim.proof)
        .is_ok());
}

#[test]
fn test_parser_and_builder_are_deterministic() {
    let additions = vec![AdditionalAllocation {
        address: "0x22e4b9b003cc7b7149cf2135dfce2baddc7a534f".to_string(),
        percentage: 0.3,
    }];
    let root_a = StandardMerkleTree::of(&parse_allowlist_csv(SIMPLE_CSV, true, &additions).unwrap())
        .unwrap()
        .root();
    let root_b = StandardMerkleTree::of(&parse_allowlist_csv(SIMPLE_CSV, true, &additions).unwrap())
        .unwrap()
        .root();
    assert_eq!(root_a, root_b);
}

#[test]
fn test_dump_load_roundtrip_through_file() {
    let mut rng = rand::thread_rng();
    let entries: Vec<AllowlistEntry> = (0..21)
        .map(|i| AllowlistEntry {
            address: random_address(&mut rng),
            units: U256::from((i as u64 + 1) * 7),
        })
        .collect();
    let tree = StandardMerkleTree::of(&entries).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let dump_path = dir.path().join("allowlist-tree.json");
    fs::write(
        &dump_path,
        serde_json::to_string_pretty(&tree.dump()).unwrap(),
    )
    .unwrap();

    let dump: TreeDump = serde_json::from_str(&fs::read_to_string(&dump_path).unwrap()).unwrap();
    let loaded = StandardMerkleTree::load(dump).unwrap();

    assert_eq!(loaded.root(), tree.root());
    for (index, entry) in tree.entries() {
        assert_eq!(
            loaded.get_proof(index).unwrap(),
            tree.get_proof(index).unwrap()
        );
        let claim = proof_for_account(&loaded, &entry.address).unwrap();
        assert!(
            verify_claim_proof(&tree.root(), &entry.address, claim.units, &claim.proof).is_ok()
        );
    }
}

#[test]
fn test_every_entry_proves_and_tampering_fails() {
    let entries = parse_allowlist_csv(DUPLICATED_CSV, true, &[]).unwrap();
    let tree = StandardMerkleTree::of(&entries).unwrap();

    for (index, entry) in tree.entries() {
        let proof = tree.get_proof(index).unwrap();
        assert!(verify_claim_proof(&tree.root(), &entry.address, entry.units, &proof).is_ok());

        let off_by_one = entry.units + U256::from(1u64);
        assert!(verify_claim_proof(&tree.root(), &entry.address, off_by_one, &proof).is_err());
    }
}

#[test]
fn test_proof_lookup_is_case_insensitive() {
    let entries = parse_allowlist_csv(SIMPLE_CSV, true, &[]).unwrap();
    let tree = StandardMerkleTree::of(&entries).unwrap();
    let claim = proof_for_account(&tree, "0x20326E144532F17F76ACA759E61E19AF20A58EF3").unwrap();
    assert_eq!(claim.units, U256::from(100u64));
}

#[test]
fn test_proof_lookup_miss_is_an_error() {
    let entries = parse_allowlist_csv(SIMPLE_CSV, true, &[]).unwrap();
    let tree = StandardMerkleTree::of(&entries).unwrap();
    let err = proof_for_account(&tree, "0x742d35cc6634c0532925a3b844bc454e4438f44e").unwrap_err();
    assert!(matches!(err, AllowlistError::Minting { .. }));
}

#[test]
fn test_batch_claims_across_two_allowlists() {
    let account = "0x20326e144532f17f76aca759e61e19af20a58ef3";

    let tree_a =
        StandardMerkleTree::of(&parse_allowlist_csv(SIMPLE_CSV, true, &[]).unwrap()).unwrap();
    let tree_b =
        StandardMerkleTree::of(&parse_allowlist_csv(DUPLICATED_CSV, true, &[]).unwrap()).unwrap();

    let claim_a = proof_for_account(&tree_a, account).unwrap();
    let claim_b = proof_for_account(&tree_b, account).unwrap();

    assert!(verify_claim_proofs(
        &[claim_a.root, claim_b.root],
        account,
        &[claim_a.units, claim_b.units],
        &[claim_a.proof.clone(), claim_b.proof.clone()]
    )
    .is_ok());

    // swapped proofs fail on the first claim
    let err = verify_claim_proofs(
        &[claim_a.root, claim_b.root],
        account,
        &[claim_a.units, claim_b.units],
        &[claim_b.proof, claim_a.proof],
    )
    .unwrap_err();
    assert!(matches!(err, AllowlistError::Minting { .. }));

    // unequal array lengths fail before any verification
    let err = verify_claim_proofs(&[claim_a.root], account, &[], &[]).unwrap_err();
    assert!(matches!(err, AllowlistError::MalformedData { .. }));
}

#[test]
fn test_validate_allowlist_after_parse() {
    let entries = parse_allowlist_csv(SIMPLE_CSV, true, &[]).unwrap();
    let total = total_units(&entries).unwrap();

    let result = validate_allowlist(&entries, total);
    assert!(result.valid);

    let result = validate_allowlist(&entries, total + U256::from(1u64));
    assert!(!result.valid);
    assert!(result.errors.contains_key("units"));
    assert!(!result.errors.contains_key("address"));
}
