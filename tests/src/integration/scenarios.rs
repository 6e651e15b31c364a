//! Chain, authorization, rollback and off-chain properties through the facade.

use super::fixtures::*;
use ledger_runtime::{
    BlockOptions, BlockStatus, ErrorKind, LedgerError, SearchQuery, Secp256k1KeyPair,
};
use shared_types::GENESIS_PREVIOUS_HASH;

#[test]
fn test_empty_chain_genesis_is_fully_compliant() {
    let t = in_memory_ledger();

    let genesis = append(&t.ledger, &t.alice, b"genesis");
    let result = t.ledger.validate_chain_detailed().unwrap();

    assert_eq!(genesis.block_number, 0);
    assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
    assert!(result.is_fully_compliant);
    assert_eq!(result.revoked_blocks, 0);
    assert_eq!(result.invalid_blocks, 0);
}

#[test]
fn test_valid_chains_are_structurally_intact() {
    let t = in_memory_ledger();

    for n in 1..=9u64 {
        let signer = if n % 2 == 0 { &t.alice } else { &t.bob };
        append(&t.ledger, signer, format!("entry {n}").as_bytes());

        let result = t.ledger.validate_chain_detailed().unwrap();
        assert!(result.is_structurally_intact, "chain of {n}");
        assert_eq!(result.invalid_blocks, 0);
        assert_eq!(result.total_blocks, n);
    }
}

#[test]
fn test_append_numbers_and_links() {
    let t = in_memory_ledger();
    let mut previous = None;

    for i in 0..6u64 {
        let before = t.ledger.block_count();
        let block = append(&t.ledger, &t.alice, &[i as u8; 10]);

        assert_eq!(block.block_number, before);
        match &previous {
            None => assert_eq!(block.previous_hash, GENESIS_PREVIOUS_HASH),
            Some(prior) => assert_eq!(&block.previous_hash, prior),
        }
        previous = Some(block.hash);
    }
}

#[test]
fn test_unregistered_signer_is_rejected() {
    let t = in_memory_ledger();
    append(&t.ledger, &t.alice, b"first");
    let stranger = Secp256k1KeyPair::generate().unwrap();

    let err = t
        .ledger
        .add_block(b"second", &stranger, &BlockOptions::default())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert_eq!(t.ledger.block_count(), 1);
}

#[test]
fn test_revoking_signer_of_one_block() {
    let t = in_memory_ledger();
    append(&t.ledger, &t.alice, b"by alice");
    append(&t.ledger, &t.bob, b"by bob");

    assert!(revoke(&t.ledger, &t.admin, &t.bob, true).unwrap());
    let result = t.ledger.validate_chain_detailed().unwrap();

    assert_eq!(result.revoked_blocks, 1);
    assert!(result.is_structurally_intact);
    assert!(!result.is_fully_compliant);
    assert_eq!(result.status_of(0), Some(BlockStatus::Valid));
}

#[test]
fn test_revoking_key_used_for_many_blocks() {
    let t = in_memory_ledger();
    let k = 5;
    for i in 0..k {
        append(&t.ledger, &t.bob, format!("bob {i}").as_bytes());
        append(&t.ledger, &t.alice, format!("alice {i}").as_bytes());
    }

    revoke(&t.ledger, &t.admin, &t.bob, true).unwrap();
    let result = t.ledger.validate_chain_detailed().unwrap();

    assert!(result.is_structurally_intact);
    assert!(result.revoked_blocks >= k);
    assert!(!result.is_fully_compliant);
}

#[test]
fn test_revocation_after_clock_steps_back_still_covers_signed_blocks() {
    let t = in_memory_ledger();
    t.time.advance(120_000);
    append(&t.ledger, &t.alice, b"by alice");
    let signed = append(&t.ledger, &t.bob, b"by bob");

    // Still after the admin key was added
    t.time.set(signed.timestamp - 60_000);
    revoke(&t.ledger, &t.admin, &t.bob, true).unwrap();
    let result = t.ledger.validate_chain_detailed().unwrap();

    assert_eq!(result.revoked_blocks, 1);
    assert_eq!(result.invalid_blocks, 0);
    assert!(matches!(
        result.status_of(1),
        Some(BlockStatus::RevokedSince { revoked_at }) if revoked_at > signed.timestamp
    ));
}

#[test]
fn test_revoked_key_cannot_sign_and_re_added_key_restores_compliance() {
    let t = in_memory_ledger();
    append(&t.ledger, &t.bob, b"before");
    revoke(&t.ledger, &t.admin, &t.bob, true).unwrap();

    let err = t
        .ledger
        .add_block(b"during", &t.bob, &BlockOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);

    register(&t.ledger, &t.bob, "bob");
    append(&t.ledger, &t.bob, b"after");

    let result = t.ledger.validate_chain_detailed().unwrap();
    assert!(result.is_fully_compliant);
    assert_eq!(t.ledger.list_keys(false).len(), 4);
}

#[test]
fn test_revocation_requires_valid_admin() {
    let t = in_memory_ledger();

    // Bob cannot revoke Alice by signing as if he were the admin
    let alice_pk = t.alice.public_key().encode();
    let target = t.ledger.revocation_target(&alice_pk).unwrap();
    let forged = ledger_runtime::sign_revocation(&t.bob, &target, "key rotation");
    let err = t
        .ledger
        .dangerously_delete_authorized_key(
            &alice_pk,
            true,
            "key rotation",
            &forged,
            &t.admin.public_key().encode(),
        )
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert!(t.ledger.lookup_by_owner("alice").is_some());
}

#[test]
fn test_rollback_properties() {
    let t = in_memory_ledger();
    let length = 7u64;
    for i in 0..length {
        append(&t.ledger, &t.alice, format!("block {i}").as_bytes());
    }

    let report = t.ledger.rollback(3).unwrap();
    assert_eq!(report.previous_count, length);
    assert_eq!(report.final_count, length - 3);

    let last = t.ledger.last_block().unwrap().unwrap();
    assert_eq!(last.block_number, length - 4);
    assert_eq!(last.hash, last.compute_hash());
    assert!(t.ledger.validate_chain_detailed().unwrap().is_fully_compliant);

    let err = t.ledger.rollback(length + 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(matches!(err, LedgerError::Blocks(_)));
    assert_eq!(t.ledger.block_count(), length - 3);
}

#[test]
fn test_rollback_releases_off_chain_payloads() {
    let t = in_memory_ledger();
    append(&t.ledger, &t.alice, b"small");
    let big = append(&t.ledger, &t.alice, &[9u8; 1024]);
    let reference = big.off_chain_reference().unwrap().clone();

    t.ledger.rollback(1).unwrap();

    let err = t.ledger.retrieve_off_chain(&reference, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(t.ledger.off_chain_statistics().unwrap().off_chain_blocks, 0);
}

#[test]
fn test_off_chain_round_trip() {
    let t = in_memory_ledger();
    let recipient = Secp256k1KeyPair::generate().unwrap();
    let payload: Vec<u8> = (0..2_000u32).map(|i| (i % 251) as u8).collect();

    let plain = t.ledger.store_off_chain(&payload, None).unwrap();
    let sealed = t
        .ledger
        .store_off_chain(&payload, Some(&recipient.public_key().encode()))
        .unwrap();

    assert_eq!(t.ledger.retrieve_off_chain(&plain, None).unwrap(), payload);
    assert_eq!(
        t.ledger.retrieve_off_chain(&sealed, Some(&recipient)).unwrap(),
        payload
    );
    assert_eq!(plain.content_hash, shared_crypto::sha256(&payload));
    assert_eq!(sealed.content_hash, plain.content_hash);
    assert_ne!(sealed.blob_id, plain.blob_id);

    let wrong = t
        .ledger
        .retrieve_off_chain(&sealed, Some(&t.alice))
        .unwrap_err();
    assert_eq!(wrong.kind(), ErrorKind::Authorization);
}

#[test]
fn test_large_block_payload_goes_off_chain_transparently() {
    let t = in_memory_ledger();
    let payload = vec![b'z'; (TEST_OFF_CHAIN_THRESHOLD + 1) as usize];

    let block = append(&t.ledger, &t.alice, &payload);

    assert!(block.off_chain_reference().is_some());
    assert_eq!(t.ledger.block_data(0, None).unwrap(), payload);
    assert!(t.ledger.verify_off_chain_data().unwrap().is_healthy());
}

#[test]
fn test_search_by_category_and_keyword() {
    let t = in_memory_ledger();
    t.ledger
        .add_block(
            b"contract signed with Acme",
            &t.alice,
            &BlockOptions::new()
                .with_category("legal")
                .with_keyword("acme")
                .with_metadata("client", "Acme"),
        )
        .unwrap();
    append(&t.ledger, &t.bob, b"lunch order");

    let legal = t
        .ledger
        .search(&SearchQuery::new().with_category("LEGAL"))
        .unwrap();
    let acme = t
        .ledger
        .search(&SearchQuery::new().with_content("acme"))
        .unwrap();

    assert_eq!(legal.len(), 1);
    assert_eq!(legal[0].custom_metadata["client"], "Acme");
    assert_eq!(acme, legal);
}
