//! Concurrent writers and validators sharing one ledger.

use super::fixtures::*;
use std::thread;

#[test]
fn test_concurrent_appends_keep_chain_linked() {
    let t = in_memory_ledger();
    let writers = 4;
    let per_writer = 10;

    thread::scope(|s| {
        for w in 0..writers {
            let ledger = &t.ledger;
            let signer = if w % 2 == 0 { &t.alice } else { &t.bob };
            s.spawn(move || {
                for i in 0..per_writer {
                    append(ledger, signer, format!("writer {w} entry {i}").as_bytes());
                }
            });
        }
    });

    let result = t.ledger.validate_chain_detailed().unwrap();
    assert_eq!(t.ledger.block_count(), writers * per_writer);
    assert!(result.is_fully_compliant);
}

#[test]
fn test_validation_during_appends_sees_consistent_chains() {
    let t = in_memory_ledger();
    append(&t.ledger, &t.alice, b"seed");

    thread::scope(|s| {
        let ledger = &t.ledger;
        let signer = &t.alice;
        s.spawn(move || {
            for i in 0..20 {
                let data = if i % 5 == 0 { vec![i as u8; 1024] } else { vec![i as u8; 8] };
                append(ledger, signer, &data);
            }
        });
        s.spawn(move || {
            for _ in 0..20 {
                let result = ledger.validate_chain_detailed().unwrap();
                assert!(result.is_structurally_intact);
                assert!(result.total_blocks >= 1);
            }
        });
    });

    assert_eq!(t.ledger.block_count(), 21);
}

#[test]
fn test_rollback_races_with_appends() {
    let t = in_memory_ledger();
    for i in 0..10u8 {
        append(&t.ledger, &t.bob, &[i; 4]);
    }

    thread::scope(|s| {
        let ledger = &t.ledger;
        let signer = &t.alice;
        s.spawn(move || {
            for i in 0..10u8 {
                append(ledger, signer, &[i; 4]);
            }
        });
        s.spawn(move || {
            for _ in 0..5 {
                ledger.rollback(1).unwrap();
            }
        });
    });

    assert_eq!(t.ledger.block_count(), 15);
    assert!(t.ledger.validate_chain_detailed().unwrap().is_fully_compliant);
}
