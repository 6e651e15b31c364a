//! Moving a ledger between stores through the export document.

use super::fixtures::*;
use ledger_runtime::{BlockOptions, ErrorKind, ImportOptions, LedgerError};
use shared_types::ManualTimeSource;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_file_ledger_migrates_into_fresh_ledger() {
    let dir = tempdir().unwrap();
    let keys = Keys::generate();
    let time = Arc::new(ManualTimeSource::new(5_000));
    let recipient = ledger_runtime::Secp256k1KeyPair::generate().unwrap();

    let json = {
        let source = file_ledger(dir.path(), &time);
        keys.register_all(&source);
        append(&source, &keys.alice, b"inline entry");
        append(&source, &keys.bob, &[1u8; 2048]);
        source
            .add_block(
                b"for the recipient only",
                &keys.alice,
                &BlockOptions::new().with_recipient(recipient.public_key().encode()),
            )
            .unwrap();
        revoke(&source, &keys.admin, &keys.bob, true).unwrap();
        source.export_json().unwrap()
    };

    let target = in_memory_ledger();
    let report = target
        .ledger
        .import_json(&json, ImportOptions::default())
        .unwrap();

    assert_eq!(report.previous_blocks, 0);
    assert_eq!(report.new_blocks, 3);
    assert_eq!(report.off_chain_blobs, 1);
    assert!(report.validation.is_structurally_intact);
    assert_eq!(report.validation.revoked_blocks, 1);

    assert_eq!(target.ledger.block_count(), 3);
    assert_eq!(target.ledger.block_data(1, None).unwrap(), vec![1u8; 2048]);
    assert_eq!(
        target.ledger.block_data(2, Some(&recipient)).unwrap(),
        b"for the recipient only"
    );
    // The imported registry replaces the fixture's keys
    assert!(target
        .ledger
        .add_block(b"x", &target.alice, &BlockOptions::default())
        .is_err());
    assert!(target.ledger.add_block(b"x", &keys.alice, &BlockOptions::default()).is_ok());
}

#[test]
fn test_dry_run_reports_without_changing_target() {
    let source = in_memory_ledger();
    append(&source.ledger, &source.alice, b"one");
    append(&source.ledger, &source.alice, b"two");
    let document = source.ledger.export_chain().unwrap();

    let target = in_memory_ledger();
    append(&target.ledger, &target.bob, b"existing");
    let report = target
        .ledger
        .import_chain(document, ImportOptions::dry_run())
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.previous_blocks, 1);
    assert_eq!(report.new_blocks, 2);
    assert_eq!(target.ledger.block_count(), 1);
    assert_eq!(target.ledger.list_keys(false).len(), 3);
}

#[test]
fn test_broken_document_is_rejected_and_target_kept() {
    let source = in_memory_ledger();
    append(&source.ledger, &source.alice, b"one");
    append(&source.ledger, &source.alice, b"two");
    let mut document = source.ledger.export_chain().unwrap();
    document.blocks.remove(0);

    let target = in_memory_ledger();
    append(&target.ledger, &target.bob, b"existing");
    let err = target
        .ledger
        .import_chain(document, ImportOptions::default())
        .unwrap_err();

    assert!(matches!(err, LedgerError::Integrity { .. }));
    assert_eq!(err.kind(), ErrorKind::Integrity);
    assert_eq!(target.ledger.block_count(), 1);
    assert!(target.ledger.validate_chain_detailed().unwrap().is_fully_compliant);
}

#[test]
fn test_exported_document_survives_reopen_of_target() {
    let source = in_memory_ledger();
    append(&source.ledger, &source.alice, b"carried over");
    let document = source.ledger.export_chain().unwrap();

    let dir = tempdir().unwrap();
    let time = Arc::new(ManualTimeSource::new(9_000));
    {
        let target = file_ledger(dir.path(), &time);
        target.import_chain(document, ImportOptions::default()).unwrap();
    }

    let reopened = file_ledger(dir.path(), &time);
    assert_eq!(reopened.block_data(0, None).unwrap(), b"carried over");
    assert_eq!(reopened.list_keys(true).len(), 3);
    assert!(reopened.validate_chain_detailed().unwrap().is_fully_compliant);
}
