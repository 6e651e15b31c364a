//! # Test Fixtures
//!
//! Ledger builders on a deterministic clock, and direct access to persisted
//! block records for tampering.

use ledger_runtime::config::DATABASE_FILE;
use ledger_runtime::{
    sign_revocation, Block, BlockOptions, Ledger, LedgerComponents, LedgerConfig, LedgerError,
    Secp256k1KeyPair,
};
use lc_03_block_storage::BLOCK_KEY_PREFIX;
use shared_types::{FileBackedKVStore, KeyValueStore, ManualTimeSource, TimeSource};
use std::path::Path;
use std::sync::Arc;

/// Payloads above this go off-chain in fixtures.
pub const TEST_OFF_CHAIN_THRESHOLD: u64 = 256;

pub fn test_config() -> LedgerConfig {
    LedgerConfig::new()
        .with_off_chain_threshold(TEST_OFF_CHAIN_THRESHOLD)
        .with_batch_size(4)
}

/// A ledger with three registered keys.
pub struct TestLedger {
    pub ledger: Ledger,
    pub time: Arc<ManualTimeSource>,
    pub admin: Secp256k1KeyPair,
    pub alice: Secp256k1KeyPair,
    pub bob: Secp256k1KeyPair,
}

pub struct Keys {
    pub admin: Secp256k1KeyPair,
    pub alice: Secp256k1KeyPair,
    pub bob: Secp256k1KeyPair,
}

impl Keys {
    pub fn generate() -> Self {
        Self {
            admin: Secp256k1KeyPair::generate().expect("admin key"),
            alice: Secp256k1KeyPair::generate().expect("alice key"),
            bob: Secp256k1KeyPair::generate().expect("bob key"),
        }
    }

    pub fn register_all(&self, ledger: &Ledger) {
        register(ledger, &self.admin, "admin");
        register(ledger, &self.alice, "alice");
        register(ledger, &self.bob, "bob");
    }
}

pub fn in_memory_ledger() -> TestLedger {
    let time = Arc::new(ManualTimeSource::new(1_700_000_000_000));
    let time_source: Arc<dyn TimeSource> = time.clone();
    let ledger = Ledger::with_components(
        LedgerComponents::in_memory().with_time_source(time_source),
        test_config(),
    )
    .expect("in-memory ledger");

    let Keys { admin, alice, bob } = Keys::generate();
    let test = TestLedger {
        ledger,
        time,
        admin,
        alice,
        bob,
    };
    register(&test.ledger, &test.admin, "admin");
    register(&test.ledger, &test.alice, "alice");
    register(&test.ledger, &test.bob, "bob");
    test
}

/// File-backed ledger in `dir`. Holds the directory lock until dropped.
pub fn file_ledger(dir: &Path, time: &Arc<ManualTimeSource>) -> Ledger {
    let time_source: Arc<dyn TimeSource> = time.clone();
    Ledger::open_with_time_source(test_config().with_data_dir(dir), time_source)
        .expect("file-backed ledger")
}

pub fn register(ledger: &Ledger, key: &Secp256k1KeyPair, owner: &str) {
    ledger
        .add_authorized_key(&key.public_key().encode(), owner)
        .expect("register key");
}

pub fn append(ledger: &Ledger, signer: &Secp256k1KeyPair, data: &[u8]) -> Block {
    ledger
        .add_block(data, signer, &BlockOptions::default())
        .expect("append block")
}

/// Revoke `target` with a valid admin signature.
pub fn revoke(
    ledger: &Ledger,
    admin: &Secp256k1KeyPair,
    target: &Secp256k1KeyPair,
    force: bool,
) -> Result<bool, LedgerError> {
    let target_pk = target.public_key().encode();
    let reason = "key rotation";
    let entry = ledger.revocation_target(&target_pk)?;
    let signature = sign_revocation(admin, &entry, reason);
    ledger.dangerously_delete_authorized_key(
        &target_pk,
        force,
        reason,
        &signature,
        &admin.public_key().encode(),
    )
}

/// Rewrite one persisted block record of a closed ledger in `dir`.
pub fn tamper_block(dir: &Path, block_number: u64, mutate: impl FnOnce(&mut Block)) {
    let kv = FileBackedKVStore::open(dir.join(DATABASE_FILE)).expect("open database");
    let mut key = BLOCK_KEY_PREFIX.to_vec();
    key.extend_from_slice(&block_number.to_be_bytes());

    let bytes = kv
        .get(&key)
        .expect("read record")
        .expect("block record exists");
    let mut block: Block = bincode::deserialize(&bytes).expect("decode block");
    mutate(&mut block);
    kv.put(&key, &bincode::serialize(&block).expect("encode block"))
        .expect("write record");
}
