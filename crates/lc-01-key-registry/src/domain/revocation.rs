//! # Revocation Payload
//!
//! The bytes an administrator signs to revoke a key. Length-prefixed fields
//! behind a domain tag, so a block signature can never be replayed as a
//! revocation.
//!
//! The payload names one registry entry (index and `created_at`), not just
//! the key. A revocation signed for an earlier window of a key does not verify
//! once the key has been re-added.

use shared_crypto::Secp256k1KeyPair;
use shared_types::Timestamp;

const REVOCATION_DOMAIN: &[u8] = b"ledger-chain/revoke-key/v2";

/// The registry entry a revocation is aimed at.
///
/// Obtained from `KeyRegistry::revocation_target`; it is the latest entry for
/// the key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevocationTarget {
    pub public_key: String,
    pub entry_index: u64,
    pub created_at: Timestamp,
}

impl RevocationTarget {
    pub fn payload(&self, reason: &str) -> Vec<u8> {
        revocation_payload(self, reason)
    }
}

fn write_field(buf: &mut Vec<u8>, field: &[u8]) {
    buf.extend_from_slice(&(field.len() as u64).to_be_bytes());
    buf.extend_from_slice(field);
}

/// Canonical payload for revoking `target` with `reason`.
///
/// `reason` is signed exactly as given; no trimming.
pub fn revocation_payload(target: &RevocationTarget, reason: &str) -> Vec<u8> {
    let mut payload = Vec::with_capacity(
        REVOCATION_DOMAIN.len() + 56 + target.public_key.len() + reason.len(),
    );
    payload.extend_from_slice(REVOCATION_DOMAIN);
    write_field(&mut payload, target.public_key.as_bytes());
    write_field(&mut payload, &target.entry_index.to_be_bytes());
    write_field(&mut payload, &target.created_at.to_be_bytes());
    write_field(&mut payload, reason.as_bytes());
    payload
}

/// Sign a revocation with an administrator key.
pub fn sign_revocation(
    admin: &Secp256k1KeyPair,
    target: &RevocationTarget,
    reason: &str,
) -> Vec<u8> {
    shared_crypto::sign(&revocation_payload(target, reason), admin)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(public_key: &str, entry_index: u64, created_at: Timestamp) -> RevocationTarget {
        RevocationTarget {
            public_key: public_key.into(),
            entry_index,
            created_at,
        }
    }

    #[test]
    fn test_fields_cannot_be_shifted() {
        // "ab" + "c" must not collide with "a" + "bc"
        assert_ne!(
            revocation_payload(&target("ab", 0, 0), "c"),
            revocation_payload(&target("a", 0, 0), "bc")
        );
    }

    #[test]
    fn test_payload_names_one_entry() {
        let first = target("pk", 1, 100);

        assert_ne!(first.payload("r"), target("pk", 3, 100).payload("r"));
        assert_ne!(first.payload("r"), target("pk", 1, 200).payload("r"));
    }

    #[test]
    fn test_reason_is_signed_verbatim() {
        assert_ne!(
            target("pk", 0, 0).payload("compromised"),
            target("pk", 0, 0).payload("compromised ")
        );
    }

    #[test]
    fn test_signature_verifies_against_admin_key() {
        let admin = Secp256k1KeyPair::generate().unwrap();
        let t = target("target", 2, 50);
        let signature = sign_revocation(&admin, &t, "compromised");

        assert!(shared_crypto::verify(
            &t.payload("compromised"),
            &signature,
            &admin.public_key().encode()
        ));
        assert!(!shared_crypto::verify(
            &t.payload("other reason"),
            &signature,
            &admin.public_key().encode()
        ));
    }
}
