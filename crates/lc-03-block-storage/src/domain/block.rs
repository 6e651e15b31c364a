//! # Block Entity
//!
//! A block and its canonical signing payload.
//!
//! ## Canonical Payload
//!
//! ```text
//! "ledger-chain/block/v1"
//! block_number      u64 BE
//! previous_hash     32 bytes
//! timestamp         u64 BE
//! payload tag       u8  (0 inline, 1 sealed, 2 off-chain)
//! payload body      length-prefixed fields, see `write_payload`
//! signer_public_key u64 BE length + UTF-8
//! ```
//!
//! `hash = SHA-256(canonical payload)` and the signature is ECDSA over the
//! same bytes. Metadata, category, keywords and recipient are descriptive and
//! sit outside the hash.

use lc_02_offchain_storage::OffChainReference;
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, hex::Hex, serde_as};
use shared_crypto::{sha256, SealedEnvelope};
use shared_types::{hash_to_hex, Hash, Timestamp};
use std::collections::BTreeMap;

const BLOCK_DOMAIN: &[u8] = b"ledger-chain/block/v1";

const TAG_INLINE: u8 = 0;
const TAG_SEALED: u8 = 1;
const TAG_OFF_CHAIN: u8 = 2;

/// What a block carries. Exactly one form per block.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockPayload {
    /// Plain bytes stored in the block.
    Inline {
        #[serde_as(as = "Base64")]
        data: Vec<u8>,
    },
    /// Inline bytes sealed for the block's recipient.
    Sealed { envelope: SealedEnvelope },
    /// Bytes held by the off-chain store.
    OffChain { reference: OffChainReference },
}

impl BlockPayload {
    pub fn inline(data: impl Into<Vec<u8>>) -> Self {
        BlockPayload::Inline { data: data.into() }
    }

    /// Size of the payload as carried by the block.
    ///
    /// Off-chain payloads report the plaintext size from the reference.
    pub fn size_bytes(&self) -> u64 {
        match self {
            BlockPayload::Inline { data } => data.len() as u64,
            BlockPayload::Sealed { envelope } => envelope.encoded_len() as u64,
            BlockPayload::OffChain { reference } => reference.size_bytes,
        }
    }
}

fn write_field(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
    buf.extend_from_slice(bytes);
}

fn write_payload(buf: &mut Vec<u8>, payload: &BlockPayload) {
    match payload {
        BlockPayload::Inline { data } => {
            buf.push(TAG_INLINE);
            write_field(buf, data);
        }
        BlockPayload::Sealed { envelope } => {
            buf.push(TAG_SEALED);
            write_field(buf, &envelope.to_bytes());
        }
        BlockPayload::OffChain { reference } => {
            buf.push(TAG_OFF_CHAIN);
            buf.extend_from_slice(&reference.blob_id);
            buf.extend_from_slice(&reference.content_hash);
            buf.extend_from_slice(&reference.size_bytes.to_be_bytes());
            buf.push(u8::from(reference.encrypted));
            match &reference.recipient {
                Some(recipient) => {
                    buf.push(1);
                    write_field(buf, recipient.as_bytes());
                }
                None => buf.push(0),
            }
        }
    }
}

/// Canonical bytes that are hashed and signed.
pub fn signing_payload(
    block_number: u64,
    previous_hash: &Hash,
    timestamp: Timestamp,
    payload: &BlockPayload,
    signer_public_key: &str,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(BLOCK_DOMAIN.len() + 192 + signer_public_key.len());
    buf.extend_from_slice(BLOCK_DOMAIN);
    buf.extend_from_slice(&block_number.to_be_bytes());
    buf.extend_from_slice(previous_hash);
    buf.extend_from_slice(&timestamp.to_be_bytes());
    write_payload(&mut buf, payload);
    write_field(&mut buf, signer_public_key.as_bytes());
    buf
}

/// A committed ledger block.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub block_number: u64,
    #[serde_as(as = "Hex")]
    pub previous_hash: Hash,
    /// As stored. Never trusted: validation recomputes it.
    #[serde_as(as = "Hex")]
    pub hash: Hash,
    pub timestamp: Timestamp,
    pub payload: BlockPayload,
    #[serde_as(as = "Base64")]
    pub signature: Vec<u8>,
    pub signer_public_key: String,
    pub custom_metadata: BTreeMap<String, String>,
    pub category: Option<String>,
    pub keywords: Vec<String>,
    /// Encoded public key the payload is encrypted for.
    pub recipient: Option<String>,
}

impl Block {
    pub fn signing_payload(&self) -> Vec<u8> {
        signing_payload(
            self.block_number,
            &self.previous_hash,
            self.timestamp,
            &self.payload,
            &self.signer_public_key,
        )
    }

    /// Hash recomputed from the block's fields.
    pub fn compute_hash(&self) -> Hash {
        sha256(&self.signing_payload())
    }

    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    pub fn is_genesis(&self) -> bool {
        self.block_number == 0
    }

    /// Plain inline bytes, if the block carries them.
    pub fn inline_data(&self) -> Option<&[u8]> {
        match &self.payload {
            BlockPayload::Inline { data } => Some(data),
            _ => None,
        }
    }

    pub fn off_chain_reference(&self) -> Option<&OffChainReference> {
        match &self.payload {
            BlockPayload::OffChain { reference } => Some(reference),
            _ => None,
        }
    }

    pub fn is_encrypted(&self) -> bool {
        match &self.payload {
            BlockPayload::Inline { .. } => false,
            BlockPayload::Sealed { .. } => true,
            BlockPayload::OffChain { reference } => reference.encrypted,
        }
    }
}
