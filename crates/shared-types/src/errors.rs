//! # Error Classification
//!
//! Every subsystem defines its own error enum; each one maps onto a single
//! `ErrorKind` so callers can react to the failure class without matching
//! subsystem-specific variants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure class of a ledger operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Bad input shape or values (negative counts, empty metadata keys, ...).
    Validation,
    /// Signer or admin not currently authorized.
    Authorization,
    /// Hash, link, signature or content-hash mismatch.
    Integrity,
    /// I/O failure in block or off-chain persistence.
    Storage,
    /// Missing key, block or off-chain reference.
    NotFound,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Authorization => "authorization",
            ErrorKind::Integrity => "integrity",
            ErrorKind::Storage => "storage",
            ErrorKind::NotFound => "not-found",
        };
        f.write_str(name)
    }
}
