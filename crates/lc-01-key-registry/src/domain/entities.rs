//! # Registry Entities

use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};
use shared_types::Timestamp;

/// Lifecycle state of a registry entry.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyStatus {
    /// Key may sign from `created_at` onwards.
    Active,
    /// Key was revoked by an administrator. The entry stays for audit.
    Revoked {
        /// Instant the revocation took effect (exclusive upper bound).
        revoked_at: Timestamp,
        /// Operator-supplied reason.
        reason: String,
        /// Encoded public key of the administrator who signed the revocation.
        admin_public_key: String,
        /// Administrator signature over the revocation payload.
        #[serde_as(as = "Base64")]
        admin_signature: Vec<u8>,
    },
}

/// One authorization window for a public key.
///
/// A key that is revoked and later re-added has two entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedKey {
    /// Encoded (base64 SEC1 compressed) public key.
    pub public_key: String,
    /// Human-readable owner.
    pub owner_name: String,
    /// Start of the authorization window (inclusive).
    pub created_at: Timestamp,
    /// Current lifecycle state.
    pub status: KeyStatus,
}

impl AuthorizedKey {
    /// Create an active entry.
    pub fn new(public_key: impl Into<String>, owner_name: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            public_key: public_key.into(),
            owner_name: owner_name.into(),
            created_at,
            status: KeyStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, KeyStatus::Active)
    }

    pub fn revoked_at(&self) -> Option<Timestamp> {
        match &self.status {
            KeyStatus::Active => None,
            KeyStatus::Revoked { revoked_at, .. } => Some(*revoked_at),
        }
    }

    /// Whether this entry authorizes signing at `at`.
    pub fn covers(&self, at: Timestamp) -> bool {
        self.created_at <= at && self.revoked_at().map_or(true, |end| at < end)
    }
}

/// Entry counts for status reporting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryCounts {
    /// All entries, including revoked history.
    pub total: usize,
    /// Entries currently active.
    pub active: usize,
}
