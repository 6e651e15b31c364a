//! # Ports
//!
//! Read-side authorization port. Block storage consults it before appending;
//! chain validation consults a snapshot of it for compliance accounting.

use shared_types::Timestamp;

/// How a key stood at a given signing instant, judged against today's registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SigningAuthorization {
    /// Authorized at that instant and not revoked now.
    Active,
    /// Authorized at that instant but revoked since.
    RevokedSince { revoked_at: Timestamp },
    /// No entry covered that instant.
    NotAuthorized,
}

/// Read access to authorization windows.
pub trait AuthorizationView: Send + Sync {
    /// Classify a signature made by `public_key` at `at`.
    fn signing_authorization(&self, public_key: &str, at: Timestamp) -> SigningAuthorization;

    /// True iff some entry has `created_at <= at < revoked_at` (or no revocation).
    fn is_authorized(&self, public_key: &str, at: Timestamp) -> bool {
        !matches!(
            self.signing_authorization(public_key, at),
            SigningAuthorization::NotAuthorized
        )
    }
}
