//! # Authorized Key Registry (lc-01)
//!
//! Tracks which public keys may sign blocks, and over which time window.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): registry entries, lifecycle states, the
//!   canonical revocation payload and an immutable snapshot
//! - **Ports Layer** (`ports/`): the `AuthorizationView` read port shared with
//!   block storage and chain validation
//! - **Service Layer** (`service.rs`): `KeyRegistry`, persisted through the
//!   shared `KeyValueStore`
//!
//! ## Domain Invariants
//!
//! | Invariant | Description |
//! |-----------|-------------|
//! | Window | A key signs validly at `t` iff some entry has `created_at <= t < revoked_at` |
//! | History | Revocation is a lifecycle state; entries are never deleted |
//! | Uniqueness | At most one active entry per public key |
//! | Admin | Revocation requires a signature from a currently-authorized key |
//! | Binding | A revocation signature names one entry; it cannot revoke a re-added key |
//!
//! ## Usage
//!
//! ```ignore
//! let registry = KeyRegistry::open(kv, time)?;
//! registry.add_key(&admin_pk, "admin")?;
//! registry.add_key(&alice_pk, "alice")?;
//!
//! let target = registry.revocation_target(&alice_pk)?;
//! let signature = sign_revocation(&admin, &target, "left the team");
//! registry.revoke_key(&alice_pk, &signature, &admin_pk, "left the team")?;
//! ```

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::entities::{AuthorizedKey, KeyStatus, RegistryCounts};
pub use domain::errors::RegistryError;
pub use domain::revocation::{revocation_payload, sign_revocation, RevocationTarget};
pub use domain::snapshot::RegistrySnapshot;
pub use ports::{AuthorizationView, SigningAuthorization};
pub use service::{KeyRegistry, REGISTRY_KEY_PREFIX};
