//! # Key Registry Service
//!
//! Live registry: an indexed snapshot behind a `RwLock`, written through to the
//! shared key-value store under the `k:` namespace.
//!
//! ## Locking
//!
//! Mutations (add, revoke, replace) take the write lock for the whole
//! check-persist-apply sequence, so an authorization check never observes a
//! half-applied revocation. Callers that also hold the block-store lock must
//! acquire that one first.

use crate::domain::entities::{AuthorizedKey, KeyStatus, RegistryCounts};
use crate::domain::errors::RegistryError;
use crate::domain::revocation::RevocationTarget;
use crate::domain::snapshot::RegistrySnapshot;
use crate::ports::{AuthorizationView, SigningAuthorization};
use parking_lot::RwLock;
use shared_types::{BatchOperation, KeyValueStore, TimeSource, Timestamp};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Key prefix for registry records: `k:` followed by the big-endian entry index.
pub const REGISTRY_KEY_PREFIX: &[u8] = b"k:";

fn record_key(index: usize) -> Vec<u8> {
    let mut key = Vec::with_capacity(REGISTRY_KEY_PREFIX.len() + 8);
    key.extend_from_slice(REGISTRY_KEY_PREFIX);
    key.extend_from_slice(&(index as u64).to_be_bytes());
    key
}

fn encode_entry(entry: &AuthorizedKey) -> Result<Vec<u8>, RegistryError> {
    bincode::serialize(entry).map_err(|e| RegistryError::Serialization {
        message: e.to_string(),
    })
}

fn decode_entry(bytes: &[u8]) -> Result<AuthorizedKey, RegistryError> {
    bincode::deserialize(bytes).map_err(|e| RegistryError::Serialization {
        message: e.to_string(),
    })
}

/// Normalize an encoded key to its canonical form.
fn canonical_key(public_key: &str) -> Result<String, RegistryError> {
    Ok(shared_crypto::decode_public_key(public_key)?.encode())
}

fn target_of(state: &RegistrySnapshot, index: usize) -> RevocationTarget {
    let entry = &state.entries()[index];
    RevocationTarget {
        public_key: entry.public_key.clone(),
        entry_index: index as u64,
        created_at: entry.created_at,
    }
}

/// The authorized-key registry.
pub struct KeyRegistry {
    kv: Arc<dyn KeyValueStore>,
    time_source: Arc<dyn TimeSource>,
    state: RwLock<RegistrySnapshot>,
}

impl KeyRegistry {
    /// Load the registry from `kv`.
    pub fn open(
        kv: Arc<dyn KeyValueStore>,
        time_source: Arc<dyn TimeSource>,
    ) -> Result<Self, RegistryError> {
        let records = kv.prefix_scan(REGISTRY_KEY_PREFIX)?;
        let mut entries = Vec::with_capacity(records.len());
        for (position, (key, value)) in records.iter().enumerate() {
            if *key != record_key(position) {
                return Err(RegistryError::Serialization {
                    message: format!("registry records are not contiguous at entry {position}"),
                });
            }
            entries.push(decode_entry(value)?);
        }

        let snapshot = RegistrySnapshot::from_entries(entries);
        if snapshot.is_empty() {
            info!("[lc-01] No existing registry entries found");
        } else {
            let counts = snapshot.counts();
            info!(
                "[lc-01] 🔑 Loaded {} registry entries ({} active)",
                counts.total, counts.active
            );
        }

        Ok(Self {
            kv,
            time_source,
            state: RwLock::new(snapshot),
        })
    }

    /// Authorize `public_key` from now on.
    ///
    /// # Errors
    ///
    /// - `InvalidKey` if the key does not decode
    /// - `EmptyOwnerName` for a blank owner
    /// - `DuplicateKey` if the key already has an active entry
    pub fn add_key(&self, public_key: &str, owner_name: &str) -> Result<AuthorizedKey, RegistryError> {
        let public_key = canonical_key(public_key)?;
        let owner_name = owner_name.trim();
        if owner_name.is_empty() {
            return Err(RegistryError::EmptyOwnerName);
        }

        let mut state = self.state.write();
        if state.active_index(&public_key).is_some() {
            return Err(RegistryError::DuplicateKey { public_key });
        }

        let entry = AuthorizedKey::new(public_key, owner_name, self.time_source.now());
        let index = state.len();
        self.kv.put(&record_key(index), &encode_entry(&entry)?)?;
        state.push(entry.clone());

        info!(
            "[lc-01] 🔑 Authorized key for '{}' (entry #{}, history {})",
            entry.owner_name,
            index,
            state.history(&entry.public_key).count()
        );
        Ok(entry)
    }

    /// The entry a revocation of `public_key` must be signed for.
    ///
    /// # Errors
    ///
    /// `InvalidKey` if the key does not decode, `KeyNotFound` if it was never
    /// registered.
    pub fn revocation_target(&self, public_key: &str) -> Result<RevocationTarget, RegistryError> {
        let public_key = canonical_key(public_key)?;
        let state = self.state.read();
        let index = state
            .latest_index(&public_key)
            .ok_or_else(|| RegistryError::KeyNotFound {
                public_key: public_key.clone(),
            })?;
        Ok(target_of(&state, index))
    }

    /// Revoke the active entry for `public_key` as of now.
    ///
    /// See [`KeyRegistry::revoke_key_not_before`].
    pub fn revoke_key(
        &self,
        public_key: &str,
        admin_signature: &[u8],
        admin_public_key: &str,
        reason: &str,
    ) -> Result<bool, RegistryError> {
        self.revoke_key_not_before(public_key, admin_signature, admin_public_key, reason, 0)
    }

    /// Revoke the active entry for `public_key`.
    ///
    /// The revocation takes effect at `max(now, not_before)`. Callers that know
    /// the latest block timestamp pass one past it, so every block already on
    /// the chain falls inside the closed window.
    ///
    /// `admin_signature` must verify over the payload for
    /// [`KeyRegistry::revocation_target`] and `reason` exactly as passed.
    ///
    /// Returns `true` when an entry was revoked and `false` when the key was
    /// already revoked.
    ///
    /// # Errors
    ///
    /// - `EmptyReason` for a blank reason
    /// - `UnauthorizedRevocation` if the admin key is not currently authorized
    ///   or the signature does not verify for the key's latest entry
    /// - `KeyNotFound` if the key was never registered
    pub fn revoke_key_not_before(
        &self,
        public_key: &str,
        admin_signature: &[u8],
        admin_public_key: &str,
        reason: &str,
        not_before: Timestamp,
    ) -> Result<bool, RegistryError> {
        if reason.trim().is_empty() {
            return Err(RegistryError::EmptyReason);
        }
        let public_key = canonical_key(public_key)?;
        let admin_public_key = canonical_key(admin_public_key)?;

        let mut state = self.state.write();
        let Some(index) = state.latest_index(&public_key) else {
            return Err(RegistryError::KeyNotFound { public_key });
        };

        let now = self.time_source.now();
        let admin_active = state
            .active_entry(&admin_public_key)
            .is_some_and(|entry| entry.covers(now));
        if !admin_active {
            warn!("[lc-01] ⛔ Revocation rejected: admin key is not currently authorized");
            return Err(RegistryError::UnauthorizedRevocation {
                reason: "admin key is not currently authorized".into(),
            });
        }
        let target = target_of(&state, index);
        if !shared_crypto::verify(&target.payload(reason), admin_signature, &admin_public_key) {
            warn!(
                "[lc-01] ⛔ Revocation rejected: admin signature does not verify for entry #{}",
                index
            );
            return Err(RegistryError::UnauthorizedRevocation {
                reason: format!("admin signature does not verify for entry #{index}"),
            });
        }

        if !state.entries()[index].is_active() {
            debug!("[lc-01] Key already revoked, nothing to do");
            return Ok(false);
        }

        let revoked_at = now.max(not_before);
        let status = KeyStatus::Revoked {
            revoked_at,
            reason: reason.to_string(),
            admin_public_key,
            admin_signature: admin_signature.to_vec(),
        };
        let mut updated = state.entries()[index].clone();
        updated.status = status.clone();
        self.kv.put(&record_key(index), &encode_entry(&updated)?)?;
        state.set_status(index, status);

        info!(
            "[lc-01] 🔒 Revoked key of '{}' at {} ({})",
            updated.owner_name, revoked_at, reason
        );
        Ok(true)
    }

    /// Entries in insertion order. With `active_only`, revoked history is omitted.
    pub fn list_keys(&self, active_only: bool) -> Vec<AuthorizedKey> {
        self.state
            .read()
            .entries()
            .iter()
            .filter(|entry| !active_only || entry.is_active())
            .cloned()
            .collect()
    }

    /// The active entry owned by `owner_name`, if any.
    pub fn lookup_by_owner(&self, owner_name: &str) -> Option<AuthorizedKey> {
        let owner_name = owner_name.trim();
        self.state
            .read()
            .entries()
            .iter()
            .find(|entry| entry.is_active() && entry.owner_name == owner_name)
            .cloned()
    }

    /// The active entry for `public_key`, if any.
    pub fn active_entry(&self, public_key: &str) -> Option<AuthorizedKey> {
        let public_key = canonical_key(public_key).ok()?;
        self.state.read().active_entry(&public_key).cloned()
    }

    pub fn counts(&self) -> RegistryCounts {
        self.state.read().counts()
    }

    /// Point-in-time copy for validation.
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.state.read().clone()
    }

    /// Replace every registry entry.
    ///
    /// `commit` receives the batch operations that rewrite the `k:` namespace and
    /// must apply them (together with anything else the caller needs to be
    /// atomic). The in-memory state is swapped only if `commit` succeeds.
    pub fn replace_entries<E, F>(&self, entries: Vec<AuthorizedKey>, commit: F) -> Result<(), E>
    where
        E: From<RegistryError>,
        F: FnOnce(Vec<BatchOperation>) -> Result<(), E>,
    {
        let mut state = self.state.write();

        let mut operations = Vec::with_capacity(entries.len().max(state.len()));
        for (index, entry) in entries.iter().enumerate() {
            operations.push(BatchOperation::put(record_key(index), encode_entry(entry)?));
        }
        for stale in entries.len()..state.len() {
            operations.push(BatchOperation::delete(record_key(stale)));
        }

        commit(operations)?;

        *state = RegistrySnapshot::from_entries(entries);
        let counts = state.counts();
        info!(
            "[lc-01] 🔑 Registry replaced: {} entries ({} active)",
            counts.total, counts.active
        );
        Ok(())
    }
}

impl AuthorizationView for KeyRegistry {
    fn signing_authorization(&self, public_key: &str, at: Timestamp) -> SigningAuthorization {
        self.state.read().signing_authorization(public_key, at)
    }
}
