//! # Registry Snapshot
//!
//! Immutable, indexed copy of every registry entry. The live registry keeps
//! one of these behind its lock; validation works on a clone.

use crate::domain::entities::{AuthorizedKey, KeyStatus, RegistryCounts};
use crate::ports::{AuthorizationView, SigningAuthorization};
use shared_types::Timestamp;
use std::collections::HashMap;

/// Entries in insertion order with a per-key index.
#[derive(Clone, Debug, Default)]
pub struct RegistrySnapshot {
    entries: Vec<AuthorizedKey>,
    by_key: HashMap<String, Vec<usize>>,
}

impl RegistrySnapshot {
    /// Build from entries in insertion order.
    pub fn from_entries(entries: Vec<AuthorizedKey>) -> Self {
        let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, entry) in entries.iter().enumerate() {
            by_key.entry(entry.public_key.clone()).or_default().push(index);
        }
        Self { entries, by_key }
    }

    pub fn entries(&self) -> &[AuthorizedKey] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry ever created for `public_key`, oldest first.
    pub fn history<'a>(&'a self, public_key: &str) -> impl Iterator<Item = &'a AuthorizedKey> + 'a {
        self.by_key
            .get(public_key)
            .into_iter()
            .flatten()
            .filter_map(move |&index| self.entries.get(index))
    }

    /// Index of the active entry for `public_key`.
    pub fn active_index(&self, public_key: &str) -> Option<usize> {
        self.by_key
            .get(public_key)?
            .iter()
            .copied()
            .find(|&index| self.entries.get(index).is_some_and(AuthorizedKey::is_active))
    }

    /// Index of the most recent entry for `public_key`. Any active entry is
    /// always the most recent one.
    pub fn latest_index(&self, public_key: &str) -> Option<usize> {
        self.by_key.get(public_key)?.last().copied()
    }

    pub fn active_entry(&self, public_key: &str) -> Option<&AuthorizedKey> {
        self.active_index(public_key)
            .and_then(|index| self.entries.get(index))
    }

    pub fn is_known(&self, public_key: &str) -> bool {
        self.by_key.contains_key(public_key)
    }

    pub fn counts(&self) -> RegistryCounts {
        RegistryCounts {
            total: self.entries.len(),
            active: self.entries.iter().filter(|e| e.is_active()).count(),
        }
    }

    pub(crate) fn push(&mut self, entry: AuthorizedKey) -> usize {
        let index = self.entries.len();
        self.by_key
            .entry(entry.public_key.clone())
            .or_default()
            .push(index);
        self.entries.push(entry);
        index
    }

    pub(crate) fn set_status(&mut self, index: usize, status: KeyStatus) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.status = status;
        }
    }
}

impl AuthorizationView for RegistrySnapshot {
    fn signing_authorization(&self, public_key: &str, at: Timestamp) -> SigningAuthorization {
        let Some(covering) = self.history(public_key).find(|entry| entry.covers(at)) else {
            return SigningAuthorization::NotAuthorized;
        };
        if self.active_index(public_key).is_some() {
            return SigningAuthorization::Active;
        }
        match covering.revoked_at() {
            Some(revoked_at) => SigningAuthorization::RevokedSince { revoked_at },
            None => SigningAuthorization::Active,
        }
    }
}
