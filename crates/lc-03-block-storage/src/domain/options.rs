//! # Block Options
//!
//! Descriptive fields and placement hints supplied with a new block.

use crate::domain::config::BlockStoreConfig;
use crate::domain::errors::BlockStoreError;
use serde::{Deserialize, Serialize};
use shared_crypto::Secp256k1PublicKey;
use std::collections::BTreeMap;

/// Caller-supplied options for `add_block`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockOptions {
    /// Encrypt the payload for this encoded public key.
    pub recipient: Option<String>,
    /// Free-form metadata. Later inserts for a key replace earlier ones.
    pub metadata: BTreeMap<String, String>,
    pub category: Option<String>,
    pub keywords: Vec<String>,
    /// Store off-chain even below the size threshold.
    pub off_chain: bool,
}

impl BlockOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recipient(mut self, public_key: impl Into<String>) -> Self {
        self.recipient = Some(public_key.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords.extend(keywords.into_iter().map(Into::into));
        self
    }

    pub fn off_chain(mut self) -> Self {
        self.off_chain = true;
        self
    }

    /// Check against `config` and normalize.
    ///
    /// - metadata keys are trimmed and must be non-empty; values may be empty
    /// - category is trimmed and upper-cased; blank means none
    /// - keywords are trimmed; blanks and repeats are dropped
    pub(crate) fn validate(&self, config: &BlockStoreConfig) -> Result<ValidatedOptions, BlockStoreError> {
        let recipient = self
            .recipient
            .as_deref()
            .map(shared_crypto::decode_public_key)
            .transpose()
            .map_err(BlockStoreError::InvalidRecipient)?;

        if self.metadata.len() > config.max_metadata_entries {
            return Err(BlockStoreError::invalid_options(format!(
                "{} metadata entries exceeds maximum of {}",
                self.metadata.len(),
                config.max_metadata_entries
            )));
        }
        let mut metadata = BTreeMap::new();
        for (key, value) in &self.metadata {
            let key = key.trim();
            if key.is_empty() {
                return Err(BlockStoreError::invalid_options("metadata key must not be empty"));
            }
            metadata.insert(key.to_string(), value.clone());
        }

        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_uppercase);

        let mut keywords: Vec<String> = Vec::with_capacity(self.keywords.len());
        for keyword in &self.keywords {
            let keyword = keyword.trim();
            if !keyword.is_empty() && !keywords.iter().any(|k| k == keyword) {
                keywords.push(keyword.to_string());
            }
        }
        if keywords.len() > config.max_keywords {
            return Err(BlockStoreError::invalid_options(format!(
                "{} keywords exceeds maximum of {}",
                keywords.len(),
                config.max_keywords
            )));
        }

        Ok(ValidatedOptions {
            recipient,
            metadata,
            category,
            keywords,
            off_chain: self.off_chain,
        })
    }
}

/// Options after validation.
#[derive(Clone, Debug)]
pub(crate) struct ValidatedOptions {
    pub recipient: Option<Secp256k1PublicKey>,
    pub metadata: BTreeMap<String, String>,
    pub category: Option<String>,
    pub keywords: Vec<String>,
    pub off_chain: bool,
}
