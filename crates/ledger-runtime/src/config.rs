//! # Ledger Configuration
//!
//! Explicit configuration object passed to [`crate::Ledger`]. Defaults can be
//! overridden programmatically with the `with_*` setters or from the
//! environment with [`LedgerConfig::from_env`].

use lc_02_offchain_storage::OffChainConfig;
use lc_03_block_storage::BlockStoreConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Data directory override.
pub const ENV_DATA_DIR: &str = "LEDGER_DATA_DIR";
/// Inline/off-chain threshold override, in bytes.
pub const ENV_OFFCHAIN_THRESHOLD: &str = "LEDGER_OFFCHAIN_THRESHOLD";
/// Batch size override for chain walks.
pub const ENV_BATCH_SIZE: &str = "LEDGER_BATCH_SIZE";

/// File name of the key-value database inside the data directory.
pub const DATABASE_FILE: &str = "ledger.db";
/// Off-chain blob directory inside the data directory.
pub const OFF_CHAIN_DIR: &str = "off-chain";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {variable}: {value:?} ({reason})")]
    InvalidEnvValue {
        variable: &'static str,
        value: String,
        reason: String,
    },

    #[error("Batch size must be at least 1")]
    ZeroBatchSize,

    #[error("Off-chain threshold {threshold} exceeds the maximum payload size {max}")]
    ThresholdAboveMaximum { threshold: u64, max: u64 },

    #[error("No data directory configured")]
    MissingDataDir,
}

impl ConfigError {
    pub fn kind(&self) -> shared_types::ErrorKind {
        shared_types::ErrorKind::Validation
    }
}

/// Complete ledger configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Directory for the database, the off-chain blobs and the lock file.
    /// Required by [`crate::Ledger::open`]; ignored by in-memory ledgers.
    pub data_dir: Option<PathBuf>,
    /// Block store limits.
    pub block_store: BlockStoreConfig,
}

impl LedgerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }

    pub fn with_block_store(mut self, block_store: BlockStoreConfig) -> Self {
        self.block_store = block_store;
        self
    }

    pub fn with_off_chain_threshold(mut self, bytes: u64) -> Self {
        self.block_store = self.block_store.with_off_chain_threshold(bytes);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.block_store = self.block_store.with_batch_size(batch_size);
        self
    }

    /// Defaults overlaid with `LEDGER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.trim().is_empty()) {
            config.data_dir = Some(PathBuf::from(dir.trim()));
        }
        if let Some(raw) = lookup(ENV_OFFCHAIN_THRESHOLD) {
            let threshold = parse_env(ENV_OFFCHAIN_THRESHOLD, &raw)?;
            config.block_store = config.block_store.with_off_chain_threshold(threshold);
        }
        if let Some(raw) = lookup(ENV_BATCH_SIZE) {
            let batch_size = parse_env(ENV_BATCH_SIZE, &raw)?;
            config.block_store = config.block_store.with_batch_size(batch_size);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject combinations the subsystems cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let store = &self.block_store;
        if store.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if store.off_chain_threshold_bytes > store.max_off_chain_bytes {
            return Err(ConfigError::ThresholdAboveMaximum {
                threshold: store.off_chain_threshold_bytes,
                max: store.max_off_chain_bytes,
            });
        }
        Ok(())
    }

    pub fn off_chain(&self) -> OffChainConfig {
        OffChainConfig::default().with_max_payload_bytes(self.block_store.max_off_chain_bytes)
    }

    pub(crate) fn require_data_dir(&self) -> Result<&Path, ConfigError> {
        self.data_dir.as_deref().ok_or(ConfigError::MissingDataDir)
    }
}

fn parse_env<T>(variable: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvValue {
            variable,
            value: raw.to_string(),
            reason: e.to_string(),
        })
}
