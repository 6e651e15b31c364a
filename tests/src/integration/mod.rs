//! # Integration Scenarios
//!
//! Every scenario drives the public `Ledger` facade; only `fixtures` reaches
//! underneath it, to tamper with persisted records.

pub mod fixtures;

#[cfg(test)]
mod concurrency;
#[cfg(test)]
mod scenarios;
#[cfg(test)]
mod tamper;
#[cfg(test)]
mod transfer;
