//! # Domain Layer
//!
//! Pure registry logic. No storage, no locking.

pub mod entities;
pub mod errors;
pub mod revocation;
pub mod snapshot;
