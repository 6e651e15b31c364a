//! # Domain Layer
//!
//! Pure block logic: entities, canonical hashing, option validation, rollback
//! arithmetic and search predicates. No storage and no locking.

pub mod block;
pub mod config;
pub mod errors;
pub mod options;
pub mod rollback;
pub mod search;
