//! # Domain Layer
//!
//! - `report` - Block statuses and the aggregated result
//! - `validator` - Streaming reducer over blocks

pub mod report;
pub mod validator;
