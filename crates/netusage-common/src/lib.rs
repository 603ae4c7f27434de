//! netusage common - shared types for mobile data usage resolution
//!
//! This crate provides the value types every other netusage crate speaks:
//! - Subscription identifiers and immutable subscription records
//! - Transports, traffic directions and usage readings
//! - The daily usage window
//! - Error handling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod subscription;
pub mod usage;

pub use error::*;
pub use subscription::*;
pub use usage::*;
