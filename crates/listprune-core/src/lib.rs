//! listprune core library
//!
//! This crate reconciles remote list memberships and drives the resumable,
//! rate-paced deletion of the identifiers left over.
//!
//! # Modules
//!
//! - [`types`]: Identifiers, membership sets, pages, and deletion outcomes
//! - [`remote`]: Traits the platform client implements
//! - [`aggregate`]: Cursor pagination into membership sets
//! - [`difference`]: Reference-minus-exclusion work queue construction
//! - [`storage`]: Atomic CSV snapshot files
//! - [`pacing`]: Inter-request pacing
//! - [`driver`]: The resumable deletion driver
//! - [`error`]: Error types

pub mod aggregate;
pub mod difference;
pub mod driver;
pub mod error;
pub mod pacing;
pub mod remote;
pub mod storage;
pub mod types;

#[cfg(test)]
mod test_support;

pub use aggregate::{membership_record, Aggregator, ListFetch, DEFAULT_PAGE_SIZE};
pub use difference::difference;
pub use driver::{DeletionDriver, DriverReport};
pub use error::{AggregateError, DriverError, RemoteError, StorageError};
pub use pacing::{FixedInterval, Pacer, Unpaced};
pub use remote::{MembershipSource, ProfileEraser};
pub use storage::SnapshotFile;
pub use types::*;
