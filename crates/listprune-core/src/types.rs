//! Core listprune types

use crate::error::RemoteError;
use std::collections::BTreeSet;
use std::fmt;

/// Opaque identifier of a remote contact record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Opaque pagination token handed back by the remote list API
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(pub String);

impl Cursor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// All members of a remote list (or a union of lists) at fetch time.
///
/// Ordered so that persisted records and work queues iterate deterministically.
pub type MembershipSet = BTreeSet<Identifier>;

/// One page of list membership records
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Member identifiers on this page
    pub identifiers: Vec<Identifier>,
    /// Cursor for the next page, `None` on the last page
    pub next_cursor: Option<Cursor>,
}

/// Which side of the reconciliation a list belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListGroup {
    /// Lists whose members are candidates for deletion
    Reference,
    /// Lists whose members must be kept
    Exclusion,
}

impl ListGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListGroup::Reference => "reference",
            ListGroup::Exclusion => "exclusion",
        }
    }
}

impl fmt::Display for ListGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one deletion attempt
#[derive(Debug)]
pub enum DeletionOutcome {
    /// Remote accepted the deletion
    Deleted,
    /// Remote reports no such record; treated as already deleted
    AlreadyAbsent,
    /// Remote rejected or errored; the entry stays queued
    Failed(RemoteError),
}

impl DeletionOutcome {
    /// Whether the entry may be dropped from the work queue
    pub fn is_confirmed(&self) -> bool {
        matches!(self, DeletionOutcome::Deleted | DeletionOutcome::AlreadyAbsent)
    }
}

impl From<Result<(), RemoteError>> for DeletionOutcome {
    fn from(result: Result<(), RemoteError>) -> Self {
        match result {
            Ok(()) => DeletionOutcome::Deleted,
            Err(RemoteError::NotFound(_)) => DeletionOutcome::AlreadyAbsent,
            Err(err) => DeletionOutcome::Failed(err),
        }
    }
}
