//! Core identifier and error types shared across the store.

use std::fmt;
use std::hash::Hash;
use std::io;

use thiserror::Error;

/// Identifier of one graph partition owned by this worker.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct PartitionId(pub u32);

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bounds required of a vertex id used as a staging and partition key.
///
/// Vertex ids are opaque to the store. Callers may hand the store borrows
/// that point into reused decode buffers; the store takes a stable owned
/// copy before using an id as a map key.
pub trait VertexIndex: Eq + Hash + Ord + Clone + fmt::Debug + Send + Sync + 'static {}

impl<T> VertexIndex for T where T: Eq + Hash + Ord + Clone + fmt::Debug + Send + Sync + 'static {}

/// Errors surfaced by the edge store.
#[derive(Debug, Error)]
pub enum EdgeStoreError {
    /// An I/O error reported by a partition storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// A partition had staged edges but the partition store does not own it.
    #[error("partition {0} has staged edges but no backing partition")]
    MissingPartition(PartitionId),
    /// An internal invariant was violated.
    #[error("corruption: {0}")]
    Corruption(&'static str),
    /// A contract was misused by the caller.
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
    /// A drain worker panicked.
    #[error("drain worker panicked: {0}")]
    WorkerPanic(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EdgeStoreError>;
