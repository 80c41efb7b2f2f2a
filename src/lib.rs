//! Edge-ingestion core for a bulk-synchronous graph engine.
//!
//! During graph input many producer threads decode incoming transfers and
//! hand their (vertex id, edge) pairs to [`EdgeStore::stage`], which
//! accumulates them in a transient concurrent staging map keyed by
//! partition and vertex. Once every producer has finished, a single call
//! to [`EdgeStore::materialize`] drains the map with a fixed pool of
//! workers, merging the staged edges onto the authoritative vertex records
//! of each partition.

#![warn(missing_docs)]

pub mod batch;
pub mod container;
pub mod metrics;
pub mod options;
pub mod partition;
mod runner;
mod staging;
pub mod store;
pub mod types;

pub use batch::{EdgeReader, VecEdgeReader};
pub use container::{ChunkedEdges, ContainerLayout, Edge, EdgeContainer, FlatEdges};
pub use metrics::{CounterMetrics, IngestMetrics, NoopMetrics};
pub use options::StoreOptions;
pub use partition::{MemoryPartition, MemoryPartitionStore, Partition, PartitionStore, Vertex};
pub use store::EdgeStore;
pub use types::{EdgeStoreError, PartitionId, Result, VertexIndex};
