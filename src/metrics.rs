//! Observability hooks for ingestion activity.

use std::sync::atomic::{AtomicU64, Ordering};

/// Trait for tracking staging and drain activity in the edge store.
///
/// Implementations collect statistics about staged edges, container
/// creation, and the per-partition merge work performed by the drain
/// phase. The store invokes these hooks from many threads concurrently.
pub trait IngestMetrics: Send + Sync {
    /// Records one staged edge.
    fn edge_staged(&self);

    /// Records the creation of a fresh per-vertex staging container.
    fn container_created(&self);

    /// Records one fully drained partition and the number of vertices it
    /// merged.
    fn partition_drained(&self, vertex_count: usize);

    /// Records a vertex created by the drain because none existed.
    fn vertex_created(&self);

    /// Records an existing vertex whose edges the drain replaced.
    fn vertex_updated(&self);
}

/// A no-op implementation of [`IngestMetrics`] that discards everything.
#[derive(Default)]
pub struct NoopMetrics;

impl IngestMetrics for NoopMetrics {
    fn edge_staged(&self) {}
    fn container_created(&self) {}
    fn partition_drained(&self, _vertex_count: usize) {}
    fn vertex_created(&self) {}
    fn vertex_updated(&self) {}
}

/// A thread-safe counter-based implementation of [`IngestMetrics`].
#[derive(Default)]
pub struct CounterMetrics {
    /// Edges staged.
    pub edges_staged: AtomicU64,
    /// Per-vertex staging containers created.
    pub containers_created: AtomicU64,
    /// Partitions drained.
    pub partitions_drained: AtomicU64,
    /// Vertices merged across all drained partitions.
    pub vertices_merged: AtomicU64,
    /// Vertices created by the drain.
    pub vertices_created: AtomicU64,
    /// Existing vertices whose edges the drain replaced.
    pub vertices_updated: AtomicU64,
}

impl IngestMetrics for CounterMetrics {
    fn edge_staged(&self) {
        self.edges_staged.fetch_add(1, Ordering::Relaxed);
    }

    fn container_created(&self) {
        self.containers_created.fetch_add(1, Ordering::Relaxed);
    }

    fn partition_drained(&self, vertex_count: usize) {
        self.partitions_drained.fetch_add(1, Ordering::Relaxed);
        self.vertices_merged
            .fetch_add(vertex_count as u64, Ordering::Relaxed);
    }

    fn vertex_created(&self) {
        self.vertices_created.fetch_add(1, Ordering::Relaxed);
    }

    fn vertex_updated(&self) {
        self.vertices_updated.fetch_add(1, Ordering::Relaxed);
    }
}
