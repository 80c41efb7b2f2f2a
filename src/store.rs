//! The edge store: concurrent staging and parallel materialization.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::batch::EdgeReader;
use crate::container::{to_compute, EdgeContainer};
use crate::metrics::IngestMetrics;
use crate::options::StoreOptions;
use crate::partition::{PartitionStore, Vertex};
use crate::runner::{run_workers, IdQueue};
use crate::staging::StagingMap;
use crate::types::{EdgeStoreError, PartitionId, Result, VertexIndex};

/// Collects incoming edges for the vertices owned by this worker and later
/// moves them onto their partitions.
///
/// Two entry points with different concurrency shapes: [`EdgeStore::stage`]
/// is safe to call from any number of producer threads while input flows;
/// [`EdgeStore::materialize`] is a single-caller drain that must only run
/// after every producer has finished. The staging structure lives for one
/// ingestion phase and is not reused after a drain.
pub struct EdgeStore<I, V, E> {
    partition_store: Arc<dyn PartitionStore<I, V, E>>,
    staging: StagingMap<I, E>,
    options: StoreOptions,
}

impl<I, V, E> EdgeStore<I, V, E>
where
    I: VertexIndex,
    V: Default + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Creates a store draining into `partition_store`.
    pub fn new(partition_store: Arc<dyn PartitionStore<I, V, E>>, options: StoreOptions) -> Self {
        let staging = StagingMap::new(options.stage_capacity);
        Self {
            partition_store,
            staging,
            options,
        }
    }

    fn metrics(&self) -> Option<&dyn IngestMetrics> {
        self.options.metrics.as_deref()
    }

    /// Stages one decoded batch of edges for `partition`.
    ///
    /// Thread-safe: any number of producers may call this concurrently for
    /// the same or different partitions. All edges for one vertex
    /// accumulate into a single container regardless of which producer
    /// staged them; concurrent appenders for the same vertex serialize
    /// only on that vertex's container, never on the partition or the
    /// store. An exhausted reader is a no-op.
    pub fn stage<R>(&self, partition: PartitionId, reader: &mut R)
    where
        R: EdgeReader<I, E> + ?Sized,
    {
        let entry = self.staging.partition_entry(partition);
        while reader.advance() {
            let edge = if self.options.reuse_edge_objects {
                reader.current_edge().clone()
            } else {
                reader.release_edge()
            };
            let (container, created) = entry.container_for(reader, self.options.input_layout);
            if created {
                if let Some(metrics) = self.metrics() {
                    metrics.container_created();
                }
            }
            container.lock().add(edge);
            if let Some(metrics) = self.metrics() {
                metrics.edge_staged();
            }
        }
    }

    /// Moves every staged edge onto its owning partition's vertex set.
    ///
    /// Must not run concurrently with [`EdgeStore::stage`]. Partition ids
    /// are distributed across a fixed pool of workers; each claimed
    /// partition's staging entry is detached atomically, so every entry is
    /// merged exactly once. Vertices that do not yet exist are created
    /// with a default value and the staged edges; existing vertices keep
    /// their value and have their edge container replaced, then written
    /// back. The first worker failure fails the whole call; partitions
    /// merged before the failure are not rolled back.
    pub fn materialize(&self) -> Result<()> {
        if self.staging.is_empty() {
            info!("materialize: no staged edges to move");
            return Ok(());
        }

        let ids = self.staging.partition_ids();
        info!(
            partitions = ids.len(),
            threads = self.options.move_threads,
            "materialize: moving staged edges to vertices"
        );
        let queue = IdQueue::new(ids);
        run_workers(self.options.move_threads, "edge-move", |worker| {
            while let Some(partition_id) = queue.poll() {
                self.drain_partition(worker, partition_id)?;
            }
            Ok(())
        })?;

        // Every entry was claimed through detach; residue means a staging
        // call raced the drain, which the contract forbids.
        if !self.staging.is_empty() {
            warn!("materialize: staging map not empty after drain, clearing");
            self.staging.clear();
        }
        info!("materialize: finished moving staged edges to vertices");
        Ok(())
    }

    /// Number of partitions with staged edges.
    pub fn staged_partition_count(&self) -> usize {
        self.staging.len()
    }

    /// True when nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.staging.is_empty()
    }

    fn drain_partition(&self, worker: usize, partition_id: PartitionId) -> Result<()> {
        let mut partition = self
            .partition_store
            .take_partition(partition_id)?
            .ok_or(EdgeStoreError::MissingPartition(partition_id))?;
        let staged = self
            .staging
            .detach(partition_id)
            .ok_or(EdgeStoreError::Corruption("staged partition claimed twice"))?;
        let staged = Arc::try_unwrap(staged)
            .map_err(|_| EdgeStoreError::Corruption("staging entry still shared after detach"))?;
        let vertices = staged.into_vertices();
        let vertex_total = vertices.len();
        debug!(
            worker,
            partition = %partition_id,
            vertices = vertex_total,
            "draining partition"
        );

        // Consuming the map drops each staged pair as soon as it is merged.
        for (vertex_id, container) in vertices {
            let container = Arc::try_unwrap(container)
                .map_err(|_| EdgeStoreError::Corruption("edge container still shared after detach"))?
                .into_inner();
            let edges = to_compute(container, self.options.compute_layout);
            match partition.take_vertex(&vertex_id) {
                Some(mut vertex) => {
                    vertex.set_edges(edges);
                    // Externalized partition backends only observe the new
                    // container through the write-back.
                    partition.save_vertex(vertex);
                    if let Some(metrics) = self.metrics() {
                        metrics.vertex_updated();
                    }
                }
                None => {
                    partition.put_vertex(Vertex::new(vertex_id, V::default(), edges));
                    if let Some(metrics) = self.metrics() {
                        metrics.vertex_created();
                    }
                }
            }
        }

        self.partition_store.put_partition(partition)?;
        if let Some(metrics) = self.metrics() {
            metrics.partition_drained(vertex_total);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::VecEdgeReader;
    use crate::container::{ContainerLayout, Edge};
    use crate::partition::MemoryPartitionStore;

    fn reader(pairs: Vec<(u64, Edge<u64, u32>)>) -> VecEdgeReader<u64, u32> {
        VecEdgeReader::new(pairs)
    }

    #[test]
    fn staged_edges_land_on_their_vertices() -> Result<()> {
        let partition_store: Arc<MemoryPartitionStore<u64, i64, u32>> =
            Arc::new(MemoryPartitionStore::with_partition_ids([PartitionId(0)]));
        let store = EdgeStore::new(
            Arc::clone(&partition_store) as Arc<dyn PartitionStore<u64, i64, u32>>,
            StoreOptions::new().move_threads(2),
        );

        store.stage(
            PartitionId(0),
            &mut reader(vec![(1, Edge::new(2, 10)), (1, Edge::new(3, 11))]),
        );
        store.stage(PartitionId(0), &mut reader(vec![(4, Edge::new(1, 12))]));
        assert_eq!(store.staged_partition_count(), 1);

        store.materialize()?;
        assert!(store.is_empty());

        let mut partition = partition_store
            .take_partition(PartitionId(0))?
            .expect("partition present");
        assert_eq!(partition.vertex_count(), 2);
        let vertex = partition.take_vertex(&1).expect("vertex 1 created");
        assert_eq!(*vertex.value(), i64::default());
        assert_eq!(vertex.edges().len(), 2);
        assert_eq!(vertex.edges().layout(), ContainerLayout::Flat);
        Ok(())
    }

    #[test]
    fn reused_edge_buffers_are_cloned() -> Result<()> {
        let partition_store: Arc<MemoryPartitionStore<u64, i64, u32>> =
            Arc::new(MemoryPartitionStore::with_partition_ids([PartitionId(0)]));
        let store = EdgeStore::new(
            Arc::clone(&partition_store) as Arc<dyn PartitionStore<u64, i64, u32>>,
            StoreOptions::new().reuse_edge_objects(true).move_threads(1),
        );

        store.stage(
            PartitionId(0),
            &mut reader(vec![(1, Edge::new(2, 10)), (1, Edge::new(2, 10))]),
        );
        store.materialize()?;

        let mut partition = partition_store
            .take_partition(PartitionId(0))?
            .expect("partition present");
        let vertex = partition.take_vertex(&1).expect("vertex 1 created");
        // Duplicates are preserved: this is a multiset, not a set.
        assert_eq!(vertex.edges().len(), 2);
        Ok(())
    }

    #[test]
    fn identical_layouts_skip_conversion() -> Result<()> {
        let partition_store: Arc<MemoryPartitionStore<u64, i64, u32>> =
            Arc::new(MemoryPartitionStore::with_partition_ids([PartitionId(0)]));
        let store = EdgeStore::new(
            Arc::clone(&partition_store) as Arc<dyn PartitionStore<u64, i64, u32>>,
            StoreOptions::new()
                .input_layout(ContainerLayout::Chunked)
                .compute_layout(ContainerLayout::Chunked)
                .move_threads(1),
        );

        store.stage(PartitionId(0), &mut reader(vec![(1, Edge::new(2, 10))]));
        store.materialize()?;

        let mut partition = partition_store
            .take_partition(PartitionId(0))?
            .expect("partition present");
        let vertex = partition.take_vertex(&1).expect("vertex 1 created");
        assert_eq!(vertex.edges().layout(), ContainerLayout::Chunked);
        Ok(())
    }

    #[test]
    fn missing_partition_is_fatal() {
        let partition_store: Arc<MemoryPartitionStore<u64, i64, u32>> =
            Arc::new(MemoryPartitionStore::new());
        let store = EdgeStore::new(
            Arc::clone(&partition_store) as Arc<dyn PartitionStore<u64, i64, u32>>,
            StoreOptions::new().move_threads(1),
        );

        store.stage(PartitionId(9), &mut reader(vec![(1, Edge::new(2, 10))]));
        let err = store.materialize().unwrap_err();
        assert!(matches!(
            err,
            EdgeStoreError::MissingPartition(PartitionId(9))
        ));
    }
}
