//! Transient concurrent staging structure for incoming edges.
//!
//! Two-level map, `partition id -> (vertex id -> edge container)`. Both
//! levels support unsynchronized concurrent insertion of new keys via a
//! read-path-first, double-checked get-or-insert under a short write lock;
//! mutation of an existing container happens under that container's own
//! mutex only. The lifecycle is one ingestion phase: filled by producers,
//! drained entry-by-entry through [`StagingMap::detach`], never reused.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::batch::EdgeReader;
use crate::container::{new_container, ContainerLayout, EdgeContainer};
use crate::types::{PartitionId, VertexIndex};

/// A per-vertex container shared between concurrent appenders.
pub(crate) type SharedContainer<I, E> = Arc<Mutex<Box<dyn EdgeContainer<I, E>>>>;

/// Staged edges for one partition: vertex id -> accumulating container.
pub(crate) struct PartitionStaging<I, E> {
    vertices: RwLock<FxHashMap<I, SharedContainer<I, E>>>,
}

impl<I, E> PartitionStaging<I, E>
where
    I: VertexIndex,
    E: Send + 'static,
{
    fn with_capacity(capacity: usize) -> Self {
        Self {
            vertices: RwLock::new(FxHashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
        }
    }

    /// Resolves the container accumulating edges for the reader's current
    /// vertex, installing a fresh one of `input_layout` on first sight.
    /// Returns the container and whether this call created it.
    ///
    /// The map key is only ever a stable copy released by the reader,
    /// taken at the moment the insert wins; lookups borrow the reader's
    /// transient id. A concurrent inserter losing the double check never
    /// constructs a container at all.
    pub(crate) fn container_for<R>(
        &self,
        reader: &mut R,
        input_layout: ContainerLayout,
    ) -> (SharedContainer<I, E>, bool)
    where
        R: EdgeReader<I, E> + ?Sized,
    {
        {
            let vertices = self.vertices.read();
            if let Some(existing) = vertices.get(reader.current_vertex_id()) {
                return (Arc::clone(existing), false);
            }
        }
        let mut vertices = self.vertices.write();
        if let Some(existing) = vertices.get(reader.current_vertex_id()) {
            return (Arc::clone(existing), false);
        }
        let container: SharedContainer<I, E> = Arc::new(Mutex::new(new_container(input_layout)));
        vertices.insert(reader.release_vertex_id(), Arc::clone(&container));
        (container, true)
    }

    /// Number of distinct vertices staged in this partition.
    pub(crate) fn vertex_count(&self) -> usize {
        self.vertices.read().len()
    }

    /// Consumes the entry, yielding its per-vertex containers.
    pub(crate) fn into_vertices(self) -> FxHashMap<I, SharedContainer<I, E>> {
        self.vertices.into_inner()
    }
}

/// Two-level concurrent staging map,
/// `partition id -> (vertex id -> container)`.
pub(crate) struct StagingMap<I, E> {
    partitions: RwLock<FxHashMap<PartitionId, Arc<PartitionStaging<I, E>>>>,
    stage_capacity: usize,
}

impl<I, E> StagingMap<I, E>
where
    I: VertexIndex,
    E: Send + 'static,
{
    pub(crate) fn new(stage_capacity: usize) -> Self {
        Self {
            partitions: RwLock::new(FxHashMap::default()),
            stage_capacity,
        }
    }

    /// Resolves the staging entry for `partition`, installing an empty one
    /// on first sight.
    pub(crate) fn partition_entry(&self, partition: PartitionId) -> Arc<PartitionStaging<I, E>> {
        {
            let partitions = self.partitions.read();
            if let Some(entry) = partitions.get(&partition) {
                return Arc::clone(entry);
            }
        }
        let mut partitions = self.partitions.write();
        Arc::clone(
            partitions
                .entry(partition)
                .or_insert_with(|| Arc::new(PartitionStaging::with_capacity(self.stage_capacity))),
        )
    }

    /// Atomically detaches a partition's staged edges. Exactly one caller
    /// can observe `Some` for a given id; this is the claim step of the
    /// drain phase.
    pub(crate) fn detach(&self, partition: PartitionId) -> Option<Arc<PartitionStaging<I, E>>> {
        self.partitions.write().remove(&partition)
    }

    /// Snapshot of the staged partition ids.
    pub(crate) fn partition_ids(&self) -> Vec<PartitionId> {
        self.partitions.read().keys().copied().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.partitions.read().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.partitions.read().is_empty()
    }

    pub(crate) fn clear(&self) {
        self.partitions.write().clear();
    }
}
