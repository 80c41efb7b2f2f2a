//! Partition storage contracts and the in-memory backend.
//!
//! The edge store only talks to partitions through the [`Partition`] and
//! [`PartitionStore`] traits. `take_*` detaches a record for exclusive
//! mutation; every detached or freshly created record must be written back
//! through the matching `save_*`/`put_*` call. Backends that externalize
//! records (byte-array partitions, disk-spilled partition stores) rely on
//! the write-back to re-persist the mutation; heap backends treat it as a
//! plain re-insert.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::container::EdgeContainer;
use crate::types::{PartitionId, Result, VertexIndex};

/// A materialized vertex record: identity, value, and owned edges.
pub struct Vertex<I, V, E> {
    id: I,
    value: V,
    edges: Box<dyn EdgeContainer<I, E>>,
}

impl<I, V, E> Vertex<I, V, E> {
    /// Builds a vertex from its identity, value, and edge container.
    pub fn new(id: I, value: V, edges: Box<dyn EdgeContainer<I, E>>) -> Self {
        Self { id, value, edges }
    }

    /// The vertex id.
    pub fn id(&self) -> &I {
        &self.id
    }

    /// The vertex value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Mutable access to the vertex value.
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// The vertex's edges.
    pub fn edges(&self) -> &dyn EdgeContainer<I, E> {
        &*self.edges
    }

    /// Replaces the edge container in place.
    pub fn set_edges(&mut self, edges: Box<dyn EdgeContainer<I, E>>) {
        self.edges = edges;
    }
}

/// One graph partition's authoritative vertex set.
pub trait Partition<I, V, E>: Send {
    /// This partition's id.
    fn id(&self) -> PartitionId;

    /// Detaches the vertex with `id` for mutation, if present.
    fn take_vertex(&mut self, id: &I) -> Option<Vertex<I, V, E>>;

    /// Inserts a vertex that did not previously exist.
    fn put_vertex(&mut self, vertex: Vertex<I, V, E>);

    /// Writes a mutated vertex back after it was detached.
    fn save_vertex(&mut self, vertex: Vertex<I, V, E>);

    /// Number of vertices currently owned.
    fn vertex_count(&self) -> usize;
}

/// Authoritative storage for every partition owned by this worker.
///
/// Shared by the drain workers, so implementations must be safe to call
/// from multiple threads; each individual partition is only ever held by
/// one worker at a time between `take_partition` and `put_partition`.
pub trait PartitionStore<I, V, E>: Send + Sync {
    /// Detaches the partition with `id` for exclusive mutation, or `None`
    /// when the store does not own it.
    fn take_partition(&self, id: PartitionId) -> Result<Option<Box<dyn Partition<I, V, E>>>>;

    /// Writes a partition back after bulk mutation. Spill-capable backends
    /// require this to re-register the partition.
    fn put_partition(&self, partition: Box<dyn Partition<I, V, E>>) -> Result<()>;

    /// Ids of all partitions currently owned.
    fn partition_ids(&self) -> Vec<PartitionId>;
}

/// Heap-resident [`Partition`] backed by a hash map.
pub struct MemoryPartition<I, V, E> {
    id: PartitionId,
    vertices: FxHashMap<I, Vertex<I, V, E>>,
}

impl<I: VertexIndex, V, E> MemoryPartition<I, V, E> {
    /// Creates an empty partition with the given id.
    pub fn new(id: PartitionId) -> Self {
        Self {
            id,
            vertices: FxHashMap::default(),
        }
    }
}

impl<I, V, E> Partition<I, V, E> for MemoryPartition<I, V, E>
where
    I: VertexIndex,
    V: Send + 'static,
    E: Send + 'static,
{
    fn id(&self) -> PartitionId {
        self.id
    }

    fn take_vertex(&mut self, id: &I) -> Option<Vertex<I, V, E>> {
        self.vertices.remove(id)
    }

    fn put_vertex(&mut self, vertex: Vertex<I, V, E>) {
        self.vertices.insert(vertex.id().clone(), vertex);
    }

    fn save_vertex(&mut self, vertex: Vertex<I, V, E>) {
        // Heap backend: write-back is a plain re-insert.
        self.vertices.insert(vertex.id().clone(), vertex);
    }

    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

/// In-memory [`PartitionStore`] used by in-process pipelines and tests.
pub struct MemoryPartitionStore<I, V, E> {
    partitions: Mutex<FxHashMap<PartitionId, Box<dyn Partition<I, V, E>>>>,
}

impl<I, V, E> MemoryPartitionStore<I, V, E>
where
    I: VertexIndex,
    V: Send + 'static,
    E: Send + 'static,
{
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            partitions: Mutex::new(FxHashMap::default()),
        }
    }

    /// Creates a store pre-seeded with an empty partition per id.
    pub fn with_partition_ids(ids: impl IntoIterator<Item = PartitionId>) -> Self {
        let store = Self::new();
        {
            let mut partitions = store.partitions.lock();
            for id in ids {
                partitions.insert(id, Box::new(MemoryPartition::<I, V, E>::new(id)) as _);
            }
        }
        store
    }
}

impl<I, V, E> Default for MemoryPartitionStore<I, V, E>
where
    I: VertexIndex,
    V: Send + 'static,
    E: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<I, V, E> PartitionStore<I, V, E> for MemoryPartitionStore<I, V, E>
where
    I: VertexIndex,
    V: Send + 'static,
    E: Send + 'static,
{
    fn take_partition(&self, id: PartitionId) -> Result<Option<Box<dyn Partition<I, V, E>>>> {
        Ok(self.partitions.lock().remove(&id))
    }

    fn put_partition(&self, partition: Box<dyn Partition<I, V, E>>) -> Result<()> {
        self.partitions.lock().insert(partition.id(), partition);
        Ok(())
    }

    fn partition_ids(&self) -> Vec<PartitionId> {
        self.partitions.lock().keys().copied().collect()
    }
}
