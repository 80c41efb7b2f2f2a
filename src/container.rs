//! Edge containers: the per-vertex collections edges accumulate into.
//!
//! Two interchangeable implementations satisfy the same capability
//! contract. [`ChunkedEdges`] is append-optimized and serves the input
//! phase; [`FlatEdges`] is traversal-optimized and serves the compute
//! phase. Which layout serves which phase is configuration, see
//! [`crate::StoreOptions`]; conversion between them is an explicit step,
//! see [`to_compute`].

use smallvec::SmallVec;

/// Number of edges per chunk in the append-optimized layout.
const CHUNK_EDGES: usize = 64;

/// An outgoing edge owned by a staged or materialized vertex. The source
/// vertex is implicit: it is the vertex whose container holds the edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge<I, E> {
    /// Target vertex id.
    pub target: I,
    /// Edge payload.
    pub value: E,
}

impl<I, E> Edge<I, E> {
    /// Creates an edge to `target` carrying `value`.
    pub fn new(target: I, value: E) -> Self {
        Self { target, value }
    }
}

/// Which concrete edge container serves a phase.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ContainerLayout {
    /// Chunked append-optimized layout, used while edges stream in.
    Chunked,
    /// Flat traversal-optimized layout, used by the compute phase.
    Flat,
}

/// A mutable, appendable, iterable multiset of edges for one vertex.
///
/// Duplicate edges are preserved; nothing here deduplicates.
pub trait EdgeContainer<I, E>: Send {
    /// Appends an edge.
    fn add(&mut self, edge: Edge<I, E>);

    /// Number of edges held.
    fn len(&self) -> usize;

    /// True when no edges are held.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the edges in insertion order.
    fn iter(&self) -> Box<dyn Iterator<Item = &Edge<I, E>> + '_>;

    /// Consumes the container, yielding its edges in iteration order.
    fn into_edges(self: Box<Self>) -> Vec<Edge<I, E>>;

    /// The layout this container implements.
    fn layout(&self) -> ContainerLayout;
}

/// Append-optimized container: fixed-size chunks hanging off a short
/// inline spine, so an append never relocates previously staged edges.
pub struct ChunkedEdges<I, E> {
    chunks: SmallVec<[Vec<Edge<I, E>>; 4]>,
    len: usize,
}

impl<I, E> ChunkedEdges<I, E> {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self {
            chunks: SmallVec::new(),
            len: 0,
        }
    }
}

impl<I, E> Default for ChunkedEdges<I, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, E> EdgeContainer<I, E> for ChunkedEdges<I, E>
where
    I: Send + 'static,
    E: Send + 'static,
{
    fn add(&mut self, edge: Edge<I, E>) {
        match self.chunks.last_mut() {
            Some(chunk) if chunk.len() < CHUNK_EDGES => chunk.push(edge),
            _ => {
                let mut chunk = Vec::with_capacity(CHUNK_EDGES);
                chunk.push(edge);
                self.chunks.push(chunk);
            }
        }
        self.len += 1;
    }

    fn len(&self) -> usize {
        self.len
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &Edge<I, E>> + '_> {
        Box::new(self.chunks.iter().flat_map(|chunk| chunk.iter()))
    }

    fn into_edges(self: Box<Self>) -> Vec<Edge<I, E>> {
        let mut edges = Vec::with_capacity(self.len);
        for chunk in self.chunks {
            edges.extend(chunk);
        }
        edges
    }

    fn layout(&self) -> ContainerLayout {
        ContainerLayout::Chunked
    }
}

/// Traversal-optimized container: one contiguous buffer, allocated with an
/// exact size hint at conversion time.
pub struct FlatEdges<I, E> {
    edges: Vec<Edge<I, E>>,
}

impl<I, E> FlatEdges<I, E> {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self { edges: Vec::new() }
    }

    /// Creates an empty container sized for `capacity` edges.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            edges: Vec::with_capacity(capacity),
        }
    }
}

impl<I, E> Default for FlatEdges<I, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, E> EdgeContainer<I, E> for FlatEdges<I, E>
where
    I: Send + 'static,
    E: Send + 'static,
{
    fn add(&mut self, edge: Edge<I, E>) {
        self.edges.push(edge);
    }

    fn len(&self) -> usize {
        self.edges.len()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &Edge<I, E>> + '_> {
        Box::new(self.edges.iter())
    }

    fn into_edges(self: Box<Self>) -> Vec<Edge<I, E>> {
        self.edges
    }

    fn layout(&self) -> ContainerLayout {
        ContainerLayout::Flat
    }
}

/// Creates an empty container of the given layout.
pub fn new_container<I, E>(layout: ContainerLayout) -> Box<dyn EdgeContainer<I, E>>
where
    I: Send + 'static,
    E: Send + 'static,
{
    match layout {
        ContainerLayout::Chunked => Box::new(ChunkedEdges::new()),
        ContainerLayout::Flat => Box::new(FlatEdges::new()),
    }
}

/// Creates an empty container of the given layout sized for `capacity`
/// edges.
pub fn new_container_with_capacity<I, E>(
    layout: ContainerLayout,
    capacity: usize,
) -> Box<dyn EdgeContainer<I, E>>
where
    I: Send + 'static,
    E: Send + 'static,
{
    match layout {
        // Chunk size is fixed; the hint only matters for the flat layout.
        ContainerLayout::Chunked => Box::new(ChunkedEdges::new()),
        ContainerLayout::Flat => Box::new(FlatEdges::with_capacity(capacity)),
    }
}

/// Converts `container` to the compute representation.
///
/// Returns the input unchanged (same allocation, no copy) when its layout
/// already matches `compute`. Otherwise allocates the compute layout sized
/// to the input's length and moves every edge across in iteration order.
pub fn to_compute<I, E>(
    container: Box<dyn EdgeContainer<I, E>>,
    compute: ContainerLayout,
) -> Box<dyn EdgeContainer<I, E>>
where
    I: Send + 'static,
    E: Send + 'static,
{
    if container.layout() == compute {
        return container;
    }
    let mut out = new_container_with_capacity(compute, container.len());
    for edge in container.into_edges() {
        out.add(edge);
    }
    out
}
