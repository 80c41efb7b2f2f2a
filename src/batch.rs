//! Decoded-batch contract between wire decoders and the edge store.

use crate::container::Edge;

/// A decoded view over one incoming transfer: a sequence of
/// (vertex id, edge) pairs destined for a single partition.
///
/// Implementations are free to reuse internal buffers between [`advance`]
/// calls, so the `current_*` borrows are only valid until the next
/// `advance`. The `release_*` methods transfer ownership of a stable copy
/// of the current objects to the caller; the store relies on this when it
/// needs an id or edge to outlive the batch.
///
/// Calling a `current_*` or `release_*` method before the first `advance`,
/// after `advance` returned `false`, or after the matching `release_*`
/// already ran is a contract violation and panics.
///
/// [`advance`]: EdgeReader::advance
pub trait EdgeReader<I, E> {
    /// Advances to the next pair. Returns `false` once the batch is
    /// exhausted.
    fn advance(&mut self) -> bool;

    /// Borrows the current vertex id. May point into a reused buffer.
    fn current_vertex_id(&self) -> &I;

    /// Borrows the current edge.
    fn current_edge(&self) -> &Edge<I, E>;

    /// Takes ownership of a stable copy of the current vertex id.
    fn release_vertex_id(&mut self) -> I;

    /// Takes ownership of the current edge.
    fn release_edge(&mut self) -> Edge<I, E>;
}

/// [`EdgeReader`] over an owned, already-decoded list of pairs.
///
/// Used by in-process producers and tests. Every pair is individually
/// owned, so `release_*` is a move, never a copy.
pub struct VecEdgeReader<I, E> {
    pairs: std::vec::IntoIter<(I, Edge<I, E>)>,
    current_id: Option<I>,
    current_edge: Option<Edge<I, E>>,
}

impl<I, E> VecEdgeReader<I, E> {
    /// Wraps an already-decoded list of (vertex id, edge) pairs.
    pub fn new(pairs: Vec<(I, Edge<I, E>)>) -> Self {
        Self {
            pairs: pairs.into_iter(),
            current_id: None,
            current_edge: None,
        }
    }
}

impl<I, E> EdgeReader<I, E> for VecEdgeReader<I, E> {
    fn advance(&mut self) -> bool {
        match self.pairs.next() {
            Some((id, edge)) => {
                self.current_id = Some(id);
                self.current_edge = Some(edge);
                true
            }
            None => {
                self.current_id = None;
                self.current_edge = None;
                false
            }
        }
    }

    fn current_vertex_id(&self) -> &I {
        self.current_id.as_ref().expect("no current vertex id")
    }

    fn current_edge(&self) -> &Edge<I, E> {
        self.current_edge.as_ref().expect("no current edge")
    }

    fn release_vertex_id(&mut self) -> I {
        self.current_id.take().expect("no current vertex id")
    }

    fn release_edge(&mut self) -> Edge<I, E> {
        self.current_edge.take().expect("no current edge")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_walks_pairs_in_order() {
        let mut reader = VecEdgeReader::new(vec![
            (1u64, Edge::new(2u64, "a")),
            (1, Edge::new(3, "b")),
            (4, Edge::new(5, "c")),
        ]);
        let mut seen = Vec::new();
        while reader.advance() {
            let id = *reader.current_vertex_id();
            let edge = reader.release_edge();
            seen.push((id, edge.target, edge.value));
        }
        assert_eq!(seen, vec![(1, 2, "a"), (1, 3, "b"), (4, 5, "c")]);
        assert!(!reader.advance());
    }

    #[test]
    fn release_order_is_independent() {
        let mut reader = VecEdgeReader::new(vec![(7u64, Edge::new(8u64, 9u32))]);
        assert!(reader.advance());
        let edge = reader.release_edge();
        let id = reader.release_vertex_id();
        assert_eq!((id, edge.target, edge.value), (7, 8, 9));
    }

    #[test]
    #[should_panic(expected = "no current vertex id")]
    fn current_before_advance_panics() {
        let reader: VecEdgeReader<u64, u32> = VecEdgeReader::new(Vec::new());
        let _ = reader.current_vertex_id();
    }
}
