//! Configuration options for the edge store.

use std::sync::Arc;
use std::thread;

use crate::container::ContainerLayout;
use crate::metrics::IngestMetrics;

/// Configuration options supplied when constructing an
/// [`EdgeStore`](crate::EdgeStore).
#[derive(Clone)]
pub struct StoreOptions {
    /// Container layout used while edges stream in.
    pub input_layout: ContainerLayout,
    /// Container layout handed to vertices for the compute phase.
    pub compute_layout: ContainerLayout,
    /// Whether batch decoders reuse their edge buffers between reads.
    /// When true the store clones the current edge; when false it takes
    /// ownership directly from the decoder.
    pub reuse_edge_objects: bool,
    /// Number of parallel workers used by the drain phase.
    pub move_threads: usize,
    /// Initial capacity hint for the staging maps.
    pub stage_capacity: usize,
    /// Optional metrics sink.
    pub metrics: Option<Arc<dyn IngestMetrics>>,
}

impl StoreOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self {
            input_layout: ContainerLayout::Chunked,
            compute_layout: ContainerLayout::Flat,
            reuse_edge_objects: false,
            move_threads: thread::available_parallelism().map_or(1, |n| n.get()),
            stage_capacity: 16,
            metrics: None,
        }
    }

    /// Sets the container layout used during input.
    pub fn input_layout(mut self, layout: ContainerLayout) -> Self {
        self.input_layout = layout;
        self
    }

    /// Sets the container layout handed to vertices for computation.
    pub fn compute_layout(mut self, layout: ContainerLayout) -> Self {
        self.compute_layout = layout;
        self
    }

    /// Declares whether batch decoders reuse their edge buffers.
    pub fn reuse_edge_objects(mut self, reuse: bool) -> Self {
        self.reuse_edge_objects = reuse;
        self
    }

    /// Sets the number of parallel drain workers.
    pub fn move_threads(mut self, threads: usize) -> Self {
        self.move_threads = threads.max(1);
        self
    }

    /// Sets the initial capacity hint for the staging maps.
    pub fn stage_capacity(mut self, capacity: usize) -> Self {
        self.stage_capacity = capacity;
        self
    }

    /// Sets the metrics sink.
    pub fn metrics(mut self, metrics: Arc<dyn IngestMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::new()
    }
}
