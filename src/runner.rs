//! Fixed-size worker pool draining a bounded queue of partition ids.

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crate::types::{EdgeStoreError, PartitionId, Result};

/// Bounded work queue pre-loaded with a fixed set of partition ids.
///
/// The id set is fixed when the drain starts, so the queue never grows;
/// workers poll until it is exhausted and treat `None` as the termination
/// signal, not an error.
pub(crate) struct IdQueue {
    ids: Vec<PartitionId>,
    next: AtomicUsize,
}

impl IdQueue {
    pub(crate) fn new(ids: Vec<PartitionId>) -> Self {
        Self {
            ids,
            next: AtomicUsize::new(0),
        }
    }

    /// Claims the next id. Each id is handed out exactly once.
    pub(crate) fn poll(&self) -> Option<PartitionId> {
        let slot = self.next.fetch_add(1, Ordering::Relaxed);
        self.ids.get(slot).copied()
    }
}

/// Runs `count` copies of `task` on named worker threads and waits for all
/// of them, surfacing the first task failure. A panicking worker is
/// reported as [`EdgeStoreError::WorkerPanic`]; remaining workers still
/// run to completion before the error propagates.
pub(crate) fn run_workers<F>(count: usize, name_prefix: &str, task: F) -> Result<()>
where
    F: Fn(usize) -> Result<()> + Sync,
{
    let count = count.max(1);
    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(count);
        for worker in 0..count {
            let task = &task;
            let handle = thread::Builder::new()
                .name(format!("{name_prefix}-{worker}"))
                .spawn_scoped(scope, move || task(worker))
                .map_err(EdgeStoreError::from)?;
            handles.push(handle);
        }
        let mut first_failure = None;
        for handle in handles {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    if first_failure.is_none() {
                        first_failure = Some(err);
                    }
                }
                Err(panic) => {
                    if first_failure.is_none() {
                        first_failure = Some(EdgeStoreError::WorkerPanic(panic_message(&*panic)));
                    }
                }
            }
        }
        first_failure.map_or(Ok(()), Err)
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
