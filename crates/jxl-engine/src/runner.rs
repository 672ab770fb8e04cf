//! Caller-owned parallel execution context
//!
//! A [`ParallelRunner`] wraps a rayon thread pool. It is created once by the
//! application, cloned cheaply, and handed to each encode call; engines use it
//! to split per-row work.

use jxl_core::{JxlError, JxlResult};
use rayon::prelude::*;
use std::sync::Arc;

/// Shared worker pool used by codec engines
#[derive(Debug, Clone)]
pub struct ParallelRunner {
    pool: Arc<rayon::ThreadPool>,
}

impl ParallelRunner {
    /// Pool sized to the host's available parallelism
    pub fn new() -> JxlResult<Self> {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::with_threads(threads)
    }

    /// Pool with exactly `threads` workers
    pub fn with_threads(threads: usize) -> JxlResult<Self> {
        if threads == 0 {
            return Err(JxlError::InvalidParameter(
                "parallel runner needs at least one thread".to_string(),
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("jxl-worker-{}", i))
            .build()
            .map_err(|e| {
                JxlError::InvalidParameter(format!("failed to build worker pool: {}", e))
            })?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Call `f(row_index, row)` for every `row_bytes`-sized row of `dst` in parallel
    ///
    /// A trailing partial row is passed through as well.
    pub fn for_each_row<F>(&self, dst: &mut [u8], row_bytes: usize, f: F)
    where
        F: Fn(usize, &mut [u8]) + Send + Sync,
    {
        if row_bytes == 0 {
            return;
        }
        self.pool.install(|| {
            dst.par_chunks_mut(row_bytes)
                .enumerate()
                .for_each(|(y, row)| f(y, row));
        });
    }
}
