// src/utils/threads.rs

//! A fixed-size worker pool for the block and entropy stages.
//!
//! Every helper here is order-preserving: chunk `i` of the input always maps
//! to slot `i` of the output, so a stage produces the same result whether it
//! runs on one worker or many. With the `rayon` feature disabled the helpers
//! run the same closures sequentially on the calling thread.

use crate::utils::error::{CodecError, Result};
use log::debug;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// A pool of `workers` threads dedicated to one compress/decompress call.
pub struct WorkerPool {
    workers: usize,
    #[cfg(feature = "rayon")]
    pool: rayon::ThreadPool,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .finish()
    }
}

impl WorkerPool {
    /// Creates a pool with exactly `workers` threads.
    ///
    /// Fails fast with `InvalidArgument` when `workers` is zero.
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(CodecError::invalid_arg(
                "worker count must be a positive integer",
            ));
        }

        #[cfg(feature = "rayon")]
        {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("dct-codec-{}", i))
                .build()?;
            debug!("Started worker pool with {} threads", workers);
            Ok(WorkerPool { workers, pool })
        }

        #[cfg(not(feature = "rayon"))]
        {
            debug!(
                "rayon disabled; {} requested workers run sequentially",
                workers
            );
            Ok(WorkerPool { workers })
        }
    }

    /// Number of workers this pool was built with.
    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Length of each contiguous chunk when `len` items are split into at
    /// most `workers` pieces. Never zero.
    pub fn chunk_len_for(&self, len: usize) -> usize {
        len.div_ceil(self.workers).max(1)
    }

    /// Applies `f` to every chunk and returns the results in chunk order.
    pub fn map_chunks<T, R, F>(&self, data: &[T], chunk_len: usize, f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &[T]) -> R + Sync + Send,
    {
        let chunk_len = chunk_len.max(1);

        #[cfg(feature = "rayon")]
        {
            self.pool.install(|| {
                data.par_chunks(chunk_len)
                    .enumerate()
                    .map(|(i, chunk)| f(i, chunk))
                    .collect()
            })
        }

        #[cfg(not(feature = "rayon"))]
        {
            data.chunks(chunk_len)
                .enumerate()
                .map(|(i, chunk)| f(i, chunk))
                .collect()
        }
    }

    /// Like [`map_chunks`](Self::map_chunks) for fallible work. Any failing
    /// chunk fails the whole call; no partial output escapes.
    pub fn try_map_chunks<T, R, F>(&self, data: &[T], chunk_len: usize, f: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &[T]) -> Result<R> + Sync + Send,
    {
        let chunk_len = chunk_len.max(1);

        #[cfg(feature = "rayon")]
        {
            self.pool.install(|| {
                data.par_chunks(chunk_len)
                    .enumerate()
                    .map(|(i, chunk)| f(i, chunk))
                    .collect()
            })
        }

        #[cfg(not(feature = "rayon"))]
        {
            data.chunks(chunk_len)
                .enumerate()
                .map(|(i, chunk)| f(i, chunk))
                .collect()
        }
    }

    /// Hands each disjoint mutable chunk to `f` together with its index.
    pub fn for_each_chunk_mut<T, F>(&self, data: &mut [T], chunk_len: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync + Send,
    {
        let chunk_len = chunk_len.max(1);

        #[cfg(feature = "rayon")]
        {
            self.pool.install(|| {
                data.par_chunks_mut(chunk_len)
                    .enumerate()
                    .for_each(|(i, chunk)| f(i, chunk));
            })
        }

        #[cfg(not(feature = "rayon"))]
        {
            data.chunks_mut(chunk_len)
                .enumerate()
                .for_each(|(i, chunk)| f(i, chunk));
        }
    }

    /// Folds every chunk into a local accumulator and merges the
    /// accumulators once at the end. `merge` must be associative.
    pub fn fold_chunks<T, A, I, F, M>(
        &self,
        data: &[T],
        chunk_len: usize,
        identity: I,
        fold: F,
        merge: M,
    ) -> A
    where
        T: Sync,
        A: Send,
        I: Fn() -> A + Sync + Send,
        F: Fn(A, &[T]) -> A + Sync + Send,
        M: Fn(A, A) -> A + Sync + Send,
    {
        let chunk_len = chunk_len.max(1);

        #[cfg(feature = "rayon")]
        {
            self.pool.install(|| {
                data.par_chunks(chunk_len)
                    .map(|chunk| fold(identity(), chunk))
                    .reduce(&identity, &merge)
            })
        }

        #[cfg(not(feature = "rayon"))]
        {
            data.chunks(chunk_len)
                .map(|chunk| fold(identity(), chunk))
                .fold(identity(), &merge)
        }
    }
}
