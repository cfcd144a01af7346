//! Bounded worker pool for intra-cycle parallelism.
//!
//! Parallel unification and parallel plan bodies run on a rayon pool owned by
//! one agent. Results are always reported in input order, so the winner of
//! [`WorkerPool::first_match`] is the lowest-index match regardless of which
//! worker finished first.

use rayon::prelude::*;

/// A fixed-size rayon thread pool.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    threads: usize,
}

impl WorkerPool {
    /// Build a pool with `threads` workers (at least one).
    pub fn new(threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let threads = threads.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("akh-bdi-worker-{i}"))
            .build()?;
        Ok(Self { pool, threads })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Evaluate `f` over `items` concurrently and return the result of the
    /// lowest-index item for which it yields `Some`.
    pub fn first_match<T, R, F>(&self, items: &[T], f: F) -> Option<R>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &T) -> Option<R> + Sync + Send,
    {
        self.pool
            .install(|| items.par_iter().enumerate().find_map_first(|(i, item)| f(i, item)))
    }

    /// Evaluate `f` over every item concurrently; results keep input order.
    pub fn map_all<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        self.pool.install(|| items.par_iter().map(f).collect())
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn first_match_is_lowest_index() {
        let pool = WorkerPool::new(4).unwrap();
        let items: Vec<i32> = (0..100).collect();
        let found = pool.first_match(&items, |_, x| (*x > 10 && x % 7 == 0).then_some(*x));
        assert_eq!(found, Some(14));
    }

    #[test]
    fn map_all_visits_everything() {
        let pool = WorkerPool::new(2).unwrap();
        let calls = AtomicUsize::new(0);
        let items = vec![1, 2, 3];
        let doubled = pool.map_all(&items, |x| {
            calls.fetch_add(1, Ordering::SeqCst);
            x * 2
        });
        assert_eq!(doubled, vec![2, 4, 6]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn zero_threads_means_one() {
        assert_eq!(WorkerPool::new(0).unwrap().threads(), 1);
    }
}
