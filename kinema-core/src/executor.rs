//! Index-parallel execution of simulation phases.
//!
//! Every phase of a step is expressed as an operation over `0..count`. The operation may only
//! mutate state disjoint per index, or shared state through atomics. Executors give no ordering
//! guarantees between indices, but the call returns only once every index has run, so program
//! order acts as a barrier between consecutive phases.
use rayon::prelude::*;

pub trait Executor: Sync {
    /// Runs `op(i)` for every `i` in `0..count`
    fn execute<F>(&self, count: usize, op: F)
    where
        F: Fn(usize) + Sync + Send;

    /// Runs `op(i, &mut items[i])` for every item.
    fn execute_mut<T, F>(&self, items: &mut [T], op: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync + Send;
}

/// Runs every index in ascending order on the calling thread.
#[derive(Default, Debug, Clone, Copy)]
pub struct SequentialExecutor;

impl Executor for SequentialExecutor {
    fn execute<F>(&self, count: usize, op: F)
    where
        F: Fn(usize) + Sync + Send,
    {
        (0..count).for_each(op)
    }

    fn execute_mut<T, F>(&self, items: &mut [T], op: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync + Send,
    {
        items
            .iter_mut()
            .enumerate()
            .for_each(|(i, item)| op(i, item))
    }
}

/// Distributes indices over a rayon thread pool.
///
/// Uses the global pool unless constructed through [`ParallelExecutor::with_threads`].
#[derive(Default, Debug)]
pub struct ParallelExecutor {
    pool: Option<rayon::ThreadPool>,
}

impl ParallelExecutor {
    pub fn new() -> Self {
        Self { pool: None }
    }

    /// Creates an executor with a dedicated pool of `threads` workers
    pub fn with_threads(threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("kinema-worker-{i}"))
            .build()?;

        Ok(Self { pool: Some(pool) })
    }

    pub fn thread_count(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    fn install<R, F>(&self, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }
}

impl Executor for ParallelExecutor {
    fn execute<F>(&self, count: usize, op: F)
    where
        F: Fn(usize) + Sync + Send,
    {
        self.install(|| (0..count).into_par_iter().for_each(&op))
    }

    fn execute_mut<T, F>(&self, items: &mut [T], op: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync + Send,
    {
        self.install(|| {
            items
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, item)| op(i, item))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::{DeviceConfig, DeviceContext};

    use super::*;

    fn visits_every_index(executor: &impl Executor) {
        let counts = (0..1000).map(|_| AtomicU32::new(0)).collect::<Vec<_>>();
        executor.execute(counts.len(), |i| {
            counts[i].fetch_add(1, Ordering::Relaxed);
        });

        assert!(counts.iter().all(|v| v.load(Ordering::Relaxed) == 1));

        let mut items = vec![0usize; 777];
        executor.execute_mut(&mut items, |i, item| *item = i * 2);
        assert!(items.iter().enumerate().all(|(i, &v)| v == i * 2));

        executor.execute(0, |_| panic!("no indices to run"));
    }

    #[test]
    fn sequential() {
        visits_every_index(&SequentialExecutor);

        let order = std::sync::Mutex::new(Vec::new());
        SequentialExecutor.execute(5, |i| order.lock().unwrap().push(i));
        assert_eq!(order.into_inner().unwrap(), [0, 1, 2, 3, 4]);
    }

    #[test]
    fn parallel() {
        visits_every_index(&ParallelExecutor::new());

        let executor = ParallelExecutor::with_threads(3).unwrap();
        assert_eq!(executor.thread_count(), 3);
        visits_every_index(&executor);
    }

    #[test]
    fn device() {
        let context = DeviceContext::new(DeviceConfig {
            lanes: 64,
            workers: 2,
        })
        .unwrap();

        visits_every_index(&context.executor());
    }
}
