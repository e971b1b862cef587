//! Lane based device backend.
//!
//! This is a host side emulation of an accelerator: the lanes run on CPU threads of a dedicated
//! rayon pool, nothing is offloaded to a GPU.
//!
//! A [`DeviceContext`] owns its own worker pool and dispatches operations in fixed width
//! workgroups, one lane per index. Each dispatch is submitted and waited on before returning.
//! Operations are required to be `Send + Sync` so that everything they capture can be handed
//! over to the device workers.
use std::sync::atomic::{AtomicU64, Ordering};

use rayon::prelude::*;

use crate::Executor;

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Device lane count must be non-zero")]
    InvalidLaneCount,
    #[error("Failed to create device workers")]
    Workers(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Number of lanes in a single workgroup
    pub lanes: usize,
    /// Number of workers executing workgroups
    pub workers: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            lanes: 64,
            workers: std::thread::available_parallelism()
                .map(|v| v.get())
                .unwrap_or(4),
        }
    }
}

/// Explicit handle to a device, passed by reference to whatever dispatches work on it.
#[derive(Debug)]
pub struct DeviceContext {
    pool: rayon::ThreadPool,
    lanes: usize,
    dispatches: AtomicU64,
}

impl DeviceContext {
    pub fn new(config: DeviceConfig) -> Result<Self, DeviceError> {
        if config.lanes == 0 {
            return Err(DeviceError::InvalidLaneCount);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("kinema-device-{i}"))
            .build()?;

        tracing::info!(
            lanes = config.lanes,
            workers = pool.current_num_threads(),
            "created device context"
        );

        Ok(Self {
            pool,
            lanes: config.lanes,
            dispatches: AtomicU64::new(0),
        })
    }

    pub fn executor(&self) -> DeviceExecutor<'_> {
        DeviceExecutor { context: self }
    }

    pub fn lanes(&self) -> usize {
        self.lanes
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Returns the number of dispatches submitted to this device
    pub fn dispatch_count(&self) -> u64 {
        self.dispatches.load(Ordering::Relaxed)
    }

    fn submit(&self, f: impl FnOnce() + Send) {
        self.dispatches.fetch_add(1, Ordering::Relaxed);
        self.pool.install(f)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeviceExecutor<'a> {
    context: &'a DeviceContext,
}

impl DeviceExecutor<'_> {
    pub fn context(&self) -> &DeviceContext {
        self.context
    }
}

impl Executor for DeviceExecutor<'_> {
    fn execute<F>(&self, count: usize, op: F)
    where
        F: Fn(usize) + Sync + Send,
    {
        if count == 0 {
            return;
        }

        let lanes = self.context.lanes;
        self.context.submit(|| {
            (0..count.div_ceil(lanes))
                .into_par_iter()
                .for_each(|group| {
                    let start = group * lanes;
                    (start..(start + lanes).min(count)).for_each(&op)
                })
        })
    }

    fn execute_mut<T, F>(&self, items: &mut [T], op: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync + Send,
    {
        if items.is_empty() {
            return;
        }

        let lanes = self.context.lanes;
        self.context.submit(|| {
            items
                .par_chunks_mut(lanes)
                .enumerate()
                .for_each(|(group, chunk)| {
                    for (lane, item) in chunk.iter_mut().enumerate() {
                        op(group * lanes + lane, item)
                    }
                })
        })
    }
}
