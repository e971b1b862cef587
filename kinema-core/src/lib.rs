//! Foundation of the kinema physics kernel.
//!
//! Contains the math types shared by all layers, the [`Executor`] abstraction through which every
//! simulation phase is dispatched, and the lock-free building blocks the phases use to
//! communicate: a concurrent hash map, intrusive linked lists and a bounded counter.
mod counter;
mod device;
mod executor;
pub mod list;
mod map;
pub mod math;
mod time;

pub use counter::BoundedCounter;
pub use device::{DeviceConfig, DeviceContext, DeviceError, DeviceExecutor};
pub use executor::{Executor, ParallelExecutor, SequentialExecutor};
pub use list::Link;
pub use map::{ConcurrentMap, MapFull, MapKey};
pub use math::{Transform, Twist};
pub use time::Stopwatch;

pub use glam;
