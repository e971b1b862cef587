use std::sync::atomic::{AtomicU32, Ordering};

/// Atomic counter that refuses to increment past a limit.
///
/// Used to hand out slots of a fixed capacity buffer from many threads at once. Refused
/// increments are tallied so that overflow can be reported after the fact.
#[derive(Debug)]
pub struct BoundedCounter {
    value: AtomicU32,
    limit: u32,
    refused: AtomicU32,
}

impl BoundedCounter {
    pub fn new(limit: u32) -> Self {
        Self {
            value: AtomicU32::new(0),
            limit,
            refused: AtomicU32::new(0),
        }
    }

    /// Claims the next index, or `None` if the limit is reached
    pub fn increment(&self) -> Option<u32> {
        let limit = self.limit;
        let result = self
            .value
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |value| {
                (value < limit).then_some(value + 1)
            });

        match result {
            Ok(index) => Some(index),
            Err(_) => {
                self.refused.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn get(&self) -> u32 {
        self.value.load(Ordering::Acquire)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of increments refused since the last reset
    pub fn refused(&self) -> u32 {
        self.refused.load(Ordering::Relaxed)
    }

    pub fn reset(&mut self) {
        *self.value.get_mut() = 0;
        *self.refused.get_mut() = 0;
    }

    /// Changes the limit. The current value is clamped to the new limit.
    pub fn set_limit(&mut self, limit: u32) {
        self.limit = limit;
        let value = self.value.get_mut();
        *value = (*value).min(limit);
    }
}

impl Clone for BoundedCounter {
    fn clone(&self) -> Self {
        Self {
            value: AtomicU32::new(self.get()),
            limit: self.limit,
            refused: AtomicU32::new(self.refused()),
        }
    }
}
