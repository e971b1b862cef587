//! Fixed capacity open addressing hash map that supports concurrent insertion and lookup.
//!
//! Slots are claimed with a compare-and-swap from `EMPTY` to `PENDING`, filled, and then
//! published as `OCCUPIED`. Lookups that run into a `PENDING` slot spin until the writer
//! publishes it. Entries are never removed individually, the whole map is cleared between steps.
use std::{
    hint,
    sync::atomic::{AtomicU8, Ordering},
};

use atomic_refcell::AtomicRefCell;

use crate::Executor;

const EMPTY: u8 = 0;
const PENDING: u8 = 1;
const OCCUPIED: u8 = 2;

/// Key of a [`ConcurrentMap`].
pub trait MapKey: Copy + Eq + Default + Send + Sync {
    fn hash_code(&self) -> i32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("No free slot found in concurrent map of size {size}")]
pub struct MapFull {
    pub size: usize,
}

#[derive(Debug)]
struct Slot<K, V> {
    state: AtomicU8,
    entry: AtomicRefCell<(K, V)>,
}

impl<K: Default, V: Default> Default for Slot<K, V> {
    fn default() -> Self {
        Self {
            state: AtomicU8::new(EMPTY),
            entry: AtomicRefCell::default(),
        }
    }
}

/// Iterates the probe sequence for a hash.
///
/// The first index is `hash | 1` reduced modulo the size, each following index steps the hash
/// with a xorshift.
struct Probe {
    hash: i32,
    size: u32,
}

impl Probe {
    fn new(hash: i32, size: usize) -> Self {
        Self {
            hash: hash | 1,
            size: size as u32,
        }
    }
}

impl Iterator for Probe {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let index = (self.hash as u32) % self.size;

        let mut hash = self.hash;
        hash ^= hash << 13;
        hash ^= hash >> 17;
        hash ^= hash << 5;
        self.hash = hash;

        Some(index as usize)
    }
}

#[derive(Debug)]
pub struct ConcurrentMap<K, V> {
    slots: Box<[Slot<K, V>]>,
}

impl<K, V> ConcurrentMap<K, V>
where
    K: MapKey,
    V: Copy + Default + Send + Sync,
{
    /// Creates a map with `size` slots.
    ///
    /// The size should be at least twice the number of entries expected to be stored.
    pub fn new(size: usize) -> Self {
        Self {
            slots: (0..size.max(1)).map(|_| Slot::default()).collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    fn probe(&self, key: &K) -> impl Iterator<Item = usize> {
        // The xorshift sequence eventually visits every residue, but a map that is this
        // crowded is treated as full.
        let limit = self.slots.len().max(16) * 8;
        Probe::new(key.hash_code(), self.slots.len()).take(limit)
    }

    /// Waits for a slot to leave the pending state and returns its settled state
    fn settled_state(slot: &Slot<K, V>) -> u8 {
        loop {
            let state = slot.state.load(Ordering::Acquire);
            if state != PENDING {
                return state;
            }

            hint::spin_loop();
        }
    }

    fn publish(slot: &Slot<K, V>, key: K, value: V) {
        *slot.entry.borrow_mut() = (key, value);
        slot.state.store(OCCUPIED, Ordering::Release);
    }

    fn try_claim(slot: &Slot<K, V>) -> Result<(), u8> {
        slot.state
            .compare_exchange(EMPTY, PENDING, Ordering::Acquire, Ordering::Acquire)
            .map(|_| ())
    }

    /// Inserts an entry into the first free slot of the probe sequence.
    ///
    /// Does not check for an existing entry with the same key.
    pub fn insert(&self, key: K, value: V) -> Result<(), MapFull> {
        for index in self.probe(&key) {
            let slot = &self.slots[index];
            if Self::try_claim(slot).is_ok() {
                Self::publish(slot, key, value);
                return Ok(());
            }
        }

        Err(MapFull { size: self.size() })
    }

    pub fn get(&self, key: &K) -> Option<V> {
        for index in self.probe(key) {
            let slot = &self.slots[index];
            match Self::settled_state(slot) {
                EMPTY => return None,
                _ => {
                    let entry = slot.entry.borrow();
                    if entry.0 == *key {
                        return Some(entry.1);
                    }
                }
            }
        }

        None
    }

    /// Inserts `value` unless an entry with the same key exists.
    ///
    /// Returns `Ok(None)` if the value was inserted, and the existing value otherwise.
    pub fn get_or_insert(&self, key: K, value: V) -> Result<Option<V>, MapFull> {
        for index in self.probe(&key) {
            let slot = &self.slots[index];

            loop {
                match Self::try_claim(slot) {
                    Ok(()) => {
                        Self::publish(slot, key, value);
                        return Ok(None);
                    }
                    Err(PENDING) => hint::spin_loop(),
                    Err(_) => {
                        let entry = slot.entry.borrow();
                        if entry.0 == key {
                            return Ok(Some(entry.1));
                        }

                        break;
                    }
                }
            }
        }

        Err(MapFull { size: self.size() })
    }

    /// Marks every slot as empty
    pub fn clear(&self, executor: &impl Executor) {
        executor.execute(self.slots.len(), |i| {
            self.slots[i].state.store(EMPTY, Ordering::Relaxed)
        });
    }

    /// Iterates all published entries.
    pub fn iter(&self) -> impl Iterator<Item = (K, V)> + '_ {
        self.slots
            .iter()
            .filter(|slot| slot.state.load(Ordering::Acquire) == OCCUPIED)
            .map(|slot| *slot.entry.borrow())
    }

    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.state.load(Ordering::Acquire) == OCCUPIED)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resizes the map to `size` slots, rehashing all entries.
    ///
    /// The map is left untouched if the entries do not fit.
    pub fn grow(&mut self, size: usize) -> Result<(), MapFull> {
        let grown = Self::new(size);
        for (key, value) in self.iter() {
            grown.insert(key, value)?;
        }

        *self = grown;
        Ok(())
    }
}

impl<K, V> Clone for ConcurrentMap<K, V>
where
    K: Copy,
    V: Copy,
{
    fn clone(&self) -> Self {
        let slots = self
            .slots
            .iter()
            .map(|slot| Slot {
                state: AtomicU8::new(slot.state.load(Ordering::Acquire)),
                entry: AtomicRefCell::new(*slot.entry.borrow()),
            })
            .collect();

        Self { slots }
    }
}
