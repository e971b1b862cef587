//! Intrusive singly-linked lists over index arenas.
//!
//! Nodes are identified by `u32` indices into some external storage, each owning a [`Link`] to
//! its successor. New nodes are pushed directly after an existing link with a CAS loop, which
//! allows any number of threads to grow the same list concurrently.
use std::sync::atomic::{AtomicU32, Ordering};

const NONE: u32 = u32::MAX;

#[inline]
fn decode(value: u32) -> Option<u32> {
    (value != NONE).then_some(value)
}

#[inline]
fn encode(value: Option<u32>) -> u32 {
    value.unwrap_or(NONE)
}

/// Atomic link to the next node of a list, or the head of a list.
#[derive(Debug)]
pub struct Link(AtomicU32);

impl Link {
    pub const fn new() -> Self {
        Self(AtomicU32::new(NONE))
    }

    pub fn get(&self) -> Option<u32> {
        decode(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, node: Option<u32>) {
        self.0.store(encode(node), Ordering::Release)
    }

    pub fn clear(&mut self) {
        *self.0.get_mut() = NONE;
    }

    /// Links `node` directly after this link.
    ///
    /// Returns the previous successor, which the caller stores as the successor of `node`.
    pub fn push(&self, node: u32) -> Option<u32> {
        debug_assert_ne!(node, NONE);

        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            match self
                .0
                .compare_exchange_weak(current, node, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(previous) => return decode(previous),
                Err(actual) => current = actual,
            }
        }
    }
}

impl Default for Link {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Link {
    fn clone(&self) -> Self {
        Self(AtomicU32::new(self.0.load(Ordering::Acquire)))
    }
}

/// Walks a list starting at `first`, using `next` to look up each node's successor
pub fn walk<F>(first: Option<u32>, next: F) -> impl Iterator<Item = u32>
where
    F: Fn(u32) -> Option<u32>,
{
    std::iter::successors(first, move |&node| next(node))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::{Executor, ParallelExecutor};

    use super::*;

    #[test]
    fn push_after_head() {
        let links = (0..4).map(|_| Link::new()).collect::<Vec<_>>();

        // 0 is the head, 1..4 are pushed after it
        for node in 1..4 {
            let previous = links[0].push(node);
            links[node as usize].set(previous);
        }

        let nodes = walk(Some(0), |node| links[node as usize].get()).collect::<Vec<_>>();
        assert_eq!(nodes, [0, 3, 2, 1]);
    }

    #[test]
    fn concurrent_push() {
        let head = Link::new();
        let links = (0..1000).map(|_| Link::new()).collect::<Vec<_>>();

        ParallelExecutor::new().execute(links.len(), |i| {
            let previous = head.push(i as u32);
            links[i].set(previous);
        });

        let nodes = walk(head.get(), |node| links[node as usize].get()).collect::<Vec<_>>();
        assert_eq!(nodes.len(), 1000);
        assert_eq!(
            nodes.iter().copied().collect::<BTreeSet<_>>(),
            (0..1000).collect::<BTreeSet<u32>>()
        );
    }

    #[test]
    fn empty() {
        let mut head = Link::new();
        assert_eq!(head.get(), None);
        assert_eq!(head.push(7), None);
        assert_eq!(head.get(), Some(7));
        head.clear();
        assert_eq!(walk(head.get(), |_| None).count(), 0);
    }
}
