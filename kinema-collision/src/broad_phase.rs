//! Multi level hash grid broad phase.
//!
//! Every object is assigned a size level such that its extents are smaller than the cell size
//! `2^level` of that level. The object is then inserted into the single cell of its level which
//! contains its lower corner, and cells are chained into lists of objects ordered by index,
//! independent of how the insertion was scheduled. To find all
//! overlapping pairs, each object scans the neighbourhood of its bound on its own level and on
//! every coarser level that is occupied.
use std::sync::atomic::{AtomicBool, Ordering};

use glam::{IVec3, Vec3};
use kinema_core::{list, ConcurrentMap, Executor, Link, MapKey};
use smallvec::SmallVec;

use crate::Bound;

/// Number of size levels
pub const LEVEL_COUNT: usize = 32;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridKey {
    pub cell: IVec3,
    pub level: i32,
}

impl GridKey {
    pub fn new(point: Vec3, level: u32) -> Self {
        Self {
            cell: cell_index(point, level),
            level: level as i32,
        }
    }
}

impl MapKey for GridKey {
    fn hash_code(&self) -> i32 {
        self.cell
            .x
            .wrapping_mul(73856093)
            .wrapping_add(self.cell.y.wrapping_mul(19349669))
            .wrapping_add(self.cell.z.wrapping_mul(83492791))
            .wrapping_add(self.level.wrapping_mul(49979539))
    }
}

/// Binary exponent of a positive finite float
fn exponent(value: f32) -> i32 {
    ((value.to_bits() >> 23) & 0xff) as i32 - 127
}

/// Returns the level whose cells are larger than the bound in every dimension
pub fn size_level(bound: &Bound) -> u32 {
    let extent = bound.extents().max_element().max(0.0);
    (1 + exponent(extent + 1.0)).clamp(0, LEVEL_COUNT as i32 - 1) as u32
}

/// Index of the cell containing `point` at `level`
pub fn cell_index(point: Vec3, level: u32) -> IVec3 {
    let scale = (-(level as f32)).exp2();
    (point * scale).floor().as_ivec3()
}

#[derive(Default, Debug, Clone, Copy)]
struct GridObject {
    bound: Bound,
    level: u32,
    key: GridKey,
}

#[derive(Debug)]
pub struct DynamicGrid {
    objects: Vec<GridObject>,
    links: Vec<Link>,
    /// Settled head of each cell, indexed by the object which claimed the cell
    heads: Vec<Link>,
    occupied: [AtomicBool; LEVEL_COUNT],
    /// Maps each cell to the object which claimed it
    cells: ConcurrentMap<GridKey, u32>,
}

impl DynamicGrid {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            links: Vec::new(),
            heads: Vec::new(),
            occupied: std::array::from_fn(|_| AtomicBool::new(false)),
            cells: ConcurrentMap::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Sets the number of tracked objects.
    ///
    /// The cell table is only ever grown, and its content is discarded.
    pub fn resize(&mut self, object_count: usize) {
        self.objects.resize(object_count, GridObject::default());
        self.links.resize_with(object_count, Link::new);
        self.heads.resize_with(object_count, Link::new);

        if self.cells.size() < object_count * 2 {
            self.cells = ConcurrentMap::new(object_count * 2);
        }
    }

    /// Removes all objects from their cells
    pub fn clear(&mut self, executor: &impl Executor) {
        for level in &mut self.occupied {
            *level.get_mut() = false;
        }

        self.cells.clear(executor);
    }

    /// Inserts every object into the cell of its size level.
    ///
    /// Runs in three passes. The first claims each occupied cell for one of its objects, the
    /// second links the remaining objects of the cell after the claiming object, and the third
    /// settles every chain into ascending index order. The chains are thereby the same for every
    /// executor and schedule.
    pub fn update<E, F>(&mut self, executor: &E, bound: F)
    where
        E: Executor,
        F: Fn(usize) -> Bound + Sync + Send,
    {
        let Self {
            objects,
            links,
            heads,
            occupied,
            cells,
        } = self;

        executor.execute_mut(objects, |i, object| {
            let value = bound(i);
            let level = size_level(&value);
            *object = GridObject {
                bound: value,
                level,
                key: GridKey::new(value.lower, level),
            };

            occupied[level as usize].store(true, Ordering::Relaxed);
            links[i].set(None);
            heads[i].set(None);

            if let Err(err) = cells.get_or_insert(object.key, i as u32) {
                tracing::error!(object = i, "failed to insert object into grid: {err}");
            }
        });

        let objects = &*objects;
        executor.execute(objects.len(), |i| match cells.get(&objects[i].key) {
            Some(claimer) if claimer as usize != i => {
                let next = links[claimer as usize].push(i as u32);
                links[i].set(next);
            }
            _ => {}
        });

        executor.execute(objects.len(), |i| {
            if cells.get(&objects[i].key) != Some(i as u32) {
                return;
            }

            let mut members = list::walk(Some(i as u32), |v| links[v as usize].get())
                .collect::<SmallVec<[u32; 16]>>();
            members.sort_unstable();

            for pair in members.windows(2) {
                links[pair[0] as usize].set(Some(pair[1]));
            }

            if let Some(&last) = members.last() {
                links[last as usize].set(None);
            }

            heads[i].set(members.first().copied());
        });
    }

    /// First object of the chain of a cell
    fn head(&self, key: &GridKey) -> Option<u32> {
        let claimer = self.cells.get(key)?;
        self.heads[claimer as usize].get()
    }

    pub fn bound(&self, index: usize) -> Bound {
        self.objects[index].bound
    }

    /// Invokes `callback(a, b)` once for every pair of objects with intersecting bounds.
    pub fn detect<E, F>(&self, executor: &E, callback: F)
    where
        E: Executor,
        F: Fn(usize, usize) + Sync + Send,
    {
        executor.execute(self.objects.len(), |i| self.detect_object(i, &callback));
    }

    fn detect_object(&self, index: usize, callback: &impl Fn(usize, usize)) {
        let object = &self.objects[index];

        for level in object.level..LEVEL_COUNT as u32 {
            if !self.occupied[level as usize].load(Ordering::Relaxed) {
                continue;
            }

            let lower = cell_index(object.bound.lower, level).saturating_sub(IVec3::ONE);
            let upper = cell_index(object.bound.upper, level);

            for x in lower.x..=upper.x {
                for y in lower.y..=upper.y {
                    for z in lower.z..=upper.z {
                        let key = GridKey {
                            cell: IVec3::new(x, y, z),
                            level: level as i32,
                        };

                        let Some(head) = self.head(&key) else {
                            continue;
                        };

                        for other in list::walk(Some(head), |v| self.links[v as usize].get()) {
                            let other = other as usize;
                            if (level > object.level || other > index)
                                && object.bound.intersects(&self.objects[other].bound)
                            {
                                callback(index, other)
                            }
                        }
                    }
                }
            }
        }
    }
}

impl Default for DynamicGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DynamicGrid {
    fn clone(&self) -> Self {
        Self {
            objects: self.objects.clone(),
            links: self.links.clone(),
            heads: self.heads.clone(),
            occupied: std::array::from_fn(|i| {
                AtomicBool::new(self.occupied[i].load(Ordering::Relaxed))
            }),
            cells: self.cells.clone(),
        }
    }
}
