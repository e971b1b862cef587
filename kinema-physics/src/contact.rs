use atomic_refcell::AtomicRefCell;
use glam::Vec3;
use kinema_collision::Collision;
use kinema_core::{BoundedCounter, ConcurrentMap, MapFull, MapKey, Twist};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{body::BodyStorage, BodyIndex, Material, ShapeIndex};

/// Default number of contact slots reserved per shape
pub const CONTACTS_PER_SHAPE: usize = 20;

/// Identifies a contact across steps by the ordered pair of shapes touching
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactKey {
    pub a: ShapeIndex,
    pub b: ShapeIndex,
}

impl ContactKey {
    pub fn new(a: ShapeIndex, b: ShapeIndex) -> Self {
        Self { a, b }
    }
}

impl MapKey for ContactKey {
    fn hash_code(&self) -> i32 {
        (self.a.0 as i32)
            .wrapping_mul(73856093)
            .wrapping_add((self.b.0 as i32).wrapping_mul(19349669))
    }
}

/// Accumulated impulses of a contact, kept for warm starting the next step
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactCache {
    pub normal_impulse: f32,
    pub tangent_impulse: f32,
}

/// Point of contact between the shapes of two different bodies.
///
/// The normal points from the first shape towards the second.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Contact {
    pub shapes: [ShapeIndex; 2],
    pub bodies: [BodyIndex; 2],
    pub point: Vec3,
    pub normal: Vec3,
    pub depth: f32,
    /// Combined material of both shapes
    pub material: Material,
    /// Contact point relative to each body's center of mass
    pub levers: [Vec3; 2],
    pub target_normal_velocity: f32,
    pub normal_mass: f32,
    /// Direction of the sliding velocity, or zero if the contact is not sliding
    pub tangent: Vec3,
    pub tangent_mass: f32,
    /// Accumulated normal impulse, never negative
    pub normal_impulse: f32,
    /// Accumulated friction impulse along `tangent`
    pub tangent_impulse: f32,
}

impl Contact {
    pub fn new(
        shapes: [ShapeIndex; 2],
        bodies: [BodyIndex; 2],
        collision: &Collision,
        material: Material,
        levers: [Vec3; 2],
    ) -> Self {
        Self {
            shapes,
            bodies,
            point: collision.point,
            normal: collision.normal,
            depth: collision.depth,
            material,
            levers,
            ..Default::default()
        }
    }

    pub fn key(&self) -> ContactKey {
        ContactKey::new(self.shapes[0], self.shapes[1])
    }

    pub fn cache(&self) -> ContactCache {
        ContactCache {
            normal_impulse: self.normal_impulse,
            tangent_impulse: self.tangent_impulse,
        }
    }

    pub(crate) fn persist(&mut self, cache: ContactCache) {
        self.normal_impulse = cache.normal_impulse;
        self.tangent_impulse = cache.tangent_impulse;
    }

    /// Total impulse applied to the second body
    pub fn impulse(&self) -> Vec3 {
        self.normal * self.normal_impulse + self.tangent * self.tangent_impulse
    }

    /// Accumulates a normal impulse, keeping the total non-negative.
    ///
    /// Returns the change of the total.
    pub(crate) fn add_normal_impulse(&mut self, impulse: f32) -> f32 {
        let old = self.normal_impulse;
        self.normal_impulse = (old + impulse).max(0.0);
        self.normal_impulse - old
    }

    /// Accumulates a friction impulse.
    ///
    /// The total is only limited by the dynamic friction once it leaves the static friction
    /// cone. Returns the change of the total.
    pub(crate) fn add_tangent_impulse(&mut self, impulse: f32) -> f32 {
        let old = self.tangent_impulse;
        let mut new = old + impulse;

        if new.abs() > self.normal_impulse * self.material.static_friction {
            let limit = self.normal_impulse * self.material.dynamic_friction;
            new = new.clamp(-limit, limit);
        }

        self.tangent_impulse = new;
        new - old
    }
}

/// Impulse of one side of a contact, linked into the list of its body
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub(crate) struct SplitImpulse {
    pub impulse: Twist,
    pub next: Option<u32>,
}

/// A contact together with the impulse each of its bodies receives in the next split pass.
///
/// Split `2 * contact + side` belongs to side `side` of contact `contact`.
#[derive(Default, Debug, Clone, Copy)]
pub(crate) struct ContactSlot {
    pub contact: Contact,
    pub splits: [SplitImpulse; 2],
}

impl ContactSlot {
    /// Sets the split impulses to `impulse` applied to the second body, and its reaction on the
    /// first.
    pub fn set_impulse(&mut self, impulse: Vec3) {
        let levers = self.contact.levers;
        self.splits[0].impulse = Twist::from_impulse(-impulse, levers[0]);
        self.splits[1].impulse = Twist::from_impulse(impulse, levers[1]);
    }
}

/// Fixed capacity contact buffer and the warm starting cache.
#[derive(Debug)]
pub(crate) struct ContactStorage {
    counter: BoundedCounter,
    slots: Vec<AtomicRefCell<ContactSlot>>,
    cache: ConcurrentMap<ContactKey, ContactCache>,
}

impl ContactStorage {
    pub fn new() -> Self {
        Self {
            counter: BoundedCounter::new(0),
            slots: Vec::new(),
            cache: ConcurrentMap::new(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Grows the buffer to hold at least `capacity` contacts.
    ///
    /// The cache is rehashed into a table twice the capacity.
    pub fn reserve(&mut self, capacity: usize) -> Result<(), MapFull> {
        if capacity <= self.slots.len() {
            return Ok(());
        }

        if self.cache.size() < capacity * 2 {
            self.cache.grow(capacity * 2)?;
        }

        self.slots.resize_with(capacity, Default::default);
        self.counter.set_limit(capacity as u32);

        tracing::debug!(capacity, cache = self.cache.size(), "reserved contacts");
        Ok(())
    }

    pub fn reset(&mut self) {
        self.counter.reset();
    }

    pub fn len(&self) -> usize {
        self.counter.get() as usize
    }

    /// Number of contacts refused since the last reset
    pub fn dropped(&self) -> usize {
        self.counter.refused() as usize
    }

    /// Appends a contact and links its split impulses into the lists of both bodies.
    ///
    /// Returns `None` and drops the contact if the buffer is full.
    pub fn push(&self, contact: Contact, bodies: &BodyStorage) -> Option<u32> {
        let index = self.counter.increment()?;

        let mut slot = self.slots[index as usize].borrow_mut();
        slot.contact = contact;
        for (side, body) in contact.bodies.iter().enumerate() {
            let split = 2 * index + side as u32;
            slot.splits[side] = SplitImpulse {
                impulse: Twist::ZERO,
                next: bodies.attach_split(body.index(), split),
            };
        }

        Some(index)
    }

    pub fn slots(&self) -> &[AtomicRefCell<ContactSlot>] {
        &self.slots[..self.len()]
    }

    pub fn slots_mut(&mut self) -> &mut [AtomicRefCell<ContactSlot>] {
        let len = self.len();
        &mut self.slots[..len]
    }

    pub fn slots_with_cache(
        &mut self,
    ) -> (
        &mut [AtomicRefCell<ContactSlot>],
        &ConcurrentMap<ContactKey, ContactCache>,
    ) {
        let len = self.len();
        (&mut self.slots[..len], &self.cache)
    }

    /// Returns the impulse of a split and the next split of the same body
    pub fn split(&self, split: u32) -> SplitImpulse {
        self.slots[(split / 2) as usize].borrow().splits[(split % 2) as usize]
    }

    pub fn get(&self, index: usize) -> Option<Contact> {
        self.slots().get(index).map(|slot| slot.borrow().contact)
    }

    pub fn iter(&self) -> impl Iterator<Item = Contact> + '_ {
        self.slots().iter().map(|slot| slot.borrow().contact)
    }

    pub fn cache(&self) -> &ConcurrentMap<ContactKey, ContactCache> {
        &self.cache
    }
}

impl Clone for ContactStorage {
    fn clone(&self) -> Self {
        Self {
            counter: self.counter.clone(),
            slots: self
                .slots
                .iter()
                .map(|slot| AtomicRefCell::new(*slot.borrow()))
                .collect(),
            cache: self.cache.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.counter = source.counter.clone();
        self.slots.resize_with(source.slots.len(), Default::default);
        for (dst, src) in self.slots.iter_mut().zip(&source.slots) {
            *dst.get_mut() = *src.borrow();
        }

        self.cache = source.cache.clone();
    }
}

#[cfg(test)]
mod tests {
    use glam::vec3;
    use kinema_core::{Transform, Twist};

    use crate::Body;

    use super::*;

    fn contact(material: Material) -> Contact {
        Contact {
            normal: Vec3::Y,
            material,
            ..Default::default()
        }
    }

    #[test]
    fn normal_impulse_is_never_negative() {
        let mut contact = contact(Material::default());

        assert_eq!(contact.add_normal_impulse(2.0), 2.0);
        assert_eq!(contact.add_normal_impulse(-0.5), -0.5);
        assert_eq!(contact.normal_impulse, 1.5);

        // Pulling harder than the accumulated push only releases the contact
        assert_eq!(contact.add_normal_impulse(-4.0), -1.5);
        assert_eq!(contact.normal_impulse, 0.0);
    }

    #[test]
    fn friction_cones() {
        let mut contact = contact(Material::new(0.0, 0.5, 0.25));
        contact.normal_impulse = 4.0;

        // Inside the static cone the impulse is applied in full
        assert_eq!(contact.add_tangent_impulse(-2.0), -2.0);

        // Leaving the static cone clamps to the dynamic cone
        assert_eq!(contact.add_tangent_impulse(-1.0), 1.0);
        assert_eq!(contact.tangent_impulse, -1.0);

        let mut frictionless = self::contact(Material::default());
        frictionless.normal_impulse = 10.0;
        assert_eq!(frictionless.add_tangent_impulse(3.0), 0.0);
    }

    #[test]
    fn key_hash() {
        let key = ContactKey::new(ShapeIndex(1), ShapeIndex(2));
        assert_eq!(key.hash_code(), 73856093 + 2 * 19349669);
        assert_ne!(key, ContactKey::new(ShapeIndex(2), ShapeIndex(1)));
    }

    #[test]
    fn capacity() {
        let mut bodies = BodyStorage::default();
        let a = bodies.push(Body::new(Transform::IDENTITY, Twist::ZERO));
        let b = bodies.push(Body::new(Transform::IDENTITY, Twist::ZERO));

        let mut storage = ContactStorage::new();
        storage.reserve(2).unwrap();
        assert_eq!(storage.capacity(), 2);
        assert!(storage.cache().size() >= 4);

        let contact = Contact {
            bodies: [a, b],
            levers: [Vec3::X, -Vec3::X],
            ..contact(Material::default())
        };

        assert_eq!(storage.push(contact, &bodies), Some(0));
        assert_eq!(storage.push(contact, &bodies), Some(1));
        assert_eq!(storage.push(contact, &bodies), None);
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.dropped(), 1);
        assert_eq!(bodies.contact_count(0), 2);

        // Both contacts are linked into the split list of each body, newest first
        let head = bodies.split_heads[1].get();
        assert_eq!(head, Some(3));
        assert_eq!(storage.split(3).next, Some(1));
        assert_eq!(storage.split(1).next, None);

        let mut slot = *storage.slots()[0].borrow();
        slot.set_impulse(vec3(0.0, 2.0, 0.0));
        assert_eq!(slot.splits[1].impulse.linear, vec3(0.0, 2.0, 0.0));
        assert_eq!(slot.splits[1].impulse.angular, vec3(0.0, 0.0, -2.0));
        assert_eq!(slot.splits[0].impulse, -Twist::from_impulse(vec3(0.0, 2.0, 0.0), Vec3::X));

        storage.reset();
        assert_eq!(storage.len(), 0);
        assert_eq!(storage.dropped(), 0);
    }

    #[test]
    fn overflow_keeps_stored_contacts() {
        let mut bodies = BodyStorage::default();
        let a = bodies.push(Body::new(Transform::IDENTITY, Twist::ZERO));
        let b = bodies.push(Body::new(Transform::IDENTITY, Twist::ZERO));

        let mut storage = ContactStorage::new();
        storage.reserve(2).unwrap();

        let stored = [0.1, 0.2].map(|depth| Contact {
            shapes: [ShapeIndex(0), ShapeIndex(1)],
            bodies: [a, b],
            point: Vec3::splat(depth),
            depth,
            ..contact(Material::new(0.5, 0.2, 0.1))
        });

        for contact in stored {
            storage.push(contact, &bodies).unwrap();
        }

        let before = storage.slots().iter().map(|slot| *slot.borrow()).collect::<Vec<_>>();

        let overflow = Contact {
            depth: 0.3,
            ..stored[0]
        };
        assert_eq!(storage.push(overflow, &bodies), None);
        assert_eq!(storage.push(overflow, &bodies), None);
        assert_eq!(storage.dropped(), 2);

        let after = storage.slots().iter().map(|slot| *slot.borrow()).collect::<Vec<_>>();
        assert_eq!(storage.iter().collect::<Vec<_>>(), stored);
        assert_eq!(after.len(), before.len());
        for (before, after) in before.iter().zip(&after) {
            assert_eq!(before.contact, after.contact);
            assert_eq!(before.splits[0].next, after.splits[0].next);
            assert_eq!(before.splits[1].next, after.splits[1].next);
        }

        // Dropped contacts are not linked into the split lists
        assert_eq!(bodies.contact_count(0), 2);
        assert_eq!(bodies.split_heads[0].get(), Some(2));
    }
}
