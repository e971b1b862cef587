use std::{
    fmt::Display,
    ops::Mul,
    sync::atomic::{AtomicU32, Ordering},
};

use glam::{Mat3, Vec3};
use kinema_collision::MassProperties;
use kinema_core::{math::integrate_rotation, Executor, Link, Transform, Twist};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable handle of a body within a [`World`](crate::World)
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyIndex(pub u32);

impl BodyIndex {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for BodyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Inverse of the linear mass and of the world space inertia tensor.
///
/// Zero for immovable bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InverseMass {
    pub linear: f32,
    pub angular: Mat3,
}

impl InverseMass {
    pub const ZERO: Self = Self {
        linear: 0.0,
        angular: Mat3::ZERO,
    };

    /// Inverse mass seen by an impulse along `direction` applied at `lever`
    #[inline]
    pub fn effective(&self, lever: Vec3, direction: Vec3) -> f32 {
        let arm = lever.cross(direction);
        self.linear + arm.dot(self.angular * arm)
    }

    pub fn is_static(&self) -> bool {
        self.linear == 0.0
    }
}

impl Default for InverseMass {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Mul<Twist> for InverseMass {
    type Output = Twist;

    fn mul(self, impulse: Twist) -> Twist {
        Twist::new(impulse.linear * self.linear, self.angular * impulse.angular)
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Body {
    /// Placement of the body's local frame.
    ///
    /// During a step the position is temporarily moved to the center of mass.
    pub transform: Transform,
    pub velocity: Twist,
    /// Combined mass of all attached shapes, in the local frame
    pub mass: MassProperties,
    pub inverse_mass: InverseMass,
}

impl Body {
    pub fn new(transform: Transform, velocity: Twist) -> Self {
        Self {
            transform,
            velocity,
            mass: MassProperties::ZERO,
            inverse_mass: InverseMass::ZERO,
        }
    }

    /// World space position of the center of mass
    pub fn center_of_mass(&self) -> Vec3 {
        self.transform.transform_point(self.mass.centroid)
    }

    pub fn is_static(&self) -> bool {
        self.mass.mass == 0.0
    }

    /// Refreshes the inverse mass for the current orientation and moves the position to the
    /// center of mass.
    ///
    /// A zero mass or a singular inertia tensor leaves the corresponding inverse untouched.
    pub(crate) fn begin_step(&mut self) {
        if self.mass.mass != 0.0 {
            self.inverse_mass.linear = 1.0 / self.mass.mass;
        }

        if self.mass.inertia.determinant() != 0.0 {
            self.inverse_mass.angular =
                self.transform.transform_tensor(self.mass.inertia.inverse());
        }

        self.transform.position += self.transform.transform_vector(self.mass.centroid);
    }

    pub(crate) fn apply_gravity(&mut self, gravity: Twist, dt: f32) {
        if !self.inverse_mass.is_static() {
            self.velocity += gravity * dt;
        }
    }

    /// Integrates the velocity around the center of mass and moves the position back to the
    /// local frame origin.
    pub(crate) fn end_step(&mut self, dt: f32) {
        let transform = &mut self.transform;
        transform.position += self.velocity.linear * dt;
        transform.rotation = integrate_rotation(transform.rotation, self.velocity.angular, dt);
        transform.position -= transform.transform_vector(self.mass.centroid);
    }
}

/// Bodies together with the per step contact bookkeeping.
#[derive(Default, Debug)]
pub(crate) struct BodyStorage {
    pub bodies: Vec<Body>,
    /// Number of contacts touching each body this step
    pub contact_counts: Vec<AtomicU32>,
    /// Head of the list of split impulses acting on each body
    pub split_heads: Vec<Link>,
}

impl BodyStorage {
    pub fn push(&mut self, body: Body) -> BodyIndex {
        let index = BodyIndex(self.bodies.len() as u32);
        self.bodies.push(body);
        self.contact_counts.push(AtomicU32::new(0));
        self.split_heads.push(Link::new());
        index
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn get(&self, index: BodyIndex) -> Option<&Body> {
        self.bodies.get(index.index())
    }

    pub fn contact_count(&self, index: usize) -> u32 {
        self.contact_counts[index].load(Ordering::Acquire)
    }

    /// Registers split impulse `split` of a new contact on `body`
    pub fn attach_split(&self, body: usize, split: u32) -> Option<u32> {
        self.contact_counts[body].fetch_add(1, Ordering::AcqRel);
        self.split_heads[body].push(split)
    }

    pub fn reset_contacts(&mut self, executor: &impl Executor) {
        executor.execute_mut(&mut self.contact_counts, |_, count| *count.get_mut() = 0);
        executor.execute_mut(&mut self.split_heads, |_, head| head.clear());
    }
}

impl Clone for BodyStorage {
    fn clone(&self) -> Self {
        Self {
            bodies: self.bodies.clone(),
            contact_counts: self
                .contact_counts
                .iter()
                .map(|v| AtomicU32::new(v.load(Ordering::Acquire)))
                .collect(),
            split_heads: self.split_heads.clone(),
        }
    }
}
