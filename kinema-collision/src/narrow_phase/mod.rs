//! Exact overlap tests between pairs of convex shapes.
//!
//! Every test produces a single contact point, a unit normal pointing from the first shape
//! towards the second, and a non-negative penetration depth along the normal.
mod polyhedron;
mod polyhedron_sphere;
mod sphere;

use glam::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use polyhedron::polyhedron_polyhedron;
pub use polyhedron_sphere::{polyhedron_sphere, sphere_polyhedron};
pub use sphere::sphere_sphere;

use crate::Geometry;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Collision {
    pub point: Vec3,
    pub normal: Vec3,
    pub depth: f32,
}

impl Collision {
    pub fn new(point: Vec3, normal: Vec3, depth: f32) -> Self {
        Self {
            point,
            normal,
            depth,
        }
    }

    /// Swaps the roles of the two shapes
    pub fn flip(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }
}

/// Dispatches to the test for the pair of shape kinds
pub fn collide(a: &Geometry, b: &Geometry) -> Option<Collision> {
    match (a, b) {
        (Geometry::Sphere(a), Geometry::Sphere(b)) => sphere_sphere(a, b),
        (Geometry::Sphere(a), Geometry::Polyhedron(b)) => sphere_polyhedron(a, b),
        (Geometry::Polyhedron(a), Geometry::Sphere(b)) => polyhedron_sphere(a, b),
        (Geometry::Polyhedron(a), Geometry::Polyhedron(b)) => polyhedron_polyhedron(a, b),
    }
}
