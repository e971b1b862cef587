use glam::Vec3;
use kinema_core::Transform;

use crate::{Bound, Polyhedron, ShapeProperties, Sphere};

/// Convex geometry of a shape, in both local and world space
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Sphere(Sphere),
    Polyhedron(Polyhedron),
}

impl Geometry {
    /// Recomputes the world space form from the transform of the owning body
    pub fn update(&mut self, transform: &Transform) {
        match self {
            Geometry::Sphere(v) => v.update(transform),
            Geometry::Polyhedron(v) => v.update(transform),
        }
    }

    pub fn bound(&self) -> Bound {
        match self {
            Geometry::Sphere(v) => v.bound(),
            Geometry::Polyhedron(v) => v.bound(),
        }
    }

    pub fn properties(&self) -> ShapeProperties {
        match self {
            Geometry::Sphere(v) => v.properties(),
            Geometry::Polyhedron(v) => v.properties(),
        }
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        match self {
            Geometry::Sphere(v) => v.contains_point(point),
            Geometry::Polyhedron(v) => v.contains_point(point),
        }
    }

    pub fn as_sphere(&self) -> Option<&Sphere> {
        match self {
            Geometry::Sphere(v) => Some(v),
            Geometry::Polyhedron(_) => None,
        }
    }

    pub fn as_polyhedron(&self) -> Option<&Polyhedron> {
        match self {
            Geometry::Sphere(_) => None,
            Geometry::Polyhedron(v) => Some(v),
        }
    }
}

impl From<Sphere> for Geometry {
    fn from(v: Sphere) -> Self {
        Self::Sphere(v)
    }
}

impl From<Polyhedron> for Geometry {
    fn from(v: Polyhedron) -> Self {
        Self::Polyhedron(v)
    }
}
