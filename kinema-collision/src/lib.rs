//! Collision detection for kinema.
//!
//! Provides the convex shape types and their mass integration, the [`DynamicGrid`] broad phase
//! which finds candidate pairs by bounding box, and the exact [`narrow_phase`] tests which turn
//! candidate pairs into contacts.
mod bound;
pub mod broad_phase;
mod definition;
mod error;
mod geometry;
mod mass;
pub mod narrow_phase;
mod polyhedron;
mod sphere;
pub mod util;
mod validation;

pub use bound::Bound;
pub use broad_phase::DynamicGrid;
pub use definition::{Edge, Face, PolyhedronDefinition};
pub use error::{PolyhedronError, SphereError};
pub use geometry::Geometry;
pub use mass::{MassProperties, ShapeProperties};
pub use narrow_phase::{collide, Collision};
pub use polyhedron::Polyhedron;
pub use sphere::Sphere;
