//! Rigid body dynamics for kinema.
//!
//! A [`World`] owns bodies, the convex shapes attached to them and the contacts found between
//! those shapes. [`World::step`] advances the simulation by one timestep, dispatching every
//! phase through an [`Executor`](kinema_core::Executor) so the same step runs sequentially, on
//! a thread pool, or on a [`DeviceContext`](kinema_core::DeviceContext) through [`DeviceWorld`].
//!
//! Contacts are resolved with sequential impulses. Each contact accumulates a clamped normal and
//! friction impulse, and the per iteration deltas are applied to the bodies as split impulses in
//! a separate pass, weighted by the number of contacts touching each body.
mod body;
mod config;
mod contact;
mod device;
mod error;
mod material;
mod shape;
mod solver;
mod timings;
mod world;

pub use body::{Body, BodyIndex, InverseMass};
pub use config::WorldConfig;
pub use contact::{Contact, ContactCache, ContactKey, CONTACTS_PER_SHAPE};
pub use device::DeviceWorld;
pub use error::*;
pub use material::Material;
pub use shape::{Shape, ShapeIndex};
pub use timings::StepTimes;
pub use world::World;
