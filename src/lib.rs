//! # Kinema
//!
//! ## What it is
//!
//! Kinema is a real-time rigid body physics kernel. It advances bodies built from spheres and
//! convex polyhedra one timestep at a time, detects the collisions between them and resolves
//! the collisions with contact impulses.
//!
//! This crate exports all kinema crates, but the separate crates can just as well be used
//! manually.
//!
//! ## How it works
//!
//! ### Executors
//! Every phase of a step is an operation over a range of indices, such as every shape, body or
//! contact. Phases are dispatched through an [`core::Executor`], which decides where the indices
//! run: in order on the calling thread, on a rayon thread pool, or in workgroups on a
//! [`core::DeviceContext`].
//!
//! ### Step
//! A [`physics::World`] step updates the world space form of each shape and feeds its bound to
//! the [`collision::DynamicGrid`] broad phase. Candidate pairs are tested exactly by the
//! [`collision::narrow_phase`], and every hit is appended as a contact. The contacts are then
//! resolved by a sequential impulse solver which can be warm started from the impulses of the
//! previous step, before the bodies are integrated.
//!
//! See the documentation for [`physics::World`]

/// Rexports
pub use kinema_collision as collision;
pub use kinema_core as core;
pub use kinema_physics as physics;

pub use glam;
