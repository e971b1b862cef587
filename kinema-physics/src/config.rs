use glam::Vec3;
use kinema_core::Twist;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of a [`World`](crate::World), which may be changed between steps.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorldConfig {
    /// Length of a step in seconds
    pub dt: f32,
    /// Number of solver iterations per step
    pub iteration_count: u32,
    /// Acceleration applied to every dynamic body
    pub gravity: Twist,
    /// Seed the solver with the impulses of the previous step
    pub warm_starting: bool,
    /// Fraction of the penetration depth resolved per second by the position bias.
    ///
    /// Both this and `correction_velocity_limit` must be non-zero for the bias to apply.
    pub correction_velocity_factor: f32,
    /// Upper bound of the separation velocity introduced by the position bias
    pub correction_velocity_limit: f32,
}

impl WorldConfig {
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = Twist::linear(gravity);
        self
    }

    pub fn with_warm_starting(mut self, warm_starting: bool) -> Self {
        self.warm_starting = warm_starting;
        self
    }

    pub fn with_iteration_count(mut self, iteration_count: u32) -> Self {
        self.iteration_count = iteration_count;
        self
    }

    /// Disables the position bias
    pub fn without_correction(mut self) -> Self {
        self.correction_velocity_factor = 0.0;
        self.correction_velocity_limit = 0.0;
        self
    }

    pub(crate) fn correction_enabled(&self) -> bool {
        self.correction_velocity_factor != 0.0 && self.correction_velocity_limit != 0.0
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            iteration_count: 10,
            gravity: Twist::linear(Vec3::new(0.0, -10.0, 0.0)),
            warm_starting: false,
            correction_velocity_factor: 0.3,
            correction_velocity_limit: 15.0,
        }
    }
}
