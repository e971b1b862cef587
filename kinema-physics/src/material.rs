#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Surface response of a shape
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Material {
    /// Fraction of the approach velocity that is restored after impact.
    ///
    /// The solver uses the square root of the combined value.
    pub restitution: f32,
    /// Friction coefficient below which the contact sticks
    pub static_friction: f32,
    /// Friction coefficient applied once the contact slides
    pub dynamic_friction: f32,
}

impl Material {
    pub fn new(restitution: f32, static_friction: f32, dynamic_friction: f32) -> Self {
        Self {
            restitution,
            static_friction,
            dynamic_friction,
        }
    }

    /// Combines the materials of two touching shapes.
    ///
    /// The bouncier restitution wins, frictions are combined with the geometric mean.
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            restitution: self.restitution.max(other.restitution),
            static_friction: (self.static_friction * other.static_friction).sqrt(),
            dynamic_friction: (self.dynamic_friction * other.dynamic_friction).sqrt(),
        }
    }
}
