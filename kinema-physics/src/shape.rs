use std::fmt::Display;

use kinema_collision::{Geometry, MassProperties};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{BodyIndex, Material};

/// Stable handle of a shape within a [`World`](crate::World)
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShapeIndex(pub u32);

impl ShapeIndex {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for ShapeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Convex collider rigidly attached to a body
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub body: BodyIndex,
    pub material: Material,
    pub density: f32,
    pub geometry: Geometry,
}

impl Shape {
    /// Mass contributed to the owning body
    pub fn mass_properties(&self) -> MassProperties {
        MassProperties::from_shape(&self.geometry.properties(), self.density)
    }
}
