use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use glam::{Mat3, Quat, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rigid transform consisting of a translation and a rotation. Scale is baked into shape
/// definitions at authoring time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.position
    }

    #[inline]
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * vector
    }

    /// Rotates a body-space tensor into world space, `R I R^T`
    pub fn transform_tensor(&self, tensor: Mat3) -> Mat3 {
        let rotation = Mat3::from_quat(self.rotation);
        rotation * tensor * rotation.transpose()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A linear and angular pair, used for velocities, impulses and accelerations.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Twist {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl Twist {
    pub const ZERO: Self = Self {
        linear: Vec3::ZERO,
        angular: Vec3::ZERO,
    };

    pub fn new(linear: Vec3, angular: Vec3) -> Self {
        Self { linear, angular }
    }

    pub fn linear(linear: Vec3) -> Self {
        Self {
            linear,
            angular: Vec3::ZERO,
        }
    }

    /// Twist produced by applying `impulse` at `lever` relative to the center of mass
    pub fn from_impulse(impulse: Vec3, lever: Vec3) -> Self {
        Self {
            linear: impulse,
            angular: lever.cross(impulse),
        }
    }

    /// Velocity of a point at `lever` from the center of mass
    #[inline]
    pub fn point_velocity(&self, lever: Vec3) -> Vec3 {
        self.linear + self.angular.cross(lever)
    }

    pub fn is_finite(&self) -> bool {
        self.linear.is_finite() && self.angular.is_finite()
    }
}

impl Add for Twist {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.linear + rhs.linear, self.angular + rhs.angular)
    }
}

impl AddAssign for Twist {
    fn add_assign(&mut self, rhs: Self) {
        self.linear += rhs.linear;
        self.angular += rhs.angular;
    }
}

impl Sub for Twist {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.linear - rhs.linear, self.angular - rhs.angular)
    }
}

impl SubAssign for Twist {
    fn sub_assign(&mut self, rhs: Self) {
        self.linear -= rhs.linear;
        self.angular -= rhs.angular;
    }
}

impl Mul<f32> for Twist {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.linear * rhs, self.angular * rhs)
    }
}

impl Neg for Twist {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.linear, -self.angular)
    }
}

/// Returns the outer product `a b^T`
#[inline]
pub fn outer(a: Vec3, b: Vec3) -> Mat3 {
    Mat3::from_cols(a * b.x, a * b.y, a * b.z)
}

/// Scalar triple product `a . (b x c)`
#[inline]
pub fn triple(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    a.dot(b.cross(c))
}

/// Integrates an angular velocity over `dt` and applies it to `rotation`.
pub fn integrate_rotation(rotation: Quat, angular: Vec3, dt: f32) -> Quat {
    let delta = angular * dt;
    if delta == Vec3::ZERO {
        return rotation;
    }

    (Quat::from_scaled_axis(delta) * rotation).normalize()
}
