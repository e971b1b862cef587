use glam::Vec3;
use kinema_core::Transform;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Bound, ShapeProperties, SphereError};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sphere {
    local_center: Vec3,
    center: Vec3,
    radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            local_center: center,
            center,
            radius,
        }
    }

    /// Checks that a sphere description is usable for simulation
    pub fn validate(center: Vec3, radius: f32, tolerance: f32) -> Result<(), SphereError> {
        if !center.is_finite() || !radius.is_finite() {
            return Err(SphereError::NotFinite);
        }

        if radius <= -tolerance {
            return Err(SphereError::RadiusNotPositive);
        }

        Ok(())
    }

    /// World space center
    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn local_center(&self) -> Vec3 {
        self.local_center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn update(&mut self, transform: &Transform) {
        self.center = transform.transform_point(self.local_center);
    }

    pub fn bound(&self) -> Bound {
        Bound::from_sphere(self.center, self.radius)
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }

    /// Properties in the local space of the owning body
    pub fn properties(&self) -> ShapeProperties {
        ShapeProperties::sphere(self.local_center, self.radius)
    }
}

#[cfg(test)]
mod tests {
    use glam::{vec3, Quat};

    use super::*;

    #[test]
    fn update() {
        let mut sphere = Sphere::new(Vec3::X, 0.5);
        sphere.update(&Transform::new(
            vec3(0.0, 2.0, 0.0),
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
        ));

        assert!(sphere.center().abs_diff_eq(vec3(0.0, 3.0, 0.0), 1e-6));
        assert_eq!(sphere.local_center(), Vec3::X);
        assert!(sphere.contains_point(vec3(0.0, 3.4, 0.0)));
        assert!(!sphere.contains_point(Vec3::ZERO));

        let bound = sphere.bound();
        assert!(bound.lower.abs_diff_eq(vec3(-0.5, 2.5, -0.5), 1e-6));
    }

    #[test]
    fn validate() {
        assert_eq!(Sphere::validate(Vec3::ZERO, 1.0, 1e-4), Ok(()));
        assert_eq!(Sphere::validate(Vec3::ZERO, 0.0, 1e-4), Ok(()));
        assert_eq!(
            Sphere::validate(Vec3::ZERO, -1.0, 1e-4),
            Err(SphereError::RadiusNotPositive)
        );
        assert_eq!(
            Sphere::validate(Vec3::NAN, 1.0, 1e-4),
            Err(SphereError::NotFinite)
        );
    }
}
