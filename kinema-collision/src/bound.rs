use glam::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents an axis aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bound {
    pub lower: Vec3,
    pub upper: Vec3,
}

impl Bound {
    /// An inverted bound which contains nothing and overlaps nothing
    pub const EMPTY: Self = Self {
        lower: Vec3::INFINITY,
        upper: Vec3::NEG_INFINITY,
    };

    pub fn new(lower: Vec3, upper: Vec3) -> Self {
        Self { lower, upper }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().fold(Self::EMPTY, |bound, point| Self {
            lower: bound.lower.min(point),
            upper: bound.upper.max(point),
        })
    }

    pub fn from_sphere(center: Vec3, radius: f32) -> Self {
        Self {
            lower: center - radius,
            upper: center + radius,
        }
    }

    /// Returns true if the two bounds overlap or touch
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.lower.cmpgt(other.upper).any() || other.lower.cmpgt(self.upper).any())
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.lower).all() && point.cmple(self.upper).all()
    }

    pub fn extents(&self) -> Vec3 {
        self.upper - self.lower
    }

    /// Creates a new bound encompassing both
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            lower: self.lower.min(other.lower),
            upper: self.upper.max(other.upper),
        }
    }
}

impl Default for Bound {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use glam::vec3;

    use super::*;

    #[test]
    fn intersects() {
        let a = Bound::new(Vec3::ZERO, Vec3::ONE);
        let b = Bound::new(Vec3::splat(0.5), Vec3::splat(2.0));
        let c = Bound::new(vec3(1.0, 0.0, 0.0), vec3(2.0, 1.0, 1.0));
        let d = Bound::new(vec3(0.0, 1.5, 0.0), vec3(1.0, 2.0, 1.0));

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        // Touching faces count as intersecting
        assert!(a.intersects(&c));
        assert!(!a.intersects(&d));
        assert!(!Bound::EMPTY.intersects(&a));
    }

    #[test]
    fn from_points() {
        let bound = Bound::from_points([vec3(1.0, -2.0, 0.0), vec3(-1.0, 3.0, 0.5)]);
        assert_eq!(bound.lower, vec3(-1.0, -2.0, 0.0));
        assert_eq!(bound.upper, vec3(1.0, 3.0, 0.5));
        assert!(bound.contains_point(Vec3::ZERO));
        assert!(!bound.contains_point(Vec3::Z));
    }
}
