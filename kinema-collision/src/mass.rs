use glam::{Mat3, Vec3};
use kinema_core::math::outer;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Geometric properties of a solid shape of unit density
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeProperties {
    pub volume: f32,
    pub centroid: Vec3,
    /// Inertia tensor per unit of mass about the centroid
    pub inertia: Mat3,
}

impl ShapeProperties {
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self {
            volume: 4.0 / 3.0 * std::f32::consts::PI * radius * radius * radius,
            centroid: center,
            inertia: Mat3::from_diagonal(Vec3::splat(0.4 * radius * radius)),
        }
    }

    /// Integrates a closed polyhedron given as a set of convex face loops.
    ///
    /// Every face is fan triangulated from its first point, and each triangle forms a tetrahedron
    /// with the origin. The inertia is accumulated in a second pass relative to the centroid.
    pub fn polyhedron<'a, I>(faces: I) -> Self
    where
        I: IntoIterator<Item = &'a [Vec3]> + Clone,
    {
        let mut volume = 0.0;
        let mut weighted_centroid = Vec3::ZERO;
        for (a, b, c) in faces.clone().into_iter().flat_map(|face| fan(face, Vec3::ZERO)) {
            let tetrahedron = tetrahedron_volume(a, b, c);
            volume += tetrahedron;
            weighted_centroid += (a + b + c) / 4.0 * tetrahedron;
        }

        let centroid = weighted_centroid / volume;

        let mut weighted_inertia = Mat3::ZERO;
        for (a, b, c) in faces.into_iter().flat_map(|face| fan(face, centroid)) {
            weighted_inertia += tetrahedron_inertia(a, b, c) * tetrahedron_volume(a, b, c);
        }

        Self {
            volume,
            centroid,
            inertia: weighted_inertia * volume.recip(),
        }
    }
}

/// Fan triangulation of a face, relative to `origin`
fn fan(face: &[Vec3], origin: Vec3) -> impl Iterator<Item = (Vec3, Vec3, Vec3)> + '_ {
    let first = face.first().copied().unwrap_or_default() - origin;
    face.windows(2)
        .skip(1)
        .map(move |w| (first, w[0] - origin, w[1] - origin))
}

fn tetrahedron_volume(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    kinema_core::math::triple(a, b, c) / 6.0
}

/// Inertia tensor of the tetrahedron `(0, a, b, c)` per unit volume
fn tetrahedron_inertia(a: Vec3, b: Vec3, c: Vec3) -> Mat3 {
    let covariance = ((outer(a, a) + outer(b, b) + outer(c, c)) * 2.0
        + outer(a, b)
        + outer(b, c)
        + outer(c, a)
        + outer(b, a)
        + outer(c, b)
        + outer(a, c))
        * (1.0 / 20.0);

    covariance_to_inertia(covariance)
}

fn covariance_to_inertia(c: Mat3) -> Mat3 {
    let (xx, yy, zz) = (c.x_axis.x, c.y_axis.y, c.z_axis.z);
    let diagonal = Mat3::from_diagonal(Vec3::new(xx, yy, zz));
    Mat3::from_diagonal(Vec3::new(yy + zz, zz + xx, xx + yy)) - (c - diagonal)
}

/// Mass, centroid and inertia tensor of a body or shape
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MassProperties {
    pub mass: f32,
    pub centroid: Vec3,
    /// Inertia tensor about the centroid, scaled by mass
    pub inertia: Mat3,
}

impl MassProperties {
    pub const ZERO: Self = Self {
        mass: 0.0,
        centroid: Vec3::ZERO,
        inertia: Mat3::ZERO,
    };

    pub fn from_shape(properties: &ShapeProperties, density: f32) -> Self {
        let mass = properties.volume * density;
        Self {
            mass,
            centroid: properties.centroid,
            inertia: properties.inertia * mass,
        }
    }

    /// Combines the mass properties of two rigidly attached parts.
    ///
    /// Each inertia is moved to the combined centroid with the parallel axis theorem.
    pub fn combine(&self, other: &Self) -> Self {
        let mass = self.mass + other.mass;
        if mass == 0.0 {
            return *self;
        }

        let centroid = (self.centroid * self.mass + other.centroid * other.mass) / mass;
        let inertia = self.inertia
            + other.inertia
            + displacement_tensor(centroid - self.centroid, self.mass)
            + displacement_tensor(centroid - other.centroid, other.mass);

        Self {
            mass,
            centroid,
            inertia,
        }
    }
}

impl Default for MassProperties {
    fn default() -> Self {
        Self::ZERO
    }
}

fn displacement_tensor(displacement: Vec3, mass: f32) -> Mat3 {
    let scaled = displacement * mass;
    Mat3::from_diagonal(Vec3::splat(displacement.dot(scaled))) - outer(displacement, scaled)
}
