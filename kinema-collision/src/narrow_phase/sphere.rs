use glam::Vec3;

use super::Collision;
use crate::Sphere;

pub fn sphere_sphere(a: &Sphere, b: &Sphere) -> Option<Collision> {
    let difference = b.center() - a.center();
    let distance_squared = difference.length_squared();
    let radius_sum = a.radius() + b.radius();

    if distance_squared > radius_sum * radius_sum {
        return None;
    }

    // Concentric spheres have no preferred direction
    if distance_squared == 0.0 {
        return Some(Collision::new(a.center(), Vec3::Y, radius_sum));
    }

    let distance = distance_squared.sqrt();
    let normal = difference / distance;
    let depth = radius_sum - distance;

    let point = if depth > a.radius() {
        a.center()
    } else if depth > b.radius() {
        b.center()
    } else {
        a.center() + normal * (a.radius() - depth / 2.0)
    };

    Some(Collision::new(point, normal, depth))
}
