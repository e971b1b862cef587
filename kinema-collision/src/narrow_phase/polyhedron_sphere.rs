use kinema_core::math::triple;

use super::Collision;
use crate::{util::project_onto_segment, Polyhedron, Sphere};

/// Finds the face whose plane the sphere center is furthest in front of. If the center
/// projects inside that face the contact lies on the face, otherwise the closest point on any
/// edge is used.
pub fn polyhedron_sphere(polyhedron: &Polyhedron, sphere: &Sphere) -> Option<Collision> {
    let center = sphere.center();
    let radius = sphere.radius();

    let mut max_distance = f32::NEG_INFINITY;
    let mut closest_face = None;
    let mut on_closest_face = false;

    for face in 0..polyhedron.face_count() {
        let normal = polyhedron.face_normal(face);
        let distance = normal.dot(center) - polyhedron.face_offset(face);

        if distance > max_distance {
            if distance > radius {
                return None;
            }

            on_closest_face = polyhedron
                .face_edges(face)
                .all(|(a, b)| triple(normal, b - a, center - a) >= 0.0);

            max_distance = distance;
            closest_face = Some(face);
        }
    }

    let closest_face = closest_face?;

    if on_closest_face {
        let normal = polyhedron.face_normal(closest_face);
        let point = if max_distance > 0.0 {
            center - normal * max_distance
        } else {
            center
        };

        return Some(Collision::new(point, normal, radius - max_distance));
    }

    let (closest, distance_squared) = polyhedron
        .edges()
        .iter()
        .map(|edge| {
            let (start, end) = polyhedron.edge_points(edge);
            let point = project_onto_segment(start, end, center);
            (point, point.distance_squared(center))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))?;

    if distance_squared > radius * radius {
        return None;
    }

    let depth = radius - distance_squared.sqrt();
    if depth < 0.0 {
        return None;
    }

    let normal = (center - closest)
        .try_normalize()
        .unwrap_or_else(|| polyhedron.face_normal(closest_face));

    Some(Collision::new(closest, normal, depth))
}

pub fn sphere_polyhedron(sphere: &Sphere, polyhedron: &Polyhedron) -> Option<Collision> {
    polyhedron_sphere(polyhedron, sphere).map(Collision::flip)
}
