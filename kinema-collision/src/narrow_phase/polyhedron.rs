use glam::Vec3;
use smallvec::SmallVec;

use super::Collision;
use crate::{util::midpoint_between_lines, Edge, Polyhedron};

#[derive(Debug, Clone, Copy)]
struct FaceQuery {
    depth: f32,
    face: usize,
    /// Deepest point of the other polyhedron
    point: u32,
}

#[derive(Debug, Clone, Copy)]
struct EdgeQuery {
    depth: f32,
    normal: Vec3,
    edges: Option<(usize, usize)>,
}

/// World space edge along with the normals of its two adjacent faces
struct EdgeFrame {
    start: Vec3,
    direction: Vec3,
    left: Vec3,
    right: Vec3,
}

impl EdgeFrame {
    fn new(polyhedron: &Polyhedron, edge: &Edge) -> Self {
        let (start, end) = polyhedron.edge_points(edge);
        Self {
            start,
            direction: end - start,
            left: polyhedron.face_normal(edge.left as usize),
            right: polyhedron.face_normal(edge.right as usize),
        }
    }
}

/// Separating axis test over face normals of both polyhedra and cross products of edge pairs.
///
/// The axis with the least penetration determines the contact.
pub fn polyhedron_polyhedron(a: &Polyhedron, b: &Polyhedron) -> Option<Collision> {
    if a.face_count() == 0 || b.face_count() == 0 {
        return None;
    }

    let faces_a = query_faces(a, b)?;
    let faces_b = query_faces(b, a)?;
    let edges = query_edges(a, b)?;

    let depth = faces_a.depth.min(faces_b.depth).min(edges.depth);

    if faces_a.depth == depth {
        return Some(face_contact(a, b, &faces_a));
    }

    if faces_b.depth == depth {
        return Some(face_contact(b, a, &faces_b).flip());
    }

    let (edge_a, edge_b) = edges.edges?;
    let (start_a, end_a) = a.edge_points(&a.edges()[edge_a]);
    let (start_b, end_b) = b.edge_points(&b.edges()[edge_b]);

    Some(Collision::new(
        midpoint_between_lines(start_a, end_a, start_b, end_b),
        edges.normal,
        depth,
    ))
}

/// Returns the point of `polyhedron` furthest along `-direction`
fn support_below(polyhedron: &Polyhedron, direction: Vec3) -> (f32, u32) {
    polyhedron
        .points()
        .iter()
        .enumerate()
        .fold((f32::INFINITY, 0), |(min, index), (i, point)| {
            let offset = point.dot(direction);
            if offset < min {
                (offset, i as u32)
            } else {
                (min, index)
            }
        })
}

/// Finds the face of `a` which `b` penetrates the least, or `None` if a face separates them
fn query_faces(a: &Polyhedron, b: &Polyhedron) -> Option<FaceQuery> {
    let mut best = FaceQuery {
        depth: f32::INFINITY,
        face: 0,
        point: 0,
    };

    for face in 0..a.face_count() {
        let (offset, point) = support_below(b, a.face_normal(face));
        let depth = a.face_offset(face) - offset;

        if depth < best.depth {
            if depth < 0.0 {
                return None;
            }

            best = FaceQuery { depth, face, point };
        }
    }

    Some(best)
}

/// Two edges can only define a separating axis if their arcs on the Gauss map intersect.
fn edges_form_face(a: &EdgeFrame, b: &EdgeFrame) -> bool {
    let left_a = b.left.dot(a.direction);
    let right_a = b.right.dot(a.direction);
    let left_b = a.left.dot(b.direction);
    let right_b = a.right.dot(b.direction);

    left_a * right_a < 0.0 && left_b * right_b < 0.0 && left_a * right_b < 0.0
}

fn query_edges(a: &Polyhedron, b: &Polyhedron) -> Option<EdgeQuery> {
    let mut best = EdgeQuery {
        depth: f32::INFINITY,
        normal: Vec3::ZERO,
        edges: None,
    };

    let frames_b = b
        .edges()
        .iter()
        .map(|edge| EdgeFrame::new(b, edge))
        .collect::<SmallVec<[EdgeFrame; 32]>>();

    for (index_a, edge_a) in a.edges().iter().enumerate() {
        let edge_a = EdgeFrame::new(a, edge_a);

        for (index_b, edge_b) in frames_b.iter().enumerate() {
            if !edges_form_face(&edge_a, edge_b) {
                continue;
            }

            let Some(mut normal) = edge_a.direction.cross(edge_b.direction).try_normalize() else {
                continue;
            };

            // Orient away from `a`
            if normal.dot(edge_a.left + edge_a.right) < 0.0 {
                normal = -normal;
            }

            let depth = normal.dot(edge_a.start) - normal.dot(edge_b.start);
            if depth < best.depth {
                if depth < 0.0 {
                    return None;
                }

                best = EdgeQuery {
                    depth,
                    normal,
                    edges: Some((index_a, index_b)),
                };
            }
        }
    }

    Some(best)
}

/// Contact on face `query.face` of `a`.
///
/// The deepest point of `b` is clamped against the edge planes of the face so that it lies
/// within the face outline.
fn face_contact(a: &Polyhedron, b: &Polyhedron, query: &FaceQuery) -> Collision {
    let normal = a.face_normal(query.face);
    let mut point = b.point(query.point);

    for (start, end) in a.face_edges(query.face) {
        let direction = normal.cross(end - start);
        let distance = direction.dot(start) - direction.dot(point);
        if distance > 0.0 {
            point += direction * distance / direction.length_squared();
        }
    }

    Collision::new(point, normal, query.depth)
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, SQRT_2};

    use glam::{vec3, Quat};
    use kinema_core::Transform;
    use smallvec::smallvec;

    use super::*;
    use crate::{Face, PolyhedronDefinition};

    fn cube(transform: Transform) -> Polyhedron {
        let mut polyhedron = Polyhedron::new(&PolyhedronDefinition::cuboid(Vec3::ONE)).unwrap();
        polyhedron.update(&transform);
        polyhedron
    }

    #[test]
    fn face_contact() {
        let a = cube(Transform::IDENTITY);
        let b = cube(Transform::from_position(vec3(0.3, 1.9, -0.2)));

        let collision = polyhedron_polyhedron(&a, &b).unwrap();
        assert!(collision.normal.abs_diff_eq(Vec3::Y, 1e-6));
        assert!((collision.depth - 0.1).abs() < 1e-5);
        // Deepest corner of `b`, clamped into the outline of the top face of `a`
        assert!(collision.point.abs_diff_eq(vec3(-0.7, 0.9, -1.0), 1e-5), "{collision:?}");
    }

    #[test]
    fn separated() {
        let a = cube(Transform::IDENTITY);
        let b = cube(Transform::new(
            vec3(2.5, 0.5, 0.0),
            Quat::from_rotation_z(0.3),
        ));

        assert_eq!(polyhedron_polyhedron(&a, &b), None);
    }

    #[test]
    fn separated_by_edge_axis() {
        // Only the edge-edge axis separates these two
        let a = cube(Transform::new(Vec3::ZERO, Quat::from_rotation_z(FRAC_PI_4)));
        let b = cube(Transform::new(
            vec3(0.0, 2.0 * SQRT_2 + 0.1, 0.0),
            Quat::from_rotation_x(FRAC_PI_4),
        ));

        assert_eq!(polyhedron_polyhedron(&a, &b), None);
    }

    #[test]
    fn edge_contact() {
        let a = cube(Transform::new(Vec3::ZERO, Quat::from_rotation_z(FRAC_PI_4)));
        let b = cube(Transform::new(
            vec3(0.0, 2.0 * SQRT_2 - 0.1, 0.0),
            Quat::from_rotation_x(FRAC_PI_4),
        ));

        let collision = polyhedron_polyhedron(&a, &b).unwrap();
        assert!(collision.normal.abs_diff_eq(Vec3::Y, 1e-5), "{collision:?}");
        assert!((collision.depth - 0.1).abs() < 1e-4);
        assert!(collision
            .point
            .abs_diff_eq(vec3(0.0, SQRT_2 - 0.05, 0.0), 1e-4));
    }

    #[test]
    fn symmetric() {
        let configurations = [
            (
                Transform::IDENTITY,
                Transform::new(vec3(1.7, 0.4, 0.2), Quat::from_rotation_y(0.4)),
            ),
            (
                Transform::new(Vec3::ZERO, Quat::from_rotation_z(FRAC_PI_4)),
                Transform::new(
                    vec3(0.0, 2.0 * SQRT_2 - 0.1, 0.0),
                    Quat::from_rotation_x(FRAC_PI_4),
                ),
            ),
            (
                Transform::new(vec3(0.1, 0.0, 0.0), Quat::from_rotation_x(0.2)),
                Transform::new(vec3(0.3, -1.8, 0.4), Quat::from_rotation_z(-0.3)),
            ),
        ];

        for (transform_a, transform_b) in configurations {
            let a = cube(transform_a);
            let b = cube(transform_b);

            let forward = polyhedron_polyhedron(&a, &b).unwrap();
            let reverse = polyhedron_polyhedron(&b, &a).unwrap();

            assert!((forward.depth - reverse.depth).abs() < 1e-5);
            assert!(forward.normal.abs_diff_eq(-reverse.normal, 1e-5));
        }
    }

    /// Prism around the y axis with a regular `sides`-gon as cross section
    fn prism(sides: u32, transform: Transform) -> Polyhedron {
        let ring = (0..sides).map(|i| {
            let angle = i as f32 / sides as f32 * std::f32::consts::TAU;
            vec3(angle.cos(), 0.0, angle.sin())
        });

        let points = ring
            .clone()
            .map(|p| p - Vec3::Y)
            .chain(ring.map(|p| p + Vec3::Y))
            .collect::<Vec<_>>();

        let mut faces: Vec<Face> = vec![(0..sides).collect(), (sides..2 * sides).rev().collect()];
        faces.extend((0..sides).map(|i| -> Face {
            let next = (i + 1) % sides;
            smallvec![i, i + sides, next + sides, next]
        }));

        let definition = PolyhedronDefinition::from_faces(points, faces).unwrap();
        let mut polyhedron = Polyhedron::new(&definition).unwrap();
        polyhedron.update(&transform);
        polyhedron
    }

    #[test]
    fn many_edges() {
        let a = prism(16, Transform::IDENTITY);
        assert_eq!(a.edges().len(), 48);

        // Lying on its side, with a side edge resting on the top face of `a`
        let b = prism(
            16,
            Transform::new(vec3(0.0, 1.9, 0.0), Quat::from_rotation_x(FRAC_PI_2)),
        );

        let forward = polyhedron_polyhedron(&a, &b).unwrap();
        assert!(forward.normal.abs_diff_eq(Vec3::Y, 1e-4), "{forward:?}");
        assert!((forward.depth - 0.1).abs() < 1e-4);

        let reverse = polyhedron_polyhedron(&b, &a).unwrap();
        assert!((reverse.depth - forward.depth).abs() < 1e-4);
        assert!(reverse.normal.abs_diff_eq(-Vec3::Y, 1e-4), "{reverse:?}");

        let lifted = prism(
            16,
            Transform::new(vec3(0.0, 2.1, 0.0), Quat::from_rotation_x(FRAC_PI_2)),
        );
        assert_eq!(polyhedron_polyhedron(&a, &lifted), None);
    }
}
