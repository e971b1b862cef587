use glam::Vec3;
use itertools::Itertools;
use kinema_core::Transform;
use smallvec::SmallVec;

use crate::{
    definition::{face_edges, Edge},
    Bound, PolyhedronDefinition, PolyhedronError, ShapeProperties,
};

/// Convex polyhedron in both the local space of its body and in world space.
///
/// Face point indices are stored flattened, with `face_offsets[face]..face_offsets[face + 1]`
/// delimiting the loop of each face.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyhedron {
    local_points: Vec<Vec3>,
    points: Vec<Vec3>,
    local_normals: Vec<Vec3>,
    normals: Vec<Vec3>,
    face_offsets: Vec<u32>,
    face_indices: Vec<u32>,
    edges: Vec<Edge>,
}

impl Polyhedron {
    /// Creates a runtime polyhedron from a definition.
    ///
    /// Only verifies that all indices are in range, geometric validity is checked by
    /// [`PolyhedronDefinition::validate`].
    pub fn new(definition: &PolyhedronDefinition) -> Result<Self, PolyhedronError> {
        let point_count = definition.points.len() as u32;
        let face_count = definition.faces.len() as u32;

        for (face, indices) in definition.faces.iter().enumerate() {
            if let Some(&point) = indices.iter().find(|&&v| v >= point_count) {
                return Err(PolyhedronError::FacePointOutOfRange { face, point });
            }

            if indices.len() < 3 {
                return Err(PolyhedronError::FaceHasTooFewPoints { face });
            }
        }

        for (edge, value) in definition.edges.iter().enumerate() {
            if value.start >= point_count || value.end >= point_count {
                return Err(PolyhedronError::EdgePointOutOfRange { edge });
            }

            if value.left >= face_count || value.right >= face_count {
                return Err(PolyhedronError::EdgeFaceOutOfRange { edge });
            }
        }

        let mut face_offsets = Vec::with_capacity(definition.faces.len() + 1);
        let mut face_indices = Vec::new();
        face_offsets.push(0);
        for face in &definition.faces {
            face_indices.extend_from_slice(face);
            face_offsets.push(face_indices.len() as u32);
        }

        let local_normals = definition
            .faces
            .iter()
            .map(|face| {
                let points = face
                    .iter()
                    .map(|&i| definition.points[i as usize])
                    .collect::<SmallVec<[Vec3; 8]>>();

                face_normal(&points)
            })
            .collect_vec();

        Ok(Self {
            local_points: definition.points.clone(),
            points: definition.points.clone(),
            normals: local_normals.clone(),
            local_normals,
            face_offsets,
            face_indices,
            edges: definition.edges.clone(),
        })
    }

    /// Moves the world space representation to `transform`
    pub fn update(&mut self, transform: &Transform) {
        for (point, local) in self.points.iter_mut().zip(&self.local_points) {
            *point = transform.transform_point(*local);
        }

        for (normal, local) in self.normals.iter_mut().zip(&self.local_normals) {
            *normal = transform.transform_vector(*local);
        }
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn local_points(&self) -> &[Vec3] {
        &self.local_points
    }

    #[inline]
    pub fn point(&self, index: u32) -> Vec3 {
        self.points[index as usize]
    }

    pub fn face_count(&self) -> usize {
        self.normals.len()
    }

    #[inline]
    pub fn face_normal(&self, face: usize) -> Vec3 {
        self.normals[face]
    }

    /// Distance of the face plane from the origin along its normal
    pub fn face_offset(&self, face: usize) -> f32 {
        let first = self.face_indices(face).first().copied().unwrap_or_default();
        self.point(first).dot(self.normals[face])
    }

    pub fn face_indices(&self, face: usize) -> &[u32] {
        let start = self.face_offsets[face] as usize;
        let end = self.face_offsets[face + 1] as usize;
        &self.face_indices[start..end]
    }

    pub fn face_points(&self, face: usize) -> impl Iterator<Item = Vec3> + '_ {
        self.face_indices(face).iter().map(|&i| self.point(i))
    }

    /// Directed edges around a face, starting with the edge closing the loop
    pub fn face_edges(&self, face: usize) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        face_edges(self.face_indices(face)).map(|(a, b)| (self.point(a), self.point(b)))
    }

    pub(crate) fn face_offsets(&self) -> &[u32] {
        &self.face_offsets
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge_points(&self, edge: &Edge) -> (Vec3, Vec3) {
        (self.point(edge.start), self.point(edge.end))
    }

    pub fn bound(&self) -> Bound {
        Bound::from_points(self.points.iter().copied())
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        (0..self.face_count())
            .all(|face| self.face_normal(face).dot(point) <= self.face_offset(face))
    }

    /// Properties in the local space of the owning body
    pub fn properties(&self) -> ShapeProperties {
        let faces = (0..self.face_count())
            .map(|face| {
                self.face_indices(face)
                    .iter()
                    .map(|&i| self.local_points[i as usize])
                    .collect::<SmallVec<[Vec3; 8]>>()
            })
            .collect_vec();

        ShapeProperties::polyhedron(faces.iter().map(|v| v.as_slice()))
    }
}

/// Normal of a planar loop, averaged over every consecutive triple of points
fn face_normal(points: &[Vec3]) -> Vec3 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = points[(i + n - 2) % n];
            let b = points[(i + n - 1) % n];
            let c = points[i];
            (b - a).cross(c - a)
        })
        .sum::<Vec3>()
        .normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use glam::{vec3, Quat};
    use smallvec::smallvec;

    use super::*;

    #[test]
    fn cuboid_normals() {
        let definition = PolyhedronDefinition::cuboid(vec3(1.0, 2.0, 3.0));
        let polyhedron = Polyhedron::new(&definition).unwrap();

        let normals = [-Vec3::X, Vec3::X, -Vec3::Y, Vec3::Y, -Vec3::Z, Vec3::Z];
        let offsets = [1.0, 1.0, 2.0, 2.0, 3.0, 3.0];

        for face in 0..6 {
            assert!(polyhedron.face_normal(face).abs_diff_eq(normals[face], 1e-6));
            assert!((polyhedron.face_offset(face) - offsets[face]).abs() < 1e-5);
        }
    }

    #[test]
    fn update() {
        let mut polyhedron = Polyhedron::new(&PolyhedronDefinition::cuboid(Vec3::ONE)).unwrap();
        polyhedron.update(&Transform::new(
            vec3(5.0, 0.0, 0.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        ));

        assert!(polyhedron.face_normal(1).abs_diff_eq(-Vec3::Z, 1e-6));
        assert!((polyhedron.face_offset(0) - 1.0).abs() < 1e-5);
        assert!(polyhedron.contains_point(vec3(5.5, 0.5, -0.5)));
        assert!(!polyhedron.contains_point(Vec3::ZERO));

        let bound = polyhedron.bound();
        assert!(bound.lower.abs_diff_eq(vec3(4.0, -1.0, -1.0), 1e-5));
        assert!(bound.upper.abs_diff_eq(vec3(6.0, 1.0, 1.0), 1e-5));
    }

    #[test]
    fn out_of_range() {
        let mut definition = PolyhedronDefinition::cuboid(Vec3::ONE);
        definition.faces[2][1] = 8;
        assert_eq!(
            Polyhedron::new(&definition),
            Err(PolyhedronError::FacePointOutOfRange { face: 2, point: 8 })
        );

        let mut definition = PolyhedronDefinition::cuboid(Vec3::ONE);
        definition.edges[3].right = 6;
        assert_eq!(
            Polyhedron::new(&definition),
            Err(PolyhedronError::EdgeFaceOutOfRange { edge: 3 })
        );

        let mut definition = PolyhedronDefinition::cuboid(Vec3::ONE);
        definition.faces[0] = smallvec![0, 4];
        assert_eq!(
            Polyhedron::new(&definition),
            Err(PolyhedronError::FaceHasTooFewPoints { face: 0 })
        );
    }
}
