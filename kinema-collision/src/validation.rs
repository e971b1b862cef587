//! Offline validation of polyhedron definitions.
//!
//! The simulation assumes convex, closed and consistently wound polyhedra and does not check
//! for degenerate geometry at runtime.
use std::collections::HashMap;

use kinema_core::math::triple;

use crate::{definition::face_edges, Polyhedron, PolyhedronDefinition, PolyhedronError};

impl PolyhedronDefinition {
    /// Verifies that the definition describes a valid convex polyhedron within `tolerance`
    pub fn validate(&self, tolerance: f32) -> Result<(), PolyhedronError> {
        if self.points.iter().any(|v| !v.is_finite()) {
            return Err(PolyhedronError::NotFinite);
        }

        Polyhedron::new(self)?.validate(tolerance)
    }
}

impl Polyhedron {
    /// Verifies the current world space state of the polyhedron
    pub fn validate(&self, tolerance: f32) -> Result<(), PolyhedronError> {
        if self.points().iter().any(|v| !v.is_finite()) {
            return Err(PolyhedronError::NotFinite);
        }

        let offsets = self.face_offsets();
        if offsets.first() != Some(&0) {
            return Err(PolyhedronError::FaceIndicesNotContiguous { face: 0 });
        }

        for face in 0..self.face_count() {
            if offsets[face + 1] < offsets[face] {
                return Err(PolyhedronError::FaceIndicesNotContiguous { face });
            }

            if self.face_indices(face).len() < 3 {
                return Err(PolyhedronError::FaceHasTooFewPoints { face });
            }

            let normal = self.face_normal(face);
            if (normal.length() - 1.0).abs() > tolerance {
                return Err(PolyhedronError::FaceNormalLength { face });
            }

            let offset = self.face_offset(face);
            if self
                .face_points(face)
                .any(|point| (normal.dot(point) - offset).abs() > tolerance)
            {
                return Err(PolyhedronError::FaceNotPlanar { face });
            }

            let points = self.face_points(face).collect::<Vec<_>>();
            let n = points.len();
            let winding_negative = (0..n).any(|i| {
                let a = points[(i + n - 2) % n];
                let b = points[(i + n - 1) % n];
                let c = points[i];
                triple(normal, b - a, c - a) <= -tolerance
            });

            if winding_negative {
                return Err(PolyhedronError::FaceWindingNotPositive { face });
            }
        }

        // Properties are integrated from local points, which share the volume of the world form
        if self.properties().volume <= -tolerance {
            return Err(PolyhedronError::VolumeNotPositive);
        }

        let mut directed = HashMap::new();
        for face in 0..self.face_count() {
            for (start, end) in face_edges(self.face_indices(face)) {
                if directed.insert((start, end), face as u32).is_some() {
                    return Err(PolyhedronError::EdgeDuplicated { start, end });
                }
            }
        }

        for (index, edge) in self.edges().iter().enumerate() {
            match directed.get(&(edge.start, edge.end)) {
                None => return Err(PolyhedronError::EdgeLeftFaceNotFound { edge: index }),
                Some(&face) if face != edge.left => {
                    return Err(PolyhedronError::EdgeLeftFaceIncorrect { edge: index })
                }
                Some(_) => {}
            }

            match directed.get(&(edge.end, edge.start)) {
                None => return Err(PolyhedronError::EdgeRightFaceNotFound { edge: index }),
                Some(&face) if face != edge.right => {
                    return Err(PolyhedronError::EdgeRightFaceIncorrect { edge: index })
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::{vec3, Quat, Vec3};
    use kinema_core::Transform;
    use smallvec::smallvec;

    use crate::{definition::Edge, Face};

    use super::*;

    const TOLERANCE: f32 = 1e-4;

    fn tetrahedron() -> PolyhedronDefinition {
        let points = vec![
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(0.0, 1.0, 0.0),
            vec3(0.0, 0.0, 1.0),
        ];

        let faces: Vec<Face> = vec![
            smallvec![0, 2, 1],
            smallvec![0, 1, 3],
            smallvec![0, 3, 2],
            smallvec![1, 2, 3],
        ];

        PolyhedronDefinition::from_faces(points, faces).unwrap()
    }

    #[test]
    fn valid() {
        assert_eq!(PolyhedronDefinition::cuboid(vec3(1.0, 0.5, 2.0)).validate(TOLERANCE), Ok(()));
        assert_eq!(tetrahedron().validate(TOLERANCE), Ok(()));

        let mut definition = PolyhedronDefinition::cuboid(Vec3::ONE);
        definition.transform(&Transform::new(
            vec3(1.0, 2.0, 3.0),
            Quat::from_euler(glam::EulerRot::XYZ, 0.3, 1.2, -0.4),
        ));
        definition.scale(vec3(2.0, 1.0, 1.0));
        assert_eq!(definition.validate(TOLERANCE), Ok(()));
    }

    #[test]
    fn not_finite() {
        let mut definition = tetrahedron();
        definition.points[2].y = f32::INFINITY;
        assert_eq!(definition.validate(TOLERANCE), Err(PolyhedronError::NotFinite));
    }

    #[test]
    fn not_planar() {
        let mut definition = PolyhedronDefinition::cuboid(Vec3::ONE);
        definition.points[7] += Vec3::splat(0.1);
        assert!(matches!(
            definition.validate(TOLERANCE),
            Err(PolyhedronError::FaceNotPlanar { .. })
        ));
    }

    #[test]
    fn inverted_winding() {
        let mut definition = tetrahedron();
        for face in &mut definition.faces {
            face.reverse();
        }

        // Reversing every face flips all normals outward to inward. The loops stay consistent
        // with their own normals, so it is the enclosed volume which becomes negative.
        assert_eq!(definition.validate(TOLERANCE), Err(PolyhedronError::VolumeNotPositive));
    }

    #[test]
    fn non_convex_face() {
        let points = vec![
            vec3(0.0, 0.0, 0.0),
            vec3(2.0, 0.0, 0.0),
            vec3(1.0, 0.2, 0.0),
            vec3(2.0, 2.0, 0.0),
            vec3(0.0, 2.0, 0.0),
        ];

        let definition = PolyhedronDefinition::new(points, vec![smallvec![0, 1, 2, 3, 4]], vec![]);
        // The reflex vertex at point 2 turns clockwise
        assert_eq!(
            definition.validate(TOLERANCE),
            Err(PolyhedronError::FaceWindingNotPositive { face: 0 })
        );
    }

    #[test]
    fn wrong_edge_faces() {
        let mut definition = PolyhedronDefinition::cuboid(Vec3::ONE);
        definition.edges[0] = Edge::new(0, 1, 4, 2);
        assert_eq!(
            definition.validate(TOLERANCE),
            Err(PolyhedronError::EdgeLeftFaceIncorrect { edge: 0 })
        );

        let mut definition = PolyhedronDefinition::cuboid(Vec3::ONE);
        definition.edges[0] = Edge::new(0, 1, 2, 3);
        assert_eq!(
            definition.validate(TOLERANCE),
            Err(PolyhedronError::EdgeRightFaceIncorrect { edge: 0 })
        );

        let mut definition = PolyhedronDefinition::cuboid(Vec3::ONE);
        definition.edges[0] = Edge::new(0, 7, 2, 4);
        assert_eq!(
            definition.validate(TOLERANCE),
            Err(PolyhedronError::EdgeLeftFaceNotFound { edge: 0 })
        );
    }
}
