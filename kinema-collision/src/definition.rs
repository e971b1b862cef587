use std::collections::BTreeMap;

use glam::Vec3;
use itertools::Itertools;
use kinema_core::Transform;
use smallvec::{smallvec, SmallVec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{PolyhedronError, ShapeProperties};

/// Point indices of a convex face, counter clockwise when viewed from outside
pub type Face = SmallVec<[u32; 4]>;

/// Edge between two faces of a polyhedron.
///
/// The left face contains the edge in the direction `start -> end`, the right face contains it
/// in the direction `end -> start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edge {
    pub start: u32,
    pub end: u32,
    pub left: u32,
    pub right: u32,
}

impl Edge {
    pub fn new(start: u32, end: u32, left: u32, right: u32) -> Self {
        Self {
            start,
            end,
            left,
            right,
        }
    }
}

/// Iterates the directed edges of a face loop, starting with the closing edge from the last
/// point to the first.
pub(crate) fn face_edges<T: Copy>(face: &[T]) -> impl Iterator<Item = (T, T)> + '_ {
    face.last().into_iter().chain(face).copied().tuple_windows()
}

/// Authoring description of a convex polyhedron
#[derive(Default, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolyhedronDefinition {
    pub points: Vec<Vec3>,
    pub faces: Vec<Face>,
    pub edges: Vec<Edge>,
}

impl PolyhedronDefinition {
    pub fn new(points: Vec<Vec3>, faces: Vec<Face>, edges: Vec<Edge>) -> Self {
        Self {
            points,
            faces,
            edges,
        }
    }

    /// Creates a definition from its faces, deriving the edge table from the face loops.
    pub fn from_faces(points: Vec<Vec3>, faces: Vec<Face>) -> Result<Self, PolyhedronError> {
        let mut directed = BTreeMap::new();
        for (index, face) in faces.iter().enumerate() {
            for (start, end) in face_edges(face) {
                if directed.insert((start, end), index as u32).is_some() {
                    return Err(PolyhedronError::EdgeDuplicated { start, end });
                }
            }
        }

        let mut edges = Vec::with_capacity(directed.len() / 2);
        for (&(start, end), &left) in &directed {
            if start > end {
                continue;
            }

            let right = *directed.get(&(end, start)).ok_or(
                PolyhedronError::EdgeRightFaceNotFound {
                    edge: edges.len(),
                },
            )?;

            edges.push(Edge::new(start, end, left, right));
        }

        Ok(Self::new(points, faces, edges))
    }

    /// Axis aligned box centered at the origin
    pub fn cuboid(half_extents: Vec3) -> Self {
        let points = (0..8)
            .map(|i| {
                let sign = |bit: u32| if i & bit != 0 { 1.0 } else { -1.0 };
                half_extents * Vec3::new(sign(1), sign(2), sign(4))
            })
            .collect_vec();

        let faces: Vec<Face> = vec![
            smallvec![0, 4, 6, 2],
            smallvec![1, 3, 7, 5],
            smallvec![0, 1, 5, 4],
            smallvec![2, 6, 7, 3],
            smallvec![0, 2, 3, 1],
            smallvec![4, 5, 7, 6],
        ];

        let edges = vec![
            Edge::new(0, 1, 2, 4),
            Edge::new(0, 2, 4, 0),
            Edge::new(0, 4, 0, 2),
            Edge::new(1, 3, 1, 4),
            Edge::new(1, 5, 2, 1),
            Edge::new(2, 3, 4, 3),
            Edge::new(2, 6, 3, 0),
            Edge::new(3, 7, 1, 3),
            Edge::new(4, 5, 5, 2),
            Edge::new(4, 6, 0, 5),
            Edge::new(5, 7, 5, 1),
            Edge::new(6, 7, 3, 5),
        ];

        Self::new(points, faces, edges)
    }

    /// Transforms every point
    pub fn transform(&mut self, transform: &Transform) {
        for point in &mut self.points {
            *point = transform.transform_point(*point);
        }
    }

    pub fn scale(&mut self, scale: Vec3) {
        for point in &mut self.points {
            *point *= scale;
        }
    }

    /// Returns the points of a face.
    ///
    /// # Panics
    /// If the face references a point out of range.
    pub fn face_points(&self, face: usize) -> impl Iterator<Item = Vec3> + '_ {
        self.faces[face].iter().map(|&i| self.points[i as usize])
    }

    pub fn properties(&self) -> ShapeProperties {
        let faces = (0..self.faces.len())
            .map(|face| self.face_points(face).collect::<SmallVec<[Vec3; 4]>>())
            .collect_vec();

        ShapeProperties::polyhedron(faces.iter().map(|v| v.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_edge_order() {
        let edges = face_edges(&[1, 2, 3]).collect_vec();
        assert_eq!(edges, [(3, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn derived_cuboid_edges() {
        let cuboid = PolyhedronDefinition::cuboid(Vec3::ONE);
        let derived = PolyhedronDefinition::from_faces(cuboid.points.clone(), cuboid.faces.clone())
            .unwrap();

        assert_eq!(derived.edges, cuboid.edges);
    }

    #[test]
    fn open_mesh() {
        let cuboid = PolyhedronDefinition::cuboid(Vec3::ONE);
        let mut faces = cuboid.faces.clone();
        faces.pop();

        assert!(matches!(
            PolyhedronDefinition::from_faces(cuboid.points, faces),
            Err(PolyhedronError::EdgeRightFaceNotFound { .. })
        ));
    }

    #[test]
    fn duplicated_face() {
        let cuboid = PolyhedronDefinition::cuboid(Vec3::ONE);
        let mut faces = cuboid.faces.clone();
        faces.push(faces[0].clone());

        assert_eq!(
            PolyhedronDefinition::from_faces(cuboid.points, faces),
            Err(PolyhedronError::EdgeDuplicated { start: 2, end: 0 })
        );
    }
}
