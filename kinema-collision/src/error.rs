use thiserror::Error;

/// Reason a polyhedron failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolyhedronError {
    #[error("Polyhedron contains non-finite points")]
    NotFinite,
    #[error("Face {face} references point {point} which does not exist")]
    FacePointOutOfRange { face: usize, point: u32 },
    #[error("Edge {edge} references a point which does not exist")]
    EdgePointOutOfRange { edge: usize },
    #[error("Edge {edge} references a face which does not exist")]
    EdgeFaceOutOfRange { edge: usize },
    #[error("Face {face} point indices do not continue from the previous face")]
    FaceIndicesNotContiguous { face: usize },
    #[error("Face {face} has fewer than three points")]
    FaceHasTooFewPoints { face: usize },
    #[error("Face {face} normal is not of unit length")]
    FaceNormalLength { face: usize },
    #[error("Face {face} is not planar")]
    FaceNotPlanar { face: usize },
    #[error("Face {face} is not wound counter clockwise around its normal")]
    FaceWindingNotPositive { face: usize },
    #[error("Polyhedron volume is not positive")]
    VolumeNotPositive,
    #[error("Directed edge {start} -> {end} appears in more than one face")]
    EdgeDuplicated { start: u32, end: u32 },
    #[error("No face contains edge {edge} in its forward direction")]
    EdgeLeftFaceNotFound { edge: usize },
    #[error("Edge {edge} left face does not contain it in its forward direction")]
    EdgeLeftFaceIncorrect { edge: usize },
    #[error("No face contains edge {edge} in its reverse direction")]
    EdgeRightFaceNotFound { edge: usize },
    #[error("Edge {edge} right face does not contain it in its reverse direction")]
    EdgeRightFaceIncorrect { edge: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SphereError {
    #[error("Sphere center or radius is not finite")]
    NotFinite,
    #[error("Sphere radius is not positive")]
    RadiusNotPositive,
}
