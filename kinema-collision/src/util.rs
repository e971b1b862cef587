use glam::Vec3;

/// Projects `point` onto the segment `start..end`
pub fn project_onto_segment(start: Vec3, end: Vec3, point: Vec3) -> Vec3 {
    let segment = end - start;
    let length_squared = segment.length_squared();
    if length_squared == 0.0 {
        return start;
    }

    let t = (point - start).dot(segment) / length_squared;
    start + segment * t.clamp(0.0, 1.0)
}

/// Returns the point halfway between the closest points of two infinite lines.
///
/// Parallel lines fall back to the average of all four points.
pub fn midpoint_between_lines(start_a: Vec3, end_a: Vec3, start_b: Vec3, end_b: Vec3) -> Vec3 {
    let difference = start_b - start_a;
    let a = end_a - start_a;
    let b = end_b - start_b;

    let da = difference.dot(a);
    let db = difference.dot(b);
    let aa = a.dot(a);
    let bb = b.dot(b);
    let ab = a.dot(b);

    let den = aa * bb - ab * ab;
    if den == 0.0 {
        return (start_a + end_a + start_b + end_b) / 4.0;
    }

    let factor_a = (da * bb - db * ab) / den;
    let factor_b = (da * ab - db * aa) / den;

    let closest_a = start_a + a * factor_a;
    let closest_b = start_b + b * factor_b;
    (closest_a + closest_b) / 2.0
}

#[cfg(test)]
mod tests {
    use glam::vec3;

    use super::*;

    #[test]
    fn segment_projection() {
        let (start, end) = (Vec3::ZERO, vec3(2.0, 0.0, 0.0));
        assert_eq!(project_onto_segment(start, end, vec3(1.0, 5.0, 0.0)), Vec3::X);
        assert_eq!(project_onto_segment(start, end, vec3(-1.0, 1.0, 0.0)), start);
        assert_eq!(project_onto_segment(start, end, vec3(3.0, 0.0, 1.0)), end);
        assert_eq!(project_onto_segment(start, start, Vec3::ONE), start);
    }

    #[test]
    fn line_midpoint() {
        let midpoint = midpoint_between_lines(
            vec3(-1.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(0.5, 2.0, -1.0),
            vec3(0.5, 2.0, 1.0),
        );
        assert!(midpoint.abs_diff_eq(vec3(0.5, 1.0, 0.0), 1e-6));

        let parallel = midpoint_between_lines(Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::X + Vec3::Y);
        assert!(parallel.abs_diff_eq(vec3(0.5, 0.5, 0.0), 1e-6));
    }
}
