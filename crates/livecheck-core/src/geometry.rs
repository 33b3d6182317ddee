//! Landmark geometry: point distance, eye aspect ratio and head yaw.
//!
//! All inputs are in video-frame pixel space, where `y` grows downward.

use crate::types::{Landmarks, Point};

/// Index of the chin in the 17-point jaw outline.
const CHIN: usize = 8;

/// Euclidean distance between two points.
pub fn distance(p1: Point, p2: Point) -> f32 {
    let dx = p1.x - p2.x;
    let dy = p1.y - p2.y;
    (dx * dx + dy * dy).sqrt()
}

/// Eye aspect ratio of a 6-point eye contour.
///
/// `eye[0]` and `eye[3]` are the corners, `eye[1]`, `eye[2]` the upper lid
/// and `eye[4]`, `eye[5]` the lower lid. Open eyes sit around 0.3; values
/// fall toward 0 as the lids close. A collapsed contour (zero width) yields
/// NaN, which never compares below a closed-eye threshold.
pub fn eye_aspect_ratio(eye: &[Point]) -> f32 {
    debug_assert!(eye.len() >= 6, "eye contour needs 6 points");
    let height = (distance(eye[1], eye[5]) + distance(eye[2], eye[4])) / 2.0;
    let width = distance(eye[0], eye[3]);
    if width == 0.0 {
        return f32::NAN;
    }
    height / width
}

/// Mean eye aspect ratio of both eyes.
pub fn mean_eye_aspect_ratio(landmarks: &Landmarks) -> f32 {
    (eye_aspect_ratio(landmarks.left_eye()) + eye_aspect_ratio(landmarks.right_eye())) / 2.0
}

/// Head yaw in degrees, from the top of the nose bridge relative to the chin.
///
/// The angle is measured against the upward vertical through the chin, so a
/// frontal face reads ~0°. This is `atan2(dx, dy)` with `dy` taken chin minus
/// nose; nose minus chin would read ~±180° for a frontal face in y-down pixels. Positive when the nose bridge sits to the right of
/// the chin in the frame, negative when it sits to the left.
pub fn head_yaw(nose: &[Point], jaw: &[Point]) -> f32 {
    let reference = jaw[CHIN];
    let measured = nose[0];
    (measured.x - reference.x)
        .atan2(reference.y - measured.y)
        .to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    /// Eye with corners 30 px apart and both lid pairs `opening` px apart.
    fn eye(opening: f32) -> Vec<Point> {
        let half = opening / 2.0;
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, -half),
            Point::new(20.0, -half),
            Point::new(30.0, 0.0),
            Point::new(20.0, half),
            Point::new(10.0, half),
        ]
    }

    fn jaw_with_chin(chin: Point) -> Vec<Point> {
        let mut jaw = vec![Point::default(); 17];
        jaw[CHIN] = chin;
        jaw
    }

    #[test]
    fn test_distance() {
        assert_relative_eq!(distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)), 5.0);
        assert_relative_eq!(distance(Point::new(2.0, 2.0), Point::new(2.0, 2.0)), 0.0);
    }

    #[rstest]
    #[case::open(9.0, 0.3)]
    #[case::near_closed(4.5, 0.15)]
    #[case::closed(0.0, 0.0)]
    fn test_eye_aspect_ratio(#[case] opening: f32, #[case] expected: f32) {
        assert_relative_eq!(eye_aspect_ratio(&eye(opening)), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_eye_aspect_ratio_collapsed_eye_is_nan() {
        let collapsed = vec![Point::new(5.0, 5.0); 6];
        let ratio = eye_aspect_ratio(&collapsed);
        assert!(ratio.is_nan());
        assert!(!(ratio < 0.2));
    }

    #[rstest]
    #[case::frontal(Point::new(100.0, 100.0), 0.0)]
    #[case::nose_right(Point::new(200.0, 100.0), 45.0)]
    #[case::nose_left(Point::new(0.0, 100.0), -45.0)]
    fn test_head_yaw(#[case] nose_top: Point, #[case] expected: f32) {
        let jaw = jaw_with_chin(Point::new(100.0, 200.0));
        let nose = vec![nose_top; 9];
        assert_relative_eq!(head_yaw(&nose, &jaw), expected, epsilon = 1e-4);
    }
}
