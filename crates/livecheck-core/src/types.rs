use serde::{Deserialize, Serialize};
use std::ops::Range;
use thiserror::Error;

/// Number of points in the iBUG 68-point facial landmark layout.
pub const LANDMARK_COUNT: usize = 68;

const JAW: Range<usize> = 0..17;
const NOSE: Range<usize> = 27..36;
const LEFT_EYE: Range<usize> = 36..42;
const RIGHT_EYE: Range<usize> = 42..48;

/// A 2D coordinate in video-frame pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned face bounding box in frame pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl FaceBox {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LandmarkError {
    #[error("expected 68 landmark points, got {0}")]
    WrongCount(usize),
}

/// The 68 facial landmark points of one detected face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct Landmarks {
    pub(crate) points: Vec<Point>,
}

impl Landmarks {
    pub fn new(points: Vec<Point>) -> Result<Self, LandmarkError> {
        if points.len() != LANDMARK_COUNT {
            return Err(LandmarkError::WrongCount(points.len()));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Jaw outline, ear to ear. Index 8 is the chin.
    pub fn jaw_outline(&self) -> &[Point] {
        &self.points[JAW]
    }

    /// Nose bridge (top first) followed by the lower nose contour.
    pub fn nose(&self) -> &[Point] {
        &self.points[NOSE]
    }

    pub fn left_eye(&self) -> &[Point] {
        &self.points[LEFT_EYE]
    }

    pub fn right_eye(&self) -> &[Point] {
        &self.points[RIGHT_EYE]
    }
}

impl TryFrom<Vec<Point>> for Landmarks {
    type Error = LandmarkError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<Landmarks> for Vec<Point> {
    fn from(landmarks: Landmarks) -> Self {
        landmarks.points
    }
}

/// Expression probabilities for one face. Values are in `[0, 1]` and sum
/// to roughly 1 across all seven expressions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Expressions {
    pub neutral: f32,
    pub happy: f32,
    pub sad: f32,
    pub angry: f32,
    pub fearful: f32,
    pub disgusted: f32,
    pub surprised: f32,
}

impl Expressions {
    /// The most probable expression and its probability.
    pub fn dominant(&self) -> (&'static str, f32) {
        [
            ("neutral", self.neutral),
            ("happy", self.happy),
            ("sad", self.sad),
            ("angry", self.angry),
            ("fearful", self.fearful),
            ("disgusted", self.disgusted),
            ("surprised", self.surprised),
        ]
        .into_iter()
        .fold(("neutral", f32::NEG_INFINITY), |best, cur| {
            if cur.1 > best.1 {
                cur
            } else {
                best
            }
        })
    }
}

/// One frame's result for a single face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(rename = "box")]
    pub face_box: FaceBox,
    pub landmarks: Landmarks,
    #[serde(default)]
    pub expressions: Expressions,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_points(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f32, 0.0)).collect()
    }

    #[test]
    fn test_landmarks_require_68_points() {
        assert_eq!(
            Landmarks::new(numbered_points(67)).unwrap_err(),
            LandmarkError::WrongCount(67)
        );
        assert!(Landmarks::new(numbered_points(68)).is_ok());
    }

    #[test]
    fn test_feature_slices_follow_68_point_layout() {
        let lm = Landmarks::new(numbered_points(68)).unwrap();
        assert_eq!(lm.jaw_outline().len(), 17);
        assert_eq!(lm.jaw_outline()[8].x, 8.0);
        assert_eq!(lm.nose()[0].x, 27.0);
        assert_eq!(lm.left_eye()[0].x, 36.0);
        assert_eq!(lm.right_eye()[5].x, 47.0);
    }

    #[test]
    fn test_expressions_dominant() {
        let expr = Expressions {
            happy: 0.8,
            neutral: 0.15,
            surprised: 0.05,
            ..Default::default()
        };
        assert_eq!(expr.dominant(), ("happy", 0.8));
        assert_eq!(Expressions::default().dominant(), ("neutral", 0.0));
    }

    #[test]
    fn test_detection_deserializes_with_partial_expressions() {
        let points: Vec<serde_json::Value> = (0..68)
            .map(|i| serde_json::json!({"x": i as f32, "y": 1.0}))
            .collect();
        let json = serde_json::json!({
            "box": {"x": 1.0, "y": 2.0, "width": 3.0, "height": 4.0},
            "landmarks": points,
            "expressions": {"happy": 0.9}
        });
        let det: Detection = serde_json::from_value(json).unwrap();
        assert_eq!(det.face_box.right(), 4.0);
        assert_eq!(det.expressions.happy, 0.9);
        assert_eq!(det.expressions.sad, 0.0);
    }

    #[test]
    fn test_detection_rejects_short_landmark_list() {
        let json = serde_json::json!({
            "box": {"x": 0.0, "y": 0.0, "width": 1.0, "height": 1.0},
            "landmarks": [{"x": 0.0, "y": 0.0}]
        });
        assert!(serde_json::from_value::<Detection>(json).is_err());
    }
}
