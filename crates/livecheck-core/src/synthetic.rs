//! Synthetic detections with controllable geometry.
//!
//! Builds a plausible 68-point face whose bounding box, head yaw, eye
//! aspect ratio and smile probability are set directly. Used to script
//! demo traces and to drive the evaluators in tests.

use std::f32::consts::PI;

use crate::types::{Detection, Expressions, FaceBox, Landmarks, Point, LANDMARK_COUNT};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticFace {
    pub face_box: FaceBox,
    /// Head yaw in degrees, as read back by [`crate::geometry::head_yaw`].
    pub yaw_deg: f32,
    /// Eye aspect ratio applied to both eyes.
    pub eye_ratio: f32,
    pub happy: f32,
}

impl Default for SyntheticFace {
    /// A frontal, open-eyed, neutral face centred in a 640×480 frame.
    fn default() -> Self {
        Self {
            face_box: FaceBox::new(220.0, 110.0, 200.0, 260.0),
            yaw_deg: 0.0,
            eye_ratio: 0.3,
            happy: 0.05,
        }
    }
}

impl SyntheticFace {
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.face_box.x = x;
        self.face_box.y = y;
        self
    }

    pub fn sized(mut self, width: f32, height: f32) -> Self {
        self.face_box.width = width;
        self.face_box.height = height;
        self
    }

    pub fn yaw(mut self, deg: f32) -> Self {
        self.yaw_deg = deg;
        self
    }

    pub fn eye_ratio(mut self, ratio: f32) -> Self {
        self.eye_ratio = ratio;
        self
    }

    pub fn happy(mut self, happy: f32) -> Self {
        self.happy = happy;
        self
    }

    pub fn build(&self) -> Detection {
        let b = self.face_box;
        let cx = b.x + b.width / 2.0;
        let cy = b.y + b.height / 2.0;
        let mut points = vec![Point::new(cx, cy); LANDMARK_COUNT];

        // Jaw: lower half-ellipse, ear to ear, chin at index 8.
        let rx = b.width / 2.0;
        let ry = b.height / 2.0 - 10.0;
        for (i, p) in points[0..17].iter_mut().enumerate() {
            let angle = PI * i as f32 / 16.0;
            *p = Point::new(cx - rx * angle.cos(), cy + ry * angle.sin());
        }
        let chin = Point::new(cx, cy + ry);
        points[8] = chin;

        // Nose bridge top sits `len` px from the chin, rotated by the yaw.
        let len = b.height * 0.6;
        let (sin, cos) = self.yaw_deg.to_radians().sin_cos();
        let bridge = Point::new(chin.x + len * sin, chin.y - len * cos);
        for (i, p) in points[27..36].iter_mut().enumerate() {
            let t = i as f32 / 12.0;
            *p = Point::new(
                bridge.x + (chin.x - bridge.x) * t,
                bridge.y + (chin.y - bridge.y) * t,
            );
        }

        let eye_width = b.width * 0.15;
        let eye_y = cy - b.height * 0.15;
        write_eye(&mut points[36..42], cx - b.width * 0.2, eye_y, eye_width, self.eye_ratio);
        write_eye(&mut points[42..48], cx + b.width * 0.2, eye_y, eye_width, self.eye_ratio);

        let mouth_y = cy + b.height * 0.25;
        let mouth_half = b.width * 0.2;
        for (i, p) in points[48..68].iter_mut().enumerate() {
            let angle = 2.0 * PI * i as f32 / 20.0;
            *p = Point::new(cx + mouth_half * angle.cos(), mouth_y + 8.0 * angle.sin());
        }

        Detection {
            face_box: b,
            landmarks: Landmarks { points },
            expressions: Expressions {
                happy: self.happy,
                neutral: (1.0 - self.happy).max(0.0),
                ..Default::default()
            },
        }
    }
}

/// Six-point eye contour centred on `(cx, cy)` with the given aspect ratio.
fn write_eye(eye: &mut [Point], cx: f32, cy: f32, width: f32, ratio: f32) {
    let half_w = width / 2.0;
    let half_open = ratio * width / 2.0;
    let third = width / 6.0;
    eye[0] = Point::new(cx - half_w, cy);
    eye[1] = Point::new(cx - third, cy - half_open);
    eye[2] = Point::new(cx + third, cy - half_open);
    eye[3] = Point::new(cx + half_w, cy);
    eye[4] = Point::new(cx + third, cy + half_open);
    eye[5] = Point::new(cx - third, cy + half_open);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{head_yaw, mean_eye_aspect_ratio};
    use approx::assert_relative_eq;

    #[test]
    fn test_geometry_reads_back_requested_values() {
        let det = SyntheticFace::default().yaw(-35.0).eye_ratio(0.12).build();
        let lm = &det.landmarks;
        assert_relative_eq!(head_yaw(lm.nose(), lm.jaw_outline()), -35.0, epsilon = 1e-3);
        assert_relative_eq!(mean_eye_aspect_ratio(lm), 0.12, epsilon = 1e-5);
    }

    #[test]
    fn test_expressions_sum_to_one() {
        let det = SyntheticFace::default().happy(0.8).build();
        assert_relative_eq!(det.expressions.happy + det.expressions.neutral, 1.0);
    }
}
