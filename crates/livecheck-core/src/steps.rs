//! The four behavioural challenges and their per-frame evaluators.
//!
//! Each evaluator looks at the single face detected in the current frame,
//! updates the state it owns and reports whether its step is now satisfied.
//! Evaluators never move state backwards: counts only grow and flags only
//! go from `false` to `true` (the alignment run counter is the exception,
//! it is step-scoped and resets on a misaligned frame).

use serde::Serialize;
use std::fmt;

use crate::config::LivenessConfig;
use crate::geometry::{head_yaw, mean_eye_aspect_ratio};
use crate::notify::Notification;
use crate::oval::OvalRegion;
use crate::types::Detection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Align,
    Turn,
    Blink,
    Smile,
}

impl Step {
    pub const COUNT: u8 = 4;
    pub const FIRST: Step = Step::Align;

    /// 1-based position in the sequence.
    pub fn number(self) -> u8 {
        match self {
            Step::Align => 1,
            Step::Turn => 2,
            Step::Blink => 3,
            Step::Smile => 4,
        }
    }

    pub fn next(self) -> Option<Step> {
        match self {
            Step::Align => Some(Step::Turn),
            Step::Turn => Some(Step::Blink),
            Step::Blink => Some(Step::Smile),
            Step::Smile => None,
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            Step::Align => "Position your face within the oval frame",
            Step::Turn => "Turn your head slowly left and right",
            Step::Blink => "Blink three times naturally",
            Step::Smile => "Smile naturally",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Align => "align",
            Step::Turn => "turn",
            Step::Blink => "blink",
            Step::Smile => "smile",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnDirection {
    Left,
    Right,
}

/// Accumulated behavioural evidence for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StepRequirements {
    blink_count: u32,
    head_turn_right: bool,
    head_turn_left: bool,
    smile_detected: bool,
}

impl StepRequirements {
    pub fn blink_count(&self) -> u32 {
        self.blink_count
    }

    pub fn head_turn_right(&self) -> bool {
        self.head_turn_right
    }

    pub fn head_turn_left(&self) -> bool {
        self.head_turn_left
    }

    pub fn smile_detected(&self) -> bool {
        self.smile_detected
    }
}

/// Outcome of evaluating one frame against the active step.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evaluation {
    pub complete: bool,
    pub event: Option<Notification>,
}

impl Evaluation {
    fn pending() -> Self {
        Self::default()
    }
}

/// Step 1: count consecutive frames with the face inside the oval.
///
/// A misaligned frame resets `aligned_frames` to zero. Completes on the
/// frame where the run reaches `required`.
pub fn evaluate_alignment(
    detection: &Detection,
    oval: &OvalRegion,
    aligned_frames: &mut u32,
    required: u32,
) -> Evaluation {
    if !oval.contains(&detection.face_box) {
        *aligned_frames = 0;
        return Evaluation::pending();
    }

    *aligned_frames = aligned_frames.saturating_add(1);
    if *aligned_frames >= required {
        Evaluation {
            complete: true,
            event: Some(Notification::FaceAligned),
        }
    } else {
        Evaluation::pending()
    }
}

/// Step 2: latch a right turn and a left turn, in either order.
pub fn evaluate_head_turn(
    detection: &Detection,
    requirements: &mut StepRequirements,
    config: &LivenessConfig,
) -> Evaluation {
    let landmarks = &detection.landmarks;
    let mut yaw = head_yaw(landmarks.nose(), landmarks.jaw_outline());
    if config.mirrored {
        yaw = -yaw;
    }

    let mut event = None;
    if yaw > config.yaw_threshold_deg && !requirements.head_turn_right {
        requirements.head_turn_right = true;
        event = Some(Notification::TurnDetected(TurnDirection::Right));
    } else if yaw < -config.yaw_threshold_deg && !requirements.head_turn_left {
        requirements.head_turn_left = true;
        event = Some(Notification::TurnDetected(TurnDirection::Left));
    }

    Evaluation {
        complete: requirements.head_turn_right && requirements.head_turn_left,
        event,
    }
}

/// Step 3: count blinks until `blinks_required` is reached.
///
/// With `blink_debounce` a blink is counted on the frame the eyes close and
/// the eyes must reopen before the next one counts. Without it every closed
/// frame counts. `eyes_closed` carries the previous frame's eye state.
pub fn evaluate_blink(
    detection: &Detection,
    requirements: &mut StepRequirements,
    eyes_closed: &mut bool,
    config: &LivenessConfig,
) -> Evaluation {
    let ratio = mean_eye_aspect_ratio(&detection.landmarks);
    let closed = ratio < config.ear_threshold;
    let counts = closed && !(config.blink_debounce && *eyes_closed);
    *eyes_closed = closed;

    let mut event = None;
    if counts {
        requirements.blink_count = requirements.blink_count.saturating_add(1);
        event = Some(Notification::BlinkDetected {
            count: requirements.blink_count,
            required: config.blinks_required,
        });
    }

    Evaluation {
        complete: requirements.blink_count >= config.blinks_required,
        event,
    }
}

/// Step 4: a single frame with `happy` above the threshold completes the step.
pub fn evaluate_smile(
    detection: &Detection,
    requirements: &mut StepRequirements,
    config: &LivenessConfig,
) -> Evaluation {
    let smiling = detection.expressions.happy > config.smile_threshold;
    if requirements.smile_detected || !smiling {
        return Evaluation::pending();
    }

    requirements.smile_detected = true;
    Evaluation {
        complete: true,
        event: Some(Notification::SmileDetected),
    }
}
