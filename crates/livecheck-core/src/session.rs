use serde::Serialize;

use crate::config::LivenessConfig;
use crate::notify::Notification;
use crate::oval::OvalRegion;
use crate::steps::{
    evaluate_alignment, evaluate_blink, evaluate_head_turn, evaluate_smile, Evaluation, Step,
    StepRequirements,
};
use crate::types::Detection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "step", rename_all = "lowercase")]
pub enum SessionState {
    Active(Step),
    Complete,
    Cancelled,
}

/// What one frame did to the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutcome {
    /// The frame had exactly one face and reached a step evaluator.
    pub evaluated: bool,
    /// Notifications raised by this frame, in order.
    pub notifications: Vec<Notification>,
    /// This frame finished the last step.
    pub completed: bool,
}

/// Step state machine for one liveness session.
///
/// Owns the accumulated [`StepRequirements`] and the step-scoped counters,
/// routes each single-face frame to the active step's evaluator and advances
/// strictly forward: `Align → Turn → Blink → Smile → Complete`. Cancellation
/// is possible from any active step and is terminal.
#[derive(Debug, Clone)]
pub struct LivenessSession {
    config: LivenessConfig,
    oval: OvalRegion,
    state: SessionState,
    requirements: StepRequirements,
    aligned_frames: u32,
    eyes_closed: bool,
    frames_evaluated: u64,
}

impl LivenessSession {
    pub fn new(config: LivenessConfig) -> Self {
        let oval = OvalRegion::from_config(&config);
        Self {
            config,
            oval,
            state: SessionState::Active(Step::FIRST),
            requirements: StepRequirements::default(),
            aligned_frames: 0,
            eyes_closed: false,
            frames_evaluated: 0,
        }
    }

    pub fn config(&self) -> &LivenessConfig {
        &self.config
    }

    pub fn oval(&self) -> &OvalRegion {
        &self.oval
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The active step, or `None` once the session is complete or cancelled.
    pub fn current_step(&self) -> Option<Step> {
        match self.state {
            SessionState::Active(step) => Some(step),
            SessionState::Complete | SessionState::Cancelled => None,
        }
    }

    pub fn requirements(&self) -> &StepRequirements {
        &self.requirements
    }

    /// Current run of consecutive aligned frames (alignment step only).
    pub fn aligned_frames(&self) -> u32 {
        self.aligned_frames
    }

    pub fn frames_evaluated(&self) -> u64 {
        self.frames_evaluated
    }

    pub fn is_finished(&self) -> bool {
        self.current_step().is_none()
    }

    /// Feed one frame's detections. Frames with zero or several faces are
    /// skipped without touching any state, as are frames arriving after the
    /// session finished.
    pub fn process_frame(&mut self, detections: &[Detection]) -> FrameOutcome {
        let Some(step) = self.current_step() else {
            return FrameOutcome::default();
        };

        match detections {
            [detection] => self.evaluate(step, detection),
            _ => {
                tracing::trace!(faces = detections.len(), step = %step, "frame skipped");
                FrameOutcome::default()
            }
        }
    }

    /// Stop the session. Returns `false` if it had already finished.
    pub fn cancel(&mut self) -> bool {
        match self.state {
            SessionState::Active(step) => {
                tracing::info!(step = %step, "session cancelled");
                self.state = SessionState::Cancelled;
                true
            }
            SessionState::Complete | SessionState::Cancelled => false,
        }
    }

    fn evaluate(&mut self, step: Step, detection: &Detection) -> FrameOutcome {
        self.frames_evaluated += 1;

        let Evaluation { complete, event } = match step {
            Step::Align => evaluate_alignment(
                detection,
                &self.oval,
                &mut self.aligned_frames,
                self.config.aligned_frames_required,
            ),
            Step::Turn => evaluate_head_turn(detection, &mut self.requirements, &self.config),
            Step::Blink => evaluate_blink(
                detection,
                &mut self.requirements,
                &mut self.eyes_closed,
                &self.config,
            ),
            Step::Smile => {
                let (expression, probability) = detection.expressions.dominant();
                tracing::trace!(expression, probability, "expression");
                evaluate_smile(detection, &mut self.requirements, &self.config)
            }
        };

        let mut outcome = FrameOutcome {
            evaluated: true,
            notifications: event.into_iter().collect(),
            completed: false,
        };

        if complete {
            self.advance(step, &mut outcome);
        }
        outcome
    }

    fn advance(&mut self, finished: Step, outcome: &mut FrameOutcome) {
        tracing::info!(
            step = %finished,
            frames_evaluated = self.frames_evaluated,
            "step complete"
        );

        // Alignment run and eye state never carry over to another step.
        self.aligned_frames = 0;
        self.eyes_closed = false;

        match finished.next() {
            Some(next) => {
                self.state = SessionState::Active(next);
                outcome.notifications.push(Notification::StepStarted(next));
            }
            None => {
                self.state = SessionState::Complete;
                outcome.completed = true;
                outcome.notifications.push(Notification::Completed);
            }
        }
    }
}
