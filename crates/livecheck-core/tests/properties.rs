use proptest::prelude::*;

use livecheck_core::synthetic::SyntheticFace;
use livecheck_core::{LivenessConfig, LivenessSession, SessionState, Step};

fn feed(session: &mut LivenessSession, face: SyntheticFace) -> bool {
    session
        .process_frame(std::slice::from_ref(&face.build()))
        .completed
}

/// A session already advanced to `target`.
fn session_at(target: Step, config: LivenessConfig) -> LivenessSession {
    let base = SyntheticFace::default();
    let mut session = LivenessSession::new(config);
    let required = session.config().aligned_frames_required;
    if target > Step::Align {
        for _ in 0..required {
            feed(&mut session, base);
        }
    }
    if target > Step::Turn {
        feed(&mut session, base.yaw(45.0));
        feed(&mut session, base.yaw(-45.0));
    }
    if target > Step::Blink {
        for _ in 0..session.config().blinks_required {
            feed(&mut session, base.eye_ratio(0.1));
            feed(&mut session, base);
        }
    }
    assert_eq!(session.current_step(), Some(target));
    session
}

fn longest_run(aligned: &[bool]) -> usize {
    aligned
        .split(|a| !a)
        .map(|run| run.len())
        .max()
        .unwrap_or(0)
}

/// Yaw values kept clear of the ±30° threshold.
fn yaw() -> impl Strategy<Value = f32> {
    prop_oneof![-70.0_f32..-30.5, -29.5_f32..29.5, 30.5_f32..70.0]
}

/// Eye ratios kept clear of the 0.2 threshold.
fn eye_ratio() -> impl Strategy<Value = f32> {
    prop_oneof![0.05_f32..0.19, 0.21_f32..0.4]
}

fn any_face() -> impl Strategy<Value = SyntheticFace> {
    (
        0.0_f32..300.0,
        0.0_f32..150.0,
        yaw(),
        eye_ratio(),
        0.0_f32..1.0,
    )
        .prop_map(|(x, y, yaw, ratio, happy)| {
            SyntheticFace::default()
                .at(x, y)
                .yaw(yaw)
                .eye_ratio(ratio)
                .happy(happy)
        })
}

proptest! {
    #[test]
    fn pt_alignment_needs_unbroken_run(aligned in prop::collection::vec(any::<bool>(), 0..120)) {
        let mut session = LivenessSession::new(LivenessConfig::default());
        let inside = SyntheticFace::default();
        let outside = SyntheticFace::default().at(5.0, 5.0);

        for &a in &aligned {
            if session.current_step() != Some(Step::Align) {
                break;
            }
            feed(&mut session, if a { inside } else { outside });
        }

        let advanced = session.current_step() == Some(Step::Turn);
        prop_assert_eq!(advanced, longest_run(&aligned) >= 30);
    }

    #[test]
    fn pt_head_turn_needs_both_directions(yaws in prop::collection::vec(yaw(), 0..40)) {
        let mut session = session_at(Step::Turn, LivenessConfig::default());
        for &y in &yaws {
            feed(&mut session, SyntheticFace::default().yaw(y));
        }

        let expected = yaws.iter().any(|&y| y > 30.0) && yaws.iter().any(|&y| y < -30.0);
        prop_assert_eq!(session.current_step() == Some(Step::Blink), expected);
    }

    #[test]
    fn pt_blink_per_frame_counts_closed_frames(ratios in prop::collection::vec(eye_ratio(), 0..30)) {
        let config = LivenessConfig { blink_debounce: false, ..Default::default() };
        let mut session = session_at(Step::Blink, config);
        for &r in &ratios {
            feed(&mut session, SyntheticFace::default().eye_ratio(r));
        }

        let closed = ratios.iter().filter(|&&r| r < 0.2).count();
        prop_assert_eq!(session.current_step() == Some(Step::Smile), closed >= 3);
    }

    #[test]
    fn pt_blink_debounced_counts_closures(ratios in prop::collection::vec(eye_ratio(), 0..30)) {
        let mut session = session_at(Step::Blink, LivenessConfig::default());
        for &r in &ratios {
            feed(&mut session, SyntheticFace::default().eye_ratio(r));
        }

        let closed: Vec<bool> = ratios.iter().map(|&r| r < 0.2).collect();
        let closures = closed
            .iter()
            .enumerate()
            .filter(|&(i, &c)| c && (i == 0 || !closed[i - 1]))
            .count();
        prop_assert_eq!(session.current_step() == Some(Step::Smile), closures >= 3);
    }

    #[test]
    fn pt_smile_completes_on_first_happy_frame(happy in prop::collection::vec(0.0_f32..1.0, 1..20)) {
        let mut session = session_at(Step::Smile, LivenessConfig::default());
        let mut completions = Vec::new();
        for (i, &h) in happy.iter().enumerate() {
            if feed(&mut session, SyntheticFace::default().happy(h)) {
                completions.push(i);
            }
        }

        let first = happy.iter().position(|&h| h > 0.7);
        prop_assert_eq!(completions.first().copied(), first);
        prop_assert!(completions.len() <= 1);
    }

    #[test]
    fn pt_steps_and_requirements_never_regress(faces in prop::collection::vec(any_face(), 0..200)) {
        let mut session = LivenessSession::new(LivenessConfig::default());
        let mut last_step = Step::Align;
        let mut last_req = *session.requirements();
        let mut completions = 0;

        for face in faces {
            if feed(&mut session, face) {
                completions += 1;
            }
            if let Some(step) = session.current_step() {
                prop_assert!(step >= last_step);
                last_step = step;
            }
            let req = *session.requirements();
            prop_assert!(req.blink_count() >= last_req.blink_count());
            prop_assert!(req.head_turn_left() || !last_req.head_turn_left());
            prop_assert!(req.head_turn_right() || !last_req.head_turn_right());
            prop_assert!(req.smile_detected() || !last_req.smile_detected());
            last_req = req;
        }

        prop_assert!(completions <= 1);
        prop_assert_eq!(completions == 1, session.state() == SessionState::Complete);
    }

    #[test]
    fn pt_cancel_stops_evaluation(
        before in prop::collection::vec(any_face(), 0..60),
        after in prop::collection::vec(any_face(), 1..60),
    ) {
        let mut session = LivenessSession::new(LivenessConfig::default());
        for face in before {
            feed(&mut session, face);
        }
        let was_active = !session.is_finished();
        prop_assert_eq!(session.cancel(), was_active);

        let evaluated = session.frames_evaluated();
        let req = *session.requirements();
        for face in after {
            prop_assert!(!feed(&mut session, face));
        }
        prop_assert_eq!(session.frames_evaluated(), evaluated);
        prop_assert_eq!(*session.requirements(), req);
    }
}
