//! Detection loop: camera frame → face detector → step state machine.
//!
//! One loop per session, ticking at the configured frame interval. Each
//! iteration awaits the detector before the next tick is taken, so a slow
//! detector yields fewer evaluated frames instead of a backlog. The loop
//! ends when the last step completes or the session is cancelled; the
//! camera is released on every exit path.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::Instrument;
use uuid::Uuid;

use crate::camera::{Camera, CameraError, CameraGuard};
use crate::config::LivenessConfig;
use crate::detector::{DetectorError, FaceDetector};
use crate::notify::{Notification, Notifier};
use crate::session::{LivenessSession, SessionState};
use crate::steps::{Step, StepRequirements};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("detector models failed to load: {0}")]
    ModelLoad(#[source] DetectorError),
    #[error("camera failed to start: {0}")]
    Camera(#[source] CameraError),
    #[error("session task ended abnormally: {0}")]
    Join(String),
}

/// Host-side cancellation entry point. Cheap to clone; cancelling twice or
/// after completion has no effect.
#[derive(Debug, Clone)]
pub struct Canceller {
    tx: Arc<watch::Sender<bool>>,
}

impl Canceller {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Loop-side view of a [`Canceller`].
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// True once cancelled, or once every `Canceller` has been dropped.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolves once cancelled. Dropping every `Canceller` counts as a
    /// cancel, so a host that drops its [`SessionHandle`] stops the loop.
    pub async fn cancelled(&mut self) {
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }
}

pub fn cancellation() -> (Canceller, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (Canceller { tx: Arc::new(tx) }, CancelToken { rx })
}

/// Summary of a finished session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(flatten)]
    pub state: SessionState,
    pub frames_captured: u64,
    /// Frames with exactly one face, routed to a step evaluator.
    pub frames_evaluated: u64,
    pub capture_errors: u64,
    pub detection_errors: u64,
    pub requirements: StepRequirements,
}

impl SessionReport {
    pub fn completed(&self) -> bool {
        self.state == SessionState::Complete
    }
}

#[derive(Debug, Default)]
struct LoopStats {
    frames_captured: u64,
    capture_errors: u64,
    detection_errors: u64,
}

/// Run one liveness session to completion or cancellation.
///
/// Loads the detector models, starts the camera, then evaluates frames until
/// the smile step completes (`on_complete` is invoked, exactly once) or
/// `cancel` fires (`on_complete` is never invoked). Model-load and camera
/// failures are reported through `notifier` and returned as errors; the
/// camera is never started when models fail to load.
pub async fn run_session<C, D, N, F>(
    camera: &mut C,
    detector: &mut D,
    notifier: &N,
    config: LivenessConfig,
    on_complete: F,
    cancel: CancelToken,
) -> Result<SessionReport, SessionError>
where
    C: Camera + ?Sized,
    D: FaceDetector,
    N: Notifier + ?Sized,
    F: FnOnce() + Send,
{
    let session_id = Uuid::new_v4();
    let span = tracing::info_span!("session", id = %session_id);
    drive(session_id, camera, detector, notifier, config, on_complete, cancel)
        .instrument(span)
        .await
}

async fn drive<C, D, N, F>(
    session_id: Uuid,
    camera: &mut C,
    detector: &mut D,
    notifier: &N,
    config: LivenessConfig,
    on_complete: F,
    mut cancel: CancelToken,
) -> Result<SessionReport, SessionError>
where
    C: Camera + ?Sized,
    D: FaceDetector,
    N: Notifier + ?Sized,
    F: FnOnce() + Send,
{
    let started_at = Utc::now();
    let mut session = LivenessSession::new(config);
    let mut stats = LoopStats::default();

    if let Err(e) = detector.load().await {
        tracing::error!(error = %e, "detector models failed to load");
        notifier.notify(&Notification::ModelLoadFailed(e.to_string()));
        return Err(SessionError::ModelLoad(e));
    }
    tracing::info!("detector models loaded");

    if cancel.is_cancelled() {
        session.cancel();
        notifier.notify(&Notification::Cancelled);
        return Ok(report(session_id, started_at, &session, &stats));
    }

    let mut camera = match CameraGuard::start(camera, &session.config().camera) {
        Ok(guard) => guard,
        Err(e) => {
            tracing::error!(error = %e, "camera failed to start");
            notifier.notify(&Notification::CameraUnavailable(e.to_string()));
            return Err(SessionError::Camera(e));
        }
    };

    notifier.notify(&Notification::StepStarted(Step::FIRST));

    let mut ticker = tokio::time::interval(session.config().frame_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut on_complete = Some(on_complete);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let frame = match camera.capture() {
            Ok(frame) => frame,
            Err(e) => {
                stats.capture_errors += 1;
                tracing::warn!(error = %e, "frame capture failed");
                continue;
            }
        };
        stats.frames_captured += 1;

        let detections = match detector.detect(&frame).await {
            Ok(detections) => detections,
            Err(e) => {
                stats.detection_errors += 1;
                tracing::warn!(error = %e, frame = stats.frames_captured, "face detection failed");
                continue;
            }
        };

        // Detection may have been slow; don't evaluate on behalf of a
        // session the host already cancelled.
        if cancel.is_cancelled() {
            break;
        }

        let outcome = session.process_frame(&detections);
        for notification in &outcome.notifications {
            notifier.notify(notification);
        }

        if outcome.completed {
            if let Some(callback) = on_complete.take() {
                callback();
            }
            break;
        }
    }

    if session.cancel() {
        notifier.notify(&Notification::Cancelled);
    }
    drop(camera);

    let report = report(session_id, started_at, &session, &stats);
    tracing::info!(
        state = ?report.state,
        frames_captured = report.frames_captured,
        frames_evaluated = report.frames_evaluated,
        "session finished"
    );
    Ok(report)
}

fn report(
    session_id: Uuid,
    started_at: DateTime<Utc>,
    session: &LivenessSession,
    stats: &LoopStats,
) -> SessionReport {
    SessionReport {
        session_id,
        started_at,
        finished_at: Utc::now(),
        state: session.state(),
        frames_captured: stats.frames_captured,
        frames_evaluated: session.frames_evaluated(),
        capture_errors: stats.capture_errors,
        detection_errors: stats.detection_errors,
        requirements: *session.requirements(),
    }
}

/// A session running on its own tokio task. Dropping the handle cancels
/// the session.
pub struct SessionHandle {
    canceller: Canceller,
    task: JoinHandle<Result<SessionReport, SessionError>>,
}

impl SessionHandle {
    pub fn canceller(&self) -> Canceller {
        self.canceller.clone()
    }

    pub fn cancel(&self) {
        self.canceller.cancel();
    }

    /// Tear the session down without waiting for the loop to observe a
    /// cancellation. The camera is still stopped.
    pub fn abort(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn join(self) -> Result<SessionReport, SessionError> {
        self.task
            .await
            .map_err(|e| SessionError::Join(e.to_string()))?
    }
}

/// Spawn [`run_session`] on the current tokio runtime, taking ownership of
/// the collaborators.
pub fn spawn_session<C, D, N, F>(
    mut camera: C,
    mut detector: D,
    notifier: N,
    config: LivenessConfig,
    on_complete: F,
) -> SessionHandle
where
    C: Camera + 'static,
    D: FaceDetector + 'static,
    N: Notifier + 'static,
    F: FnOnce() + Send + 'static,
{
    let (canceller, token) = cancellation();
    let task = tokio::spawn(async move {
        run_session(
            &mut camera,
            &mut detector,
            &notifier,
            config,
            on_complete,
            token,
        )
        .await
    });
    SessionHandle { canceller, task }
}
