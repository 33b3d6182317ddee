//! Livecheck core: guided on-camera liveness check.
//!
//! A session walks the user through four challenges (face alignment, head
//! turns, blinking, smiling), judged frame by frame from face landmarks and
//! expression probabilities supplied by an external detector.

pub mod camera;
pub mod config;
pub mod detector;
pub mod driver;
pub mod geometry;
pub mod notify;
pub mod oval;
pub mod session;
pub mod steps;
pub mod synthetic;
pub mod types;

use std::path::PathBuf;

pub use camera::{BlankCamera, Camera, CameraError, Frame};
pub use config::{CameraSettings, FacingMode, LivenessConfig};
pub use detector::{DetectorError, FaceDetector};
pub use driver::{
    cancellation, run_session, spawn_session, CancelToken, Canceller, SessionError,
    SessionHandle, SessionReport,
};
pub use notify::{Notification, Notifier, RecordingNotifier, TracingNotifier};
pub use oval::OvalRegion;
pub use session::{FrameOutcome, LivenessSession, SessionState};
pub use steps::{Step, StepRequirements, TurnDirection};
pub use types::{Detection, Expressions, FaceBox, LandmarkError, Landmarks, Point};

/// Directory holding the detector networks.
///
/// `LIVECHECK_MODEL_DIR` if set, else `$XDG_DATA_HOME/livecheck/models`,
/// else `~/.local/share/livecheck/models`.
pub fn default_model_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LIVECHECK_MODEL_DIR") {
        return PathBuf::from(dir);
    }
    let data_home = std::env::var("XDG_DATA_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        format!("{home}/.local/share")
    });
    PathBuf::from(data_home).join("livecheck/models")
}
