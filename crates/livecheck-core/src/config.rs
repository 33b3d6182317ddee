use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which way the requested camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    #[default]
    User,
    Environment,
}

/// Resolution and facing mode requested from the camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub width: u32,
    pub height: u32,
    pub facing: FacingMode,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            facing: FacingMode::User,
        }
    }
}

/// Thresholds and cadence for a liveness session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivenessConfig {
    /// Size of the viewport the alignment oval is centred in.
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub oval_width: f32,
    pub oval_height: f32,
    /// Tolerance added on every side of the oval.
    pub oval_margin: f32,
    /// Consecutive aligned frames needed to finish the alignment step.
    pub aligned_frames_required: u32,
    /// Absolute yaw, in degrees, that counts as a head turn.
    pub yaw_threshold_deg: f32,
    /// Flip the yaw sign for mirrored (selfie-view) feeds.
    pub mirrored: bool,
    /// Mean eye aspect ratio below which the eyes count as closed.
    pub ear_threshold: f32,
    pub blinks_required: u32,
    /// Count one blink per closure instead of one per closed frame.
    pub blink_debounce: bool,
    /// `happy` probability above which a smile is accepted.
    pub smile_threshold: f32,
    /// Delay between detection loop iterations.
    pub frame_interval_ms: u64,
    pub camera: CameraSettings,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            viewport_width: 640.0,
            viewport_height: 480.0,
            oval_width: 280.0,
            oval_height: 350.0,
            oval_margin: 20.0,
            aligned_frames_required: 30,
            yaw_threshold_deg: 30.0,
            mirrored: false,
            ear_threshold: 0.2,
            blinks_required: 3,
            blink_debounce: true,
            smile_threshold: 0.7,
            frame_interval_ms: 16,
            camera: CameraSettings::default(),
        }
    }
}

impl LivenessConfig {
    /// Defaults overridden by `LIVECHECK_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from `LIVECHECK_*` environment variables.
    /// Unset or unparsable variables leave the current value in place.
    pub fn apply_env(&mut self) {
        self.viewport_width = env_or("LIVECHECK_VIEWPORT_WIDTH", self.viewport_width);
        self.viewport_height = env_or("LIVECHECK_VIEWPORT_HEIGHT", self.viewport_height);
        self.oval_width = env_or("LIVECHECK_OVAL_WIDTH", self.oval_width);
        self.oval_height = env_or("LIVECHECK_OVAL_HEIGHT", self.oval_height);
        self.oval_margin = env_or("LIVECHECK_OVAL_MARGIN", self.oval_margin);
        self.aligned_frames_required =
            env_or("LIVECHECK_ALIGNED_FRAMES", self.aligned_frames_required);
        self.yaw_threshold_deg = env_or("LIVECHECK_YAW_THRESHOLD", self.yaw_threshold_deg);
        self.mirrored = env_flag("LIVECHECK_MIRRORED", self.mirrored);
        self.ear_threshold = env_or("LIVECHECK_EAR_THRESHOLD", self.ear_threshold);
        self.blinks_required = env_or("LIVECHECK_BLINKS_REQUIRED", self.blinks_required);
        self.blink_debounce = env_flag("LIVECHECK_BLINK_DEBOUNCE", self.blink_debounce);
        self.smile_threshold = env_or("LIVECHECK_SMILE_THRESHOLD", self.smile_threshold);
        self.frame_interval_ms = env_or("LIVECHECK_FRAME_INTERVAL_MS", self.frame_interval_ms);
        self.camera.width = env_or("LIVECHECK_CAMERA_WIDTH", self.camera.width);
        self.camera.height = env_or("LIVECHECK_CAMERA_HEIGHT", self.camera.height);
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

fn env_or<T: std::str::FromStr>(key: &str, current: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(current)
}

fn env_flag(key: &str, current: bool) -> bool {
    std::env::var(key).map(|v| v != "0").unwrap_or(current)
}
