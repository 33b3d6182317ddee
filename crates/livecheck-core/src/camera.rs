use image::RgbImage;
use thiserror::Error;

use crate::config::CameraSettings;

/// One captured video frame.
pub type Frame = RgbImage;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("camera access denied: {0}")]
    PermissionDenied(String),
    #[error("camera not available: {0}")]
    Unavailable(String),
    #[error("frame capture failed: {0}")]
    Capture(String),
}

/// Live video source owned by a session.
///
/// `start` is called once before the first capture; `stop` releases the
/// device and must be safe to call more than once.
pub trait Camera: Send {
    fn start(&mut self, settings: &CameraSettings) -> Result<(), CameraError>;
    fn capture(&mut self) -> Result<Frame, CameraError>;
    fn stop(&mut self);
}

/// Keeps a started camera for the lifetime of a session and stops it when
/// dropped, whichever way the session ends.
pub(crate) struct CameraGuard<'a, C: Camera + ?Sized> {
    camera: &'a mut C,
}

impl<'a, C: Camera + ?Sized> CameraGuard<'a, C> {
    pub(crate) fn start(camera: &'a mut C, settings: &CameraSettings) -> Result<Self, CameraError> {
        camera.start(settings)?;
        tracing::info!(
            width = settings.width,
            height = settings.height,
            facing = ?settings.facing,
            "camera started"
        );
        Ok(Self { camera })
    }

    pub(crate) fn capture(&mut self) -> Result<Frame, CameraError> {
        self.camera.capture()
    }
}

impl<C: Camera + ?Sized> Drop for CameraGuard<'_, C> {
    fn drop(&mut self) {
        self.camera.stop();
        tracing::info!("camera stopped");
    }
}

/// Produces blank frames at the requested resolution. Stands in for a real
/// device when detections come from somewhere other than pixels.
#[derive(Debug, Default)]
pub struct BlankCamera {
    frame: Option<Frame>,
}

impl BlankCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.frame.is_some()
    }
}

impl Camera for BlankCamera {
    fn start(&mut self, settings: &CameraSettings) -> Result<(), CameraError> {
        self.frame = Some(RgbImage::new(settings.width, settings.height));
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        self.frame
            .clone()
            .ok_or_else(|| CameraError::Capture("camera not started".to_string()))
    }

    fn stop(&mut self) {
        self.frame = None;
    }
}
