use std::future::Future;
use thiserror::Error;

use crate::camera::Frame;
use crate::types::Detection;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("model load failed: {0}")]
    ModelLoad(String),
    #[error("detection failed: {0}")]
    Inference(String),
}

/// Face detector returning box, 68 landmarks and expressions for every face
/// in a frame.
///
/// `load` is awaited once per session before the camera starts. `detect`
/// is awaited once per loop iteration; a slow detector lowers the evaluated
/// frame rate rather than queueing frames.
pub trait FaceDetector: Send {
    fn load(&mut self) -> impl Future<Output = Result<(), DetectorError>> + Send;

    fn detect(
        &mut self,
        frame: &Frame,
    ) -> impl Future<Output = Result<Vec<Detection>, DetectorError>> + Send;
}
