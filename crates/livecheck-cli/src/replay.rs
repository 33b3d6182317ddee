//! `livecheck replay` — runs a full session against a recorded detection trace.
//!
//! A trace is JSON lines, one line per frame: `{"detections": [...]}` for a
//! detector result or `{"error": "..."}` for a failed detection. Frames are
//! served in order on a blank camera; the session is cancelled once the
//! trace runs out.

use anyhow::{bail, Context, Result};
use livecheck_core::{
    cancellation, run_session, BlankCamera, Canceller, Detection, DetectorError, FaceDetector,
    Frame, LivenessConfig, TracingNotifier,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraceFrame {
    Detections { detections: Vec<Detection> },
    Error { error: String },
}

pub fn parse_trace(reader: impl BufRead) -> Result<Vec<TraceFrame>> {
    let mut frames = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read trace line {}", idx + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let frame = serde_json::from_str(&line)
            .with_context(|| format!("invalid trace frame on line {}", idx + 1))?;
        frames.push(frame);
    }
    Ok(frames)
}

/// Serves trace frames as detector output.
pub struct TraceDetector {
    frames: VecDeque<TraceFrame>,
    canceller: Canceller,
    model_dir: Option<PathBuf>,
}

impl TraceDetector {
    pub fn new(frames: Vec<TraceFrame>, canceller: Canceller, model_dir: Option<PathBuf>) -> Self {
        Self {
            frames: frames.into(),
            canceller,
            model_dir,
        }
    }
}

impl FaceDetector for TraceDetector {
    async fn load(&mut self) -> Result<(), DetectorError> {
        let Some(dir) = &self.model_dir else {
            return Ok(());
        };
        livecheck_models::verify_models_dir(dir)
            .map(|summary| {
                tracing::info!(
                    files = summary.files_present,
                    digests = summary.digests_verified,
                    "detector models verified"
                );
            })
            .map_err(|e| DetectorError::ModelLoad(e.to_string()))
    }

    async fn detect(&mut self, _frame: &Frame) -> Result<Vec<Detection>, DetectorError> {
        match self.frames.pop_front() {
            Some(TraceFrame::Detections { detections }) => Ok(detections),
            Some(TraceFrame::Error { error }) => Err(DetectorError::Inference(error)),
            None => {
                if !self.canceller.is_cancelled() {
                    tracing::info!("trace exhausted");
                    self.canceller.cancel();
                }
                Ok(Vec::new())
            }
        }
    }
}

pub struct ReplayArgs {
    pub trace: PathBuf,
    pub config: Option<PathBuf>,
    pub model_dir: Option<PathBuf>,
    pub fps: Option<u32>,
}

pub async fn run(args: ReplayArgs) -> Result<()> {
    let mut config = crate::config::load(args.config.as_deref())?;
    if let Some(fps) = args.fps.filter(|&fps| fps > 0) {
        config.frame_interval_ms = 1000 / u64::from(fps);
    }

    let frames = load_trace(&args.trace)?;
    tracing::info!(frames = frames.len(), trace = %args.trace.display(), "trace loaded");

    let report = replay(frames, config, args.model_dir).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.completed() {
        bail!("liveness check did not complete");
    }
    Ok(())
}

fn load_trace(path: &Path) -> Result<Vec<TraceFrame>> {
    let file = fs::File::open(path)
        .with_context(|| format!("failed to open trace {}", path.display()))?;
    parse_trace(std::io::BufReader::new(file))
}

async fn replay(
    frames: Vec<TraceFrame>,
    config: LivenessConfig,
    model_dir: Option<PathBuf>,
) -> Result<livecheck_core::SessionReport> {
    let (canceller, token) = cancellation();

    let interrupt = canceller.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted");
            interrupt.cancel();
        }
    });

    let mut camera = BlankCamera::new();
    let mut detector = TraceDetector::new(frames, canceller, model_dir);
    let result = run_session(
        &mut camera,
        &mut detector,
        &TracingNotifier,
        config,
        || tracing::info!("liveness check passed"),
        token,
    )
    .await;
    ctrl_c.abort();

    result.context("liveness session failed")
}
