//! `livecheck demo-trace` — writes a scripted trace that passes every step.

use anyhow::{Context, Result};
use livecheck_core::synthetic::SyntheticFace;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::replay::TraceFrame;

fn faces(face: SyntheticFace, frames: usize) -> impl Iterator<Item = TraceFrame> {
    let detection = face.build();
    std::iter::repeat_with(move || TraceFrame::Detections {
        detections: vec![detection.clone()],
    })
    .take(frames)
}

/// A user who wanders into frame, lines up, turns, blinks and smiles, with
/// the occasional empty, crowded and failed frame mixed in.
pub fn script() -> Vec<TraceFrame> {
    let face = SyntheticFace::default();
    let mut frames = Vec::new();

    frames.extend(faces(face.at(20.0, 40.0), 5));
    frames.push(TraceFrame::Detections {
        detections: vec![face.build(), face.at(440.0, 60.0).sized(150.0, 190.0).build()],
    });
    frames.extend(faces(face, 12));
    frames.push(TraceFrame::Detections { detections: vec![] });
    frames.extend(faces(face, 20));

    for yaw in [10.0, 25.0, 38.0, 20.0, 0.0, -15.0, -34.0, -10.0] {
        frames.extend(faces(face.yaw(yaw), 2));
    }

    frames.push(TraceFrame::Error {
        error: "detector timed out".to_string(),
    });
    for _ in 0..3 {
        frames.extend(faces(face.eye_ratio(0.12), 2));
        frames.extend(faces(face, 4));
    }

    frames.extend(faces(face.happy(0.4), 3));
    frames.extend(faces(face.happy(0.85), 1));
    frames
}

pub fn run(output: Option<PathBuf>) -> Result<()> {
    let mut out: Box<dyn Write> = match &output {
        Some(path) => Box::new(
            fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    let frames = script();
    for frame in &frames {
        serde_json::to_writer(&mut out, frame)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    if let Some(path) = output {
        eprintln!("wrote {} frames to {}", frames.len(), path.display());
    }
    Ok(())
}
