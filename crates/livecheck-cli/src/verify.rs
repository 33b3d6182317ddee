//! `livecheck verify-models` — checks the detector networks are installed.

use anyhow::{Context, Result};
use livecheck_models::{verify_models_dir, CHECKSUMS_FILE, MODELS};
use std::path::PathBuf;

pub fn run(model_dir: Option<PathBuf>) -> Result<()> {
    let dir = model_dir.unwrap_or_else(livecheck_core::default_model_dir);
    println!("Model directory: {}", dir.display());

    let summary = verify_models_dir(&dir)
        .with_context(|| format!("model verification failed in {}", dir.display()))?;

    for model in MODELS {
        println!("  {} ({} files) ok", model.name, model.files.len());
    }
    println!();
    if summary.digests_verified > 0 {
        println!(
            "{} file(s) present, {} digest(s) verified against {CHECKSUMS_FILE}.",
            summary.files_present, summary.digests_verified
        );
    } else {
        println!(
            "{} file(s) present. No {CHECKSUMS_FILE} found, digests not checked.",
            summary.files_present
        );
    }
    Ok(())
}
