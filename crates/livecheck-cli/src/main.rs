use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod demo;
mod replay;
mod verify;

/// Guided on-camera liveness check.
#[derive(Parser)]
#[command(name = "livecheck", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check the detector networks are installed (and match SHA256SUMS if present)
    VerifyModels {
        /// Model directory (default: $LIVECHECK_MODEL_DIR or ~/.local/share/livecheck/models)
        #[arg(long)]
        model_dir: Option<PathBuf>,
    },
    /// Run a liveness session against a recorded JSON-lines detection trace
    Replay {
        /// Trace file, one `{"detections": [...]}` or `{"error": "..."}` per line
        trace: PathBuf,
        /// TOML file with session settings
        #[arg(long)]
        config: Option<PathBuf>,
        /// Verify this model directory before starting
        #[arg(long)]
        model_dir: Option<PathBuf>,
        /// Override the loop rate in frames per second
        #[arg(long)]
        fps: Option<u32>,
    },
    /// Write a scripted trace that passes every step
    DemoTrace {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::VerifyModels { model_dir } => verify::run(model_dir),
        Command::Replay {
            trace,
            config,
            model_dir,
            fps,
        } => {
            replay::run(replay::ReplayArgs {
                trace,
                config,
                model_dir,
                fps,
            })
            .await
        }
        Command::DemoTrace { output } => demo::run(output),
    }
}
