// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "barscan")]
#[command(about = "Continuous barcode scanning pipeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay image files through the scan pipeline and log stabilized
    /// detections
    Scan {
        /// Image files to replay as frames
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Replay rate in frames per second (default: 10)
        #[arg(long)]
        fps: Option<u32>,

        /// Consecutive empty frames before a detection is dropped
        #[arg(long, default_value = "3")]
        miss_threshold: u32,

        /// Loop over the image list until interrupted
        #[arg(long = "loop")]
        looping: bool,

        /// JSON session config file (overrides --miss-threshold)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Decode a single image and print its symbols
    Decode {
        /// Image file to decode
        image: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=barscan=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            images,
            fps,
            miss_threshold,
            looping,
            config,
        } => cli::scan(images, fps, miss_threshold, looping, config),
        Commands::Decode { image } => cli::decode(image),
    }
}
