// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use acc_scale::{
    image::Region,
    orchestrator::OrchestratorConfig,
    traversal::{self, SCALE_FACTOR_MAX, SCALE_FACTOR_MIN},
};
use clap::Parser;
use std::{path::PathBuf, time::Duration};
use tracing::level_filters::LevelFilter;

/// Resampling direction.
#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Copy)]
pub enum DirectionSetting {
    /// Upsample, each pixel repeated `scale` times on both axes
    Increase,
    /// Downsample, keep every `scale`-th pixel on both axes
    Decrease,
}

impl From<DirectionSetting> for traversal::Direction {
    fn from(value: DirectionSetting) -> Self {
        match value {
            DirectionSetting::Increase => traversal::Direction::Increase,
            DirectionSetting::Decrease => traversal::Direction::Decrease,
        }
    }
}

/// Command-line arguments for the acc_scale runner.
///
/// Every option can also be given through the environment variable named
/// in its help text.
///
/// # Example
///
/// ```bash
/// # Halve a crop of the image and keep both outputs
/// acc-scale input/lena.bin --scale 2 --direction decrease \
///     --region "0 0 256 256" --output-dir output
/// ```
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input image (.bin: u32 width, u32 height, row-major 8-bit pixels)
    pub input: PathBuf,

    /// Integer scale factor
    #[arg(
        short,
        long,
        env = "SCALE",
        default_value = "2",
        value_parser = clap::value_parser!(u8).range(i64::from(SCALE_FACTOR_MIN)..=i64::from(SCALE_FACTOR_MAX))
    )]
    pub scale: u8,

    /// Increase or decrease the resolution
    #[arg(short, long, env = "DIRECTION", default_value = "increase", value_enum)]
    pub direction: DirectionSetting,

    /// Process only part of the image (row col width height)
    #[arg(long, env = "REGION", value_delimiter = ' ', num_args = 4)]
    pub region: Option<Vec<u32>>,

    /// Directory to store software and hardware outputs in
    #[arg(short, long, env = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Maximum wait for both transfers to complete, in milliseconds
    #[arg(long, env = "TIMEOUT_MS", default_value = "5000")]
    pub timeout_ms: u64,

    /// Largest byte count placed in a single descriptor
    #[arg(
        long,
        env = "CHUNK_CEILING",
        default_value = "65535",
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub chunk_ceiling: u16,

    /// Number of times to run the request
    #[arg(
        long,
        env = "REPEAT",
        default_value = "1",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub repeat: u32,

    /// Application log level
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub rust_log: LevelFilter,

    /// Enable Tracy profiler for performance analysis
    #[arg(long, env = "TRACY")]
    pub tracy: bool,
}

impl Args {
    pub fn region(&self) -> Option<Region> {
        match self.region.as_deref() {
            Some(&[row, col, width, height]) => Some(Region::new(row, col, width, height)),
            _ => None,
        }
    }
}

impl From<&Args> for OrchestratorConfig {
    fn from(args: &Args) -> Self {
        OrchestratorConfig {
            timeout: Duration::from_millis(args.timeout_ms),
            chunk_ceiling: args.chunk_ceiling,
        }
    }
}
