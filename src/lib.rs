// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! # acc_scale
//!
//! Streams grayscale images through a nearest-neighbour resampling
//! accelerator using two scatter-gather DMA engines, and cross-checks the
//! accelerator's output against a software reference resize.
//!
//! ## Features
//!
//! - **Reference Resize**: Integer factor (1 to 4) nearest-neighbour
//!   upsampling and decimation in software.
//! - **Descriptor Chains**: Overflow-checked sizing and construction of
//!   32-byte aligned SGDMA descriptor tables for arbitrarily sized images.
//! - **Transfer Orchestration**: Configures the accelerator, runs the
//!   memory-to-stream and stream-to-memory engines concurrently and waits
//!   for both with a bounded timeout.
//! - **Validation**: Replays the resize traversal over the accelerator's
//!   output and reports the first mismatching pixel.
//! - **Simulation**: A threaded software model of the accelerator and both
//!   engines for hosts without the FPGA.
//!
//! ## Example
//!
//! ```
//! use acc_scale::{
//!     image::ImageBuffer,
//!     orchestrator::{Orchestrator, OrchestratorConfig},
//!     pipeline, sim,
//!     traversal::{Direction, ScaleSpec},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (acc, mm2s, s2mm) = sim::platform();
//! let mut orchestrator = Orchestrator::new(acc, mm2s, s2mm, OrchestratorConfig::default());
//!
//! let input = ImageBuffer::from_fn(64, 48, |row, col| (row ^ col) as u8)?;
//! let outcome = pipeline::process(&mut orchestrator, &input, ScaleSpec::new(3, Direction::Decrease)?)?;
//!
//! assert!(outcome.passed());
//! assert_eq!(outcome.hardware.dimensions(), (22, 16));
//! # Ok(())
//! # }
//! ```
//!
//! ## Safety
//!
//! Transfer engines work on raw descriptor and buffer addresses, as the
//! hardware does. The unsafe surface is [`device::TransferEngine::launch`];
//! [`orchestrator::Orchestrator`] upholds its contract by stopping both
//! engines before the descriptor chains and images they address go out of
//! scope.

pub mod binfile;
pub mod completion;
pub mod descriptor;
pub mod device;
pub mod error;
pub mod image;
pub mod orchestrator;
pub mod pipeline;
pub mod resize;
pub mod sim;
pub mod traversal;
pub mod validate;

pub use error::{Error, Result};
