// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! One complete processing request: software reference, hardware path and
//! validation, with elapsed-time markers around both paths.

use crate::{
    device::{Accelerator, TransferEngine},
    error::{Error, Result},
    image::ImageBuffer,
    orchestrator::Orchestrator,
    resize,
    traversal::ScaleSpec,
    validate,
};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{info, instrument};

/// Elapsed time of each processing path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timings {
    /// Marker `sw_scale`.
    pub software: Duration,
    /// Marker `hw_scale`.
    pub hardware: Duration,
}

impl Timings {
    /// Hardware speed-up over software, if the hardware time is measurable.
    pub fn speedup(&self) -> Option<f64> {
        (!self.hardware.is_zero())
            .then(|| self.software.as_secs_f64() / self.hardware.as_secs_f64())
    }

    /// Report record for an external sink.
    pub fn to_json(&self, scale: ScaleSpec, input: &ImageBuffer, output: &ImageBuffer) -> Value {
        json!({
            "scale": scale.to_string(),
            "input": { "width": input.width(), "height": input.height() },
            "output": { "width": output.width(), "height": output.height() },
            "sections": {
                "sw_scale": { "ns": self.software.as_nanos() as u64 },
                "hw_scale": { "ns": self.hardware.as_nanos() as u64 },
            },
            "speedup": self.speedup(),
        })
    }
}

/// Result of [`process`].
#[derive(Debug)]
pub struct Outcome {
    /// Software reference output.
    pub software: ImageBuffer,
    /// Accelerator output.
    pub hardware: ImageBuffer,
    pub timings: Timings,
    /// `Err(Error::ValidationMismatch)` if the accelerator output is wrong.
    pub validation: Result<()>,
}

impl Outcome {
    pub fn passed(&self) -> bool {
        self.validation.is_ok()
    }
}

/// Runs `input` through the software reference and the accelerator, then
/// validates the accelerator output by replaying the resize traversal.
///
/// A validation mismatch is reported in [`Outcome::validation`] rather than
/// returned as an error; every other failure aborts the request.
#[instrument(skip_all, fields(input = %input, scale = %scale))]
pub fn process<A: Accelerator, E: TransferEngine>(
    orchestrator: &mut Orchestrator<A, E>,
    input: &ImageBuffer,
    scale: ScaleSpec,
) -> Result<Outcome> {
    let now = Instant::now();
    let software = resize::resize(input, scale)?;
    let sw_elapsed = now.elapsed();

    let mut hardware = ImageBuffer::new(software.width(), software.height())?;
    let hw_elapsed = process_into(orchestrator, input, &mut hardware, scale)?;

    let validation = match validate::replay(input, &hardware, scale) {
        Ok(()) => Ok(()),
        Err(e @ Error::ValidationMismatch { .. }) => Err(e),
        Err(e) => return Err(e),
    };

    let timings = Timings {
        software: sw_elapsed,
        hardware: hw_elapsed,
    };
    info!(
        "sw_scale {:?} hw_scale {:?} validation {}",
        timings.software,
        timings.hardware,
        if validation.is_ok() { "passed" } else { "failed" }
    );

    Ok(Outcome {
        software,
        hardware,
        timings,
        validation,
    })
}

/// Runs only the hardware path into an existing buffer, clearing it first so
/// stale pixels from a previous run cannot pass validation.
pub fn process_into<A: Accelerator, E: TransferEngine>(
    orchestrator: &mut Orchestrator<A, E>,
    input: &ImageBuffer,
    hardware: &mut ImageBuffer,
    scale: ScaleSpec,
) -> Result<Duration> {
    hardware.fill_zero();
    orchestrator.run(input, hardware, scale)
}
