// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{descriptor::Transfer, image::Region};
use std::time::Duration;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Failures surfaced by a resampling run.
///
/// All of them abort the current run only. Whatever the run allocated is
/// owned by values that are dropped on the way out, so nothing leaks.
#[derive(Debug, Error)]
pub enum Error {
    /// The allocator could not satisfy a buffer or descriptor table request.
    #[error("unable to allocate {bytes} bytes")]
    AllocationFailure { bytes: usize },

    /// A crop region reaches outside its source image.
    #[error("region {region} exceeds {width}x{height} source image")]
    OutOfBounds {
        region: Region,
        width: u32,
        height: u32,
    },

    /// Scaling a dimension up would not fit in 32 bits.
    #[error("output dimension {dimension} * {factor} does not fit in 32 bits")]
    SizeOverflow { dimension: u32, factor: u32 },

    /// The descriptor table for an image would not fit in 32 bits.
    #[error("descriptor table for {width}x{height} image exceeds the 32-bit range")]
    DescriptorCountOverflow { width: u32, height: u32 },

    /// A transfer engine refused the head of its descriptor chain.
    #[error("{transfer} engine rejected the descriptor chain: {reason}")]
    LaunchFailure {
        transfer: Transfer,
        reason: String,
    },

    /// Hardware output differs from the reference.
    #[error("validation failed at pixel [{row},{col}]: expected {expected}, found {actual}")]
    ValidationMismatch {
        row: u32,
        col: u32,
        expected: u8,
        actual: u8,
    },

    /// A transfer did not signal completion in time.
    #[error("{transfer} transfer did not complete within {waited:?}")]
    Timeout { transfer: Transfer, waited: Duration },

    /// A completion notifier went away without signalling.
    #[error("{transfer} completion signal disconnected")]
    Disconnected { transfer: Transfer },

    #[error("scale factor {0} is outside [1, 4]")]
    InvalidScale(u8),

    #[error("image dimensions must be non-zero, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("expected a {}x{} image, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("accelerator register {0:#x} does not exist")]
    InvalidRegister(u8),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
