// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Byte-exact checks of accelerator output. Both checks stop at the first
//! mismatching pixel and report its output coordinate.

use crate::{
    error::{Error, Result},
    image::ImageBuffer,
    traversal::{ScaleSpec, Traversal},
};
use tracing::{info, instrument, warn};

fn mismatch(row: u32, col: u32, expected: u8, actual: u8) -> Error {
    warn!("validation failed at pixel [{},{}]", row, col);
    Error::ValidationMismatch {
        row,
        col,
        expected,
        actual,
    }
}

/// Replays the resize traversal over `input` and checks every pixel of
/// `output` against the input pixel it must have been sampled from.
///
/// # Errors
///
/// Returns [`Error::DimensionMismatch`] if `output` is not the shape `scale`
/// produces for `input`, or [`Error::ValidationMismatch`] at the first pixel
/// that differs.
#[instrument(skip_all, fields(scale = %scale))]
pub fn replay(input: &ImageBuffer, output: &ImageBuffer, scale: ScaleSpec) -> Result<()> {
    let traversal = Traversal::new(input.width(), input.height(), scale)?;
    let expected = traversal.output_dimensions();
    if output.dimensions() != expected {
        return Err(Error::DimensionMismatch {
            expected,
            actual: output.dimensions(),
        });
    }

    for s in traversal {
        let want = input.pixel(s.in_row, s.in_col);
        let got = output.pixel(s.out_row, s.out_col);
        if want != got {
            return Err(mismatch(s.out_row, s.out_col, want, got));
        }
    }
    info!("validation: success");
    Ok(())
}

/// Compares `candidate` against `reference` pixel by pixel in row-major
/// order.
#[instrument(skip_all)]
pub fn compare(reference: &ImageBuffer, candidate: &ImageBuffer) -> Result<()> {
    if reference.dimensions() != candidate.dimensions() {
        return Err(Error::DimensionMismatch {
            expected: reference.dimensions(),
            actual: candidate.dimensions(),
        });
    }

    for (row, (want, got)) in reference.rows().zip(candidate.rows()).enumerate() {
        if let Some(col) = want.iter().zip(got).position(|(a, b)| a != b) {
            return Err(mismatch(row as u32, col as u32, want[col], got[col]));
        }
    }
    Ok(())
}
