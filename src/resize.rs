// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Software reference for the accelerator: nearest-neighbour resize by an
//! integer factor.

use crate::{
    error::{Error, Result},
    image::ImageBuffer,
    traversal::{ScaleSpec, Traversal},
};
use tracing::{debug, instrument};

/// Resizes `input` into a newly allocated image.
///
/// Output dimensions follow [`ScaleSpec::output_dimensions`] and every output
/// pixel is taken from the input pixel named by [`Traversal`].
///
/// # Errors
///
/// Returns [`Error::SizeOverflow`] before allocating anything if an increased
/// dimension does not fit in 32 bits, or [`Error::AllocationFailure`] if the
/// output cannot be allocated.
///
/// # Example
///
/// ```
/// use acc_scale::{image::ImageBuffer, resize::resize, traversal::{Direction, ScaleSpec}};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let img = ImageBuffer::from_fn(4, 4, |row, col| (row * 4 + col) as u8)?;
/// let small = resize(&img, ScaleSpec::new(2, Direction::Decrease)?)?;
///
/// assert_eq!(small.row(0), &[0, 2]);
/// assert_eq!(small.row(1), &[8, 10]);
/// # Ok(())
/// # }
/// ```
#[instrument(skip_all, fields(input = %input, scale = %scale))]
pub fn resize(input: &ImageBuffer, scale: ScaleSpec) -> Result<ImageBuffer> {
    let traversal = Traversal::new(input.width(), input.height(), scale)?;
    let (width, height) = traversal.output_dimensions();
    let mut output = ImageBuffer::new(width, height)?;
    resample(input, &mut output, traversal);
    debug!("resized {} to {}", input, output);
    Ok(output)
}

/// Resizes `input` into an existing `output` of the expected dimensions.
///
/// # Errors
///
/// Returns [`Error::DimensionMismatch`] if `output` does not have the shape
/// `scale` produces for `input`.
pub fn resize_into(input: &ImageBuffer, output: &mut ImageBuffer, scale: ScaleSpec) -> Result<()> {
    let traversal = Traversal::new(input.width(), input.height(), scale)?;
    let expected = traversal.output_dimensions();
    if output.dimensions() != expected {
        return Err(Error::DimensionMismatch {
            expected,
            actual: output.dimensions(),
        });
    }
    resample(input, output, traversal);
    Ok(())
}

fn resample(input: &ImageBuffer, output: &mut ImageBuffer, traversal: Traversal) {
    for s in traversal {
        output.set_pixel(s.out_row, s.out_col, input.pixel(s.in_row, s.in_col));
    }
}
