// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::error::{Error, Result};
use core::fmt;
use tracing::debug;

/// Rectangle selecting part of an image for processing.
///
/// Used once to crop the loaded image before it enters the resampling
/// pipeline; it is not kept afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    /// Row of the top-left corner
    pub row: u32,
    /// Column of the top-left corner
    pub col: u32,
    /// Width of the rectangle in pixels
    pub width: u32,
    /// Height of the rectangle in pixels
    pub height: u32,
}

impl Region {
    pub fn new(row: u32, col: u32, width: u32, height: u32) -> Self {
        Self {
            row,
            col,
            width,
            height,
        }
    }

    fn fits(&self, width: u32, height: u32) -> bool {
        u64::from(self.row) + u64::from(self.height) <= u64::from(height)
            && u64::from(self.col) + u64::from(self.width) <= u64::from(width)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}x{} at [{},{}]",
            self.width, self.height, self.row, self.col
        )
    }
}

/// Grayscale image made of independently owned rows of single-byte pixels.
///
/// Every row holds exactly `width` bytes and both dimensions are non-zero.
/// Rows are separate allocations because each one is handed to the transfer
/// engines as its own scatter-gather segment.
///
/// # Example
///
/// ```
/// use acc_scale::image::{ImageBuffer, Region};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let img = ImageBuffer::from_fn(4, 4, |row, col| (row * 4 + col) as u8)?;
/// let crop = img.extract_region(&Region::new(1, 1, 2, 2))?;
///
/// assert_eq!(crop.row(0), &[5, 6]);
/// assert_eq!(crop.row(1), &[9, 10]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    rows: Vec<Vec<u8>>,
}

pub(crate) fn alloc_row(width: u32) -> Result<Vec<u8>> {
    let bytes = width as usize;
    let mut row = Vec::new();
    row.try_reserve_exact(bytes)
        .map_err(|_| Error::AllocationFailure { bytes })?;
    row.resize(bytes, 0);
    Ok(row)
}

/// Converts a row length or row count to a 32-bit dimension.
fn dimension(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::AllocationFailure { bytes: len })
}

impl ImageBuffer {
    /// Allocates a zero-filled image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyImage`] if either dimension is zero and
    /// [`Error::AllocationFailure`] if any row cannot be allocated. Rows
    /// allocated before the failure are released before returning.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyImage { width, height });
        }

        let mut rows = Vec::new();
        rows.try_reserve_exact(height as usize)
            .map_err(|_| Error::AllocationFailure {
                bytes: height as usize * std::mem::size_of::<Vec<u8>>(),
            })?;
        for _ in 0..height {
            rows.push(alloc_row(width)?);
        }

        Ok(Self {
            width,
            height,
            rows,
        })
    }

    /// Allocates an image and fills each pixel from `f(row, col)`.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> u8) -> Result<Self> {
        let mut img = Self::new(width, height)?;
        for (r, row) in img.rows.iter_mut().enumerate() {
            for (c, px) in row.iter_mut().enumerate() {
                *px = f(r as u32, c as u32);
            }
        }
        Ok(img)
    }

    /// Builds an image from rows that were filled elsewhere (file loader).
    ///
    /// All rows must have the same, non-zero length.
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self> {
        let height = dimension(rows.len())?;
        let width = dimension(rows.first().map_or(0, Vec::len))?;
        if width == 0 || height == 0 {
            return Err(Error::EmptyImage { width, height });
        }
        if let Some(bad) = rows.iter().find(|r| r.len() != width as usize) {
            return Err(Error::DimensionMismatch {
                expected: (width, height),
                actual: (dimension(bad.len()).unwrap_or(u32::MAX), height),
            });
        }
        Ok(Self {
            width,
            height,
            rows,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Total number of pixel bytes.
    pub fn size(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn row(&self, row: u32) -> &[u8] {
        &self.rows[row as usize]
    }

    pub fn row_mut(&mut self, row: u32) -> &mut [u8] {
        &mut self.rows[row as usize]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn pixel(&self, row: u32, col: u32) -> u8 {
        debug_assert!(row < self.height && col < self.width, "pixel [{row},{col}] outside {self}");
        self.rows[row as usize][col as usize]
    }

    pub fn set_pixel(&mut self, row: u32, col: u32, value: u8) {
        debug_assert!(row < self.height && col < self.width, "pixel [{row},{col}] outside {self}");
        self.rows[row as usize][col as usize] = value;
    }

    /// Clears every pixel to zero, keeping the allocation.
    pub fn fill_zero(&mut self) {
        for row in &mut self.rows {
            row.fill(0);
        }
    }

    /// Copies `region` into a freshly allocated image.
    ///
    /// The source is left untouched; the caller drops it once it is no longer
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the region reaches past the source
    /// edges, [`Error::EmptyImage`] for a zero-sized region and
    /// [`Error::AllocationFailure`] if the copy cannot be allocated.
    pub fn extract_region(&self, region: &Region) -> Result<Self> {
        if !region.fits(self.width, self.height) {
            return Err(Error::OutOfBounds {
                region: *region,
                width: self.width,
                height: self.height,
            });
        }

        let mut out = Self::new(region.width, region.height)?;
        let cols = region.col as usize..(region.col + region.width) as usize;
        for (dst, src) in out
            .rows
            .iter_mut()
            .zip(&self.rows[region.row as usize..(region.row + region.height) as usize])
        {
            dst.copy_from_slice(&src[cols.clone()]);
        }
        debug!("extracted {} from {}", region, self);
        Ok(out)
    }
}

impl fmt::Display for ImageBuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{} gray8", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_rejects_lengths_past_u32() {
        assert_eq!(dimension(640).ok(), Some(640));
        assert_eq!(dimension(u32::MAX as usize).ok(), Some(u32::MAX));
        if let Some(len) = (u32::MAX as usize).checked_add(1) {
            assert!(matches!(
                dimension(len),
                Err(Error::AllocationFailure { bytes }) if bytes == len
            ));
        }
    }
}
