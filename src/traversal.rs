// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Traversal orders shared by the software resize, the descriptor chain
//! builder and the validator.
//!
//! [`Traversal`] is the single definition of which input pixel feeds which
//! output pixel. [`RowChunks`] is the single definition of how a row is cut
//! into descriptor-sized pieces. Anything that needs to agree with the
//! hardware's view of an image walks one of these.

use crate::error::{Error, Result};
use core::fmt;
use std::str::FromStr;

/// Smallest supported scale factor.
pub const SCALE_FACTOR_MIN: u8 = 1;
/// Largest supported scale factor.
pub const SCALE_FACTOR_MAX: u8 = 4;

/// Whether the image grows or shrinks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Nearest-neighbour upsampling, each pixel repeated `factor` times on
    /// both axes.
    Increase,
    /// Nearest-neighbour decimation, every `factor`-th pixel on both axes
    /// starting at the origin.
    Decrease,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::Increase => write!(f, "inc"),
            Direction::Decrease => write!(f, "dec"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s {
            "increase" | "inc" | "1" => Ok(Direction::Increase),
            "decrease" | "dec" | "0" => Ok(Direction::Decrease),
            _ => Err(format!("unknown direction {s:?}")),
        }
    }
}

/// Integer scale factor and direction, validated on construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScaleSpec {
    factor: u8,
    direction: Direction,
}

impl ScaleSpec {
    /// # Errors
    ///
    /// Returns [`Error::InvalidScale`] if `factor` is outside
    /// [`SCALE_FACTOR_MIN`]..=[`SCALE_FACTOR_MAX`].
    pub fn new(factor: u8, direction: Direction) -> Result<Self> {
        if !(SCALE_FACTOR_MIN..=SCALE_FACTOR_MAX).contains(&factor) {
            return Err(Error::InvalidScale(factor));
        }
        Ok(Self { factor, direction })
    }

    pub fn factor(&self) -> u8 {
        self.factor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Output dimensions for an input of `width` x `height`.
    ///
    /// Increase multiplies both axes by the factor. Decrease divides and
    /// rounds up, so a partial block at the right or bottom edge still
    /// produces one pixel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeOverflow`] if an increased dimension does not fit
    /// in 32 bits.
    pub fn output_dimensions(&self, width: u32, height: u32) -> Result<(u32, u32)> {
        let factor = u32::from(self.factor);
        match self.direction {
            Direction::Increase => {
                let scale = |dimension: u32| {
                    dimension
                        .checked_mul(factor)
                        .ok_or(Error::SizeOverflow { dimension, factor })
                };
                Ok((scale(width)?, scale(height)?))
            }
            Direction::Decrease => Ok((width.div_ceil(factor), height.div_ceil(factor))),
        }
    }
}

impl fmt::Display for ScaleSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.direction, self.factor)
    }
}

/// One step of a resampling traversal: output pixel and the input pixel it
/// is taken from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample {
    pub out_row: u32,
    pub out_col: u32,
    pub in_row: u32,
    pub in_col: u32,
}

/// Lazy row-major walk over every output pixel of a resize.
///
/// For [`Direction::Increase`] the input coordinate is `out / factor`: the
/// input column advances once every `factor` outputs and the input row once
/// every `factor` full output rows. For [`Direction::Decrease`] it is
/// `out * factor` over `ceil(in / factor)` outputs per axis, which keeps the
/// last sample of a row or column inside the image for every width, height
/// and factor.
#[derive(Clone, Debug)]
pub struct Traversal {
    scale: ScaleSpec,
    out_width: u32,
    out_height: u32,
    out_row: u32,
    out_col: u32,
}

impl Traversal {
    /// Traversal for an input of `in_width` x `in_height`.
    pub fn new(in_width: u32, in_height: u32, scale: ScaleSpec) -> Result<Self> {
        let (out_width, out_height) = scale.output_dimensions(in_width, in_height)?;
        Ok(Self {
            scale,
            out_width,
            out_height,
            out_row: 0,
            out_col: 0,
        })
    }

    pub fn output_dimensions(&self) -> (u32, u32) {
        (self.out_width, self.out_height)
    }

    fn source(&self, out: u32) -> u32 {
        let factor = u32::from(self.scale.factor);
        match self.scale.direction {
            Direction::Increase => out / factor,
            Direction::Decrease => out * factor,
        }
    }

    fn remaining(&self) -> u64 {
        if self.out_width == 0 || self.out_row >= self.out_height {
            return 0;
        }
        let rows_left = u64::from(self.out_height - self.out_row);
        rows_left * u64::from(self.out_width) - u64::from(self.out_col)
    }
}

impl Iterator for Traversal {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        if self.out_width == 0 || self.out_row >= self.out_height {
            return None;
        }

        let sample = Sample {
            out_row: self.out_row,
            out_col: self.out_col,
            in_row: self.source(self.out_row),
            in_col: self.source(self.out_col),
        };

        self.out_col += 1;
        if self.out_col == self.out_width {
            self.out_col = 0;
            self.out_row += 1;
        }
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining()) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

/// A contiguous run of bytes within one image row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// Byte offset from the start of the row.
    pub offset: u32,
    /// Number of bytes, never above the ceiling the chunks were cut with.
    pub len: u16,
}

/// Number of chunks needed to cover `width` bytes with pieces of at most
/// `ceiling` bytes.
pub fn chunks_per_row(width: u32, ceiling: u16) -> u32 {
    width.div_ceil(u32::from(ceiling.max(1)))
}

/// Cuts one row into left-to-right chunks of at most `ceiling` bytes.
///
/// Every chunk but the last is exactly `ceiling` bytes; the last carries the
/// remainder, or a full `ceiling` if the width divides evenly.
#[derive(Clone, Debug)]
pub struct RowChunks {
    width: u32,
    ceiling: u32,
    offset: u32,
}

impl RowChunks {
    pub fn new(width: u32, ceiling: u16) -> Self {
        Self {
            width,
            ceiling: u32::from(ceiling.max(1)),
            offset: 0,
        }
    }
}

impl Iterator for RowChunks {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.offset >= self.width {
            return None;
        }
        let len = (self.width - self.offset).min(self.ceiling);
        let chunk = Chunk {
            offset: self.offset,
            len: len as u16,
        };
        self.offset += len;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.width - self.offset.min(self.width)).div_ceil(self.ceiling) as usize;
        (n, Some(n))
    }
}
