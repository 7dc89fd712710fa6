// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Raw grayscale image files: little-endian `u32` width, `u32` height, then
//! `height` rows of `width` bytes.

use crate::{
    error::{Error, Result},
    image::{alloc_row, ImageBuffer},
    traversal::ScaleSpec,
};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Reads an image from any reader.
///
/// # Errors
///
/// Fails with [`Error::EmptyImage`] for a zero dimension and with
/// [`Error::Io`] if the pixel payload is truncated. Rows are allocated one at
/// a time as the payload is read, so an inflated header cannot reserve the
/// whole image up front.
pub fn read(mut reader: impl Read) -> Result<ImageBuffer> {
    let mut word = [0u8; 4];
    reader.read_exact(&mut word)?;
    let width = u32::from_le_bytes(word);
    reader.read_exact(&mut word)?;
    let height = u32::from_le_bytes(word);

    if width == 0 || height == 0 {
        return Err(Error::EmptyImage { width, height });
    }

    let mut rows = Vec::new();
    for _ in 0..height {
        let mut row = alloc_row(width)?;
        reader.read_exact(&mut row)?;
        rows.push(row);
    }
    ImageBuffer::from_rows(rows)
}

/// Writes an image to any writer.
pub fn write(mut writer: impl Write, img: &ImageBuffer) -> Result<()> {
    writer.write_all(&img.width().to_le_bytes())?;
    writer.write_all(&img.height().to_le_bytes())?;
    for row in img.rows() {
        writer.write_all(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[instrument]
pub fn load(path: &Path) -> Result<ImageBuffer> {
    let img = read(BufReader::new(File::open(path)?))?;
    debug!("loaded {}", img);
    Ok(img)
}

#[instrument(skip(img))]
pub fn store(path: &Path, img: &ImageBuffer) -> Result<()> {
    write(BufWriter::new(File::create(path)?), img)?;
    debug!("stored {}", img);
    Ok(())
}

/// Output file name for one processing path, e.g. `out_hw_inc2.bin`.
pub fn output_path(dir: &Path, path: &str, scale: ScaleSpec) -> PathBuf {
    dir.join(format!("out_{}_{}.bin", path, scale))
}
