// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use acc_scale::{
    binfile,
    image::{ImageBuffer, Region},
    traversal::{Direction, ScaleSpec},
    Error,
};
use std::{error::Error as StdError, io, path::Path};

fn ramp(width: u32, height: u32) -> Result<ImageBuffer, Error> {
    ImageBuffer::from_fn(width, height, |row, col| (row * width + col) as u8)
}

#[test]
fn test_new_is_zeroed() -> Result<(), Box<dyn StdError>> {
    let img = ImageBuffer::new(640, 480)?;

    println!("{}", img);
    assert_eq!(img.dimensions(), (640, 480));
    assert_eq!(img.size(), 307200);
    assert!(img.rows().all(|row| row.len() == 640 && row.iter().all(|&px| px == 0)));

    Ok(())
}

#[test]
fn test_zero_sized() {
    assert!(matches!(
        ImageBuffer::new(0, 10),
        Err(Error::EmptyImage {
            width: 0,
            height: 10
        })
    ));
    assert!(matches!(
        ImageBuffer::new(10, 0),
        Err(Error::EmptyImage { .. })
    ));
}

/// Allocating and dropping a large image repeatedly must not accumulate
/// memory; each row is released with its buffer.
#[test]
fn test_cleanup() -> Result<(), Box<dyn StdError>> {
    for _ in 0..100 {
        let img = ImageBuffer::new(1920, 1080)?;
        assert_eq!(img.size(), 2073600);
    }

    Ok(())
}

#[test]
fn test_pixel_access() -> Result<(), Box<dyn StdError>> {
    let mut img = ramp(4, 4)?;
    assert_eq!(img.pixel(2, 3), 11);

    img.set_pixel(2, 3, 200);
    assert_eq!(img.pixel(2, 3), 200);
    assert_eq!(img.row(2), &[8, 9, 10, 200]);

    img.fill_zero();
    assert!(img.rows().flatten().all(|&px| px == 0));
    assert_eq!(img.dimensions(), (4, 4));

    Ok(())
}

#[test]
fn test_from_rows() -> Result<(), Box<dyn StdError>> {
    let img = ImageBuffer::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]])?;
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.pixel(1, 0), 4);

    let ragged = ImageBuffer::from_rows(vec![vec![1, 2, 3], vec![4, 5]]);
    assert!(matches!(ragged, Err(Error::DimensionMismatch { .. })));

    assert!(matches!(
        ImageBuffer::from_rows(Vec::new()),
        Err(Error::EmptyImage { .. })
    ));

    Ok(())
}

#[test]
fn test_extract_region() -> Result<(), Box<dyn StdError>> {
    let img = ramp(8, 6)?;
    let crop = img.extract_region(&Region::new(2, 3, 4, 3))?;

    assert_eq!(crop.dimensions(), (4, 3));
    assert_eq!(crop.row(0), &[19, 20, 21, 22]);
    assert_eq!(crop.row(2), &[35, 36, 37, 38]);

    let whole = img.extract_region(&Region::new(0, 0, 8, 6))?;
    assert_eq!(whole, img);

    Ok(())
}

#[test]
fn test_extract_region_out_of_bounds() -> Result<(), Box<dyn StdError>> {
    let img = ramp(8, 6)?;
    let before = img.clone();

    let rows = img.extract_region(&Region::new(4, 0, 8, 3));
    match rows {
        Err(Error::OutOfBounds {
            region,
            width,
            height,
        }) => {
            assert_eq!(region, Region::new(4, 0, 8, 3));
            assert_eq!((width, height), (8, 6));
        }
        other => panic!("expected OutOfBounds, got {other:?}"),
    }

    let cols = img.extract_region(&Region::new(0, 5, 4, 1));
    assert!(matches!(cols, Err(Error::OutOfBounds { .. })));

    let wrapping = img.extract_region(&Region::new(u32::MAX, 0, 2, 2));
    assert!(matches!(wrapping, Err(Error::OutOfBounds { .. })));

    assert_eq!(img, before);

    Ok(())
}

#[test]
fn test_binfile_roundtrip() -> Result<(), Box<dyn StdError>> {
    let img = ramp(5, 3)?;
    let mut bytes = Vec::new();
    binfile::write(&mut bytes, &img)?;

    assert_eq!(&bytes[..8], &[5, 0, 0, 0, 3, 0, 0, 0]);
    assert_eq!(bytes.len(), 8 + 15);

    let back = binfile::read(bytes.as_slice())?;
    assert_eq!(back, img);

    Ok(())
}

#[test]
fn test_binfile_rejects_bad_input() {
    let truncated = [2u8, 0, 0, 0, 2, 0, 0, 0, 1, 2, 3];
    match binfile::read(truncated.as_slice()) {
        Err(Error::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
        other => panic!("expected UnexpectedEof, got {other:?}"),
    }

    let mut inflated = vec![0xff, 0xff, 0, 0, 0xff, 0xff, 0, 0];
    inflated.extend_from_slice(&[7; 8]);
    match binfile::read(inflated.as_slice()) {
        Err(Error::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
        other => panic!("expected UnexpectedEof, got {other:?}"),
    }

    let empty = [0u8, 0, 0, 0, 2, 0, 0, 0];
    assert!(matches!(
        binfile::read(empty.as_slice()),
        Err(Error::EmptyImage { .. })
    ));
}

#[test]
fn test_output_path() -> Result<(), Box<dyn StdError>> {
    let dir = Path::new("/mnt/host/output");
    let path = binfile::output_path(dir, "hw", ScaleSpec::new(2, Direction::Increase)?);
    assert_eq!(path, Path::new("/mnt/host/output/out_hw_inc2.bin"));

    let path = binfile::output_path(dir, "sw", ScaleSpec::new(4, Direction::Decrease)?);
    assert_eq!(path, Path::new("/mnt/host/output/out_sw_dec4.bin"));

    Ok(())
}
