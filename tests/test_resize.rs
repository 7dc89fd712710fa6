// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use acc_scale::{
    image::ImageBuffer,
    resize::{resize, resize_into},
    traversal::{Direction, Sample, ScaleSpec, Traversal},
    Error,
};
use std::error::Error as StdError;

fn ramp(width: u32, height: u32) -> Result<ImageBuffer, Error> {
    ImageBuffer::from_fn(width, height, |row, col| (row * width + col) as u8)
}

/// Counter-driven upsampling walk: the input column advances every
/// `factor` outputs and the input row every `factor` column wraps.
fn counter_increase(in_width: u32, out_width: u32, out_height: u32, factor: u32) -> Vec<(u32, u32)> {
    let (mut col_mul, mut row_mul, mut in_row, mut in_col) = (0, 0, 0, 0);
    let mut seq = Vec::new();
    for _ in 0..out_height {
        for _ in 0..out_width {
            seq.push((in_row, in_col));
            col_mul += 1;
            if col_mul == factor {
                col_mul = 0;
                in_col += 1;
                if in_col == in_width {
                    in_col = 0;
                    row_mul += 1;
                    if row_mul == factor {
                        row_mul = 0;
                        in_row += 1;
                    }
                }
            }
        }
    }
    seq
}

/// Stride walk that wraps once the column reaches `width - factor`. Only
/// meaningful for `width >= factor`.
fn wrapping_decrease(in_width: u32, out_width: u32, out_height: u32, factor: u32) -> Vec<(u32, u32)> {
    let (mut in_row, mut in_col) = (0, 0);
    let mut seq = Vec::new();
    for _ in 0..out_height {
        for _ in 0..out_width {
            seq.push((in_row, in_col));
            if in_col >= in_width - factor {
                in_row += factor;
                in_col = 0;
            } else {
                in_col += factor;
            }
        }
    }
    seq
}

#[test]
fn test_scale_spec_range() {
    assert!(matches!(
        ScaleSpec::new(0, Direction::Increase),
        Err(Error::InvalidScale(0))
    ));
    assert!(matches!(
        ScaleSpec::new(5, Direction::Decrease),
        Err(Error::InvalidScale(5))
    ));
    for factor in 1..=4 {
        assert!(ScaleSpec::new(factor, Direction::Increase).is_ok());
    }
}

#[test]
fn test_output_dimensions() -> Result<(), Box<dyn StdError>> {
    let dec3 = ScaleSpec::new(3, Direction::Decrease)?;
    assert_eq!(dec3.output_dimensions(10, 9)?, (4, 3));
    assert_eq!(dec3.output_dimensions(9, 10)?, (3, 4));
    assert_eq!(dec3.output_dimensions(2, 1)?, (1, 1));

    for factor in 1..=4u8 {
        let f = u32::from(factor);
        let inc = ScaleSpec::new(factor, Direction::Increase)?;
        let dec = ScaleSpec::new(factor, Direction::Decrease)?;
        for width in 1..=20 {
            for height in [1, 7, 12] {
                assert_eq!(inc.output_dimensions(width, height)?, (width * f, height * f));
                let expect = |d: u32| d / f + u32::from(d % f != 0);
                assert_eq!(
                    dec.output_dimensions(width, height)?,
                    (expect(width), expect(height))
                );
            }
        }
    }

    Ok(())
}

#[test]
fn test_size_overflow() -> Result<(), Box<dyn StdError>> {
    let inc2 = ScaleSpec::new(2, Direction::Increase)?;
    assert_eq!(inc2.output_dimensions(u32::MAX / 2, 1)?, (u32::MAX - 1, 2));
    assert!(matches!(
        inc2.output_dimensions(u32::MAX / 2 + 1, 1),
        Err(Error::SizeOverflow {
            dimension: 2147483648,
            factor: 2
        })
    ));
    assert!(matches!(
        Traversal::new(1, u32::MAX, ScaleSpec::new(4, Direction::Increase)?),
        Err(Error::SizeOverflow { .. })
    ));
    assert_eq!(
        ScaleSpec::new(4, Direction::Decrease)?.output_dimensions(u32::MAX, u32::MAX)?,
        (1 << 30, 1 << 30)
    );

    Ok(())
}

#[test]
fn test_increase_4x4() -> Result<(), Box<dyn StdError>> {
    let img = ramp(4, 4)?;
    let out = resize(&img, ScaleSpec::new(2, Direction::Increase)?)?;

    assert_eq!(out.dimensions(), (8, 8));
    for row in 0..8 {
        for col in 0..8 {
            assert_eq!(out.pixel(row, col), img.pixel(row / 2, col / 2));
        }
    }
    assert_eq!(out.row(0), &[0, 0, 1, 1, 2, 2, 3, 3]);
    assert_eq!(out.row(7), &[12, 12, 13, 13, 14, 14, 15, 15]);

    Ok(())
}

#[test]
fn test_decrease_4x4() -> Result<(), Box<dyn StdError>> {
    let img = ramp(4, 4)?;
    let out = resize(&img, ScaleSpec::new(2, Direction::Decrease)?)?;

    assert_eq!(out.dimensions(), (2, 2));
    assert_eq!(out.row(0), &[0, 2]);
    assert_eq!(out.row(1), &[8, 10]);

    Ok(())
}

#[test]
fn test_decrease_with_remainder() -> Result<(), Box<dyn StdError>> {
    let img = ramp(10, 7)?;
    let out = resize(&img, ScaleSpec::new(3, Direction::Decrease)?)?;

    assert_eq!(out.dimensions(), (4, 3));
    assert_eq!(out.row(0), &[0, 3, 6, 9]);
    assert_eq!(out.row(1), &[30, 33, 36, 39]);
    assert_eq!(out.row(2), &[60, 63, 66, 69]);

    let narrow = resize(&ramp(2, 2)?, ScaleSpec::new(4, Direction::Decrease)?)?;
    assert_eq!(narrow.dimensions(), (1, 1));
    assert_eq!(narrow.pixel(0, 0), 0);

    Ok(())
}

#[test]
fn test_factor_one_is_identity() -> Result<(), Box<dyn StdError>> {
    let img = ramp(9, 5)?;
    for direction in [Direction::Increase, Direction::Decrease] {
        assert_eq!(resize(&img, ScaleSpec::new(1, direction)?)?, img);
    }
    Ok(())
}

#[test]
fn test_round_trip() -> Result<(), Box<dyn StdError>> {
    for factor in 1..=4u8 {
        let f = u32::from(factor);
        let img = ImageBuffer::from_fn(3 * f, 2 * f, |row, col| (row * 31 + col * 7) as u8)?;
        let up = resize(&img, ScaleSpec::new(factor, Direction::Increase)?)?;
        let down = resize(&up, ScaleSpec::new(factor, Direction::Decrease)?)?;
        assert_eq!(down, img, "factor {}", factor);
    }
    Ok(())
}

#[test]
fn test_resize_into() -> Result<(), Box<dyn StdError>> {
    let img = ramp(6, 4)?;
    let scale = ScaleSpec::new(2, Direction::Decrease)?;

    let mut out = ImageBuffer::new(3, 2)?;
    resize_into(&img, &mut out, scale)?;
    assert_eq!(out, resize(&img, scale)?);

    let mut wrong = ImageBuffer::new(4, 2)?;
    match resize_into(&img, &mut wrong, scale) {
        Err(Error::DimensionMismatch { expected, actual }) => {
            assert_eq!(expected, (3, 2));
            assert_eq!(actual, (4, 2));
        }
        other => panic!("expected DimensionMismatch, got {other:?}"),
    }

    Ok(())
}

#[test]
fn test_traversal_order() -> Result<(), Box<dyn StdError>> {
    let samples: Vec<Sample> = Traversal::new(3, 2, ScaleSpec::new(2, Direction::Decrease)?)?.collect();
    let coords: Vec<_> = samples
        .iter()
        .map(|s| (s.out_row, s.out_col, s.in_row, s.in_col))
        .collect();
    assert_eq!(coords, vec![(0, 0, 0, 0), (0, 1, 0, 2)]);

    let traversal = Traversal::new(3, 2, ScaleSpec::new(3, Direction::Increase)?)?;
    assert_eq!(traversal.size_hint(), (54, Some(54)));
    assert_eq!(traversal.count(), 54);

    Ok(())
}

#[test]
fn test_increase_traversal_matches_counter_walk() -> Result<(), Box<dyn StdError>> {
    for factor in 1..=4u8 {
        let scale = ScaleSpec::new(factor, Direction::Increase)?;
        for width in 1..=9 {
            for height in 1..=6 {
                let traversal = Traversal::new(width, height, scale)?;
                let (out_width, out_height) = traversal.output_dimensions();
                let seq: Vec<_> = traversal.map(|s| (s.in_row, s.in_col)).collect();
                assert_eq!(
                    seq,
                    counter_increase(width, out_width, out_height, u32::from(factor)),
                    "{}x{} factor {}",
                    width,
                    height,
                    factor
                );
            }
        }
    }
    Ok(())
}

/// Every width/height/factor combination, including widths and heights that
/// are not multiples of the factor and widths below the factor.
#[test]
fn test_decrease_traversal_exhaustive() -> Result<(), Box<dyn StdError>> {
    for factor in 1..=4u8 {
        let f = u32::from(factor);
        let scale = ScaleSpec::new(factor, Direction::Decrease)?;
        for width in 1..=17 {
            for height in 1..=13 {
                let traversal = Traversal::new(width, height, scale)?;
                let (out_width, out_height) = traversal.output_dimensions();
                let samples: Vec<Sample> = traversal.collect();

                assert_eq!(samples.len() as u32, out_width * out_height);
                assert!(samples.iter().all(|s| s.in_row < height && s.in_col < width));
                assert!(samples
                    .iter()
                    .all(|s| s.in_row == s.out_row * f && s.in_col == s.out_col * f));

                let last = samples.last().map(|s| (s.in_row, s.in_col));
                assert_eq!(last, Some(((height - 1) / f * f, (width - 1) / f * f)));

                if width >= f {
                    let seq: Vec<_> = samples.iter().map(|s| (s.in_row, s.in_col)).collect();
                    assert_eq!(seq, wrapping_decrease(width, out_width, out_height, f));
                }
            }
        }
    }
    Ok(())
}
