//! Row-parallel rendering of normalized samples into packed integer pixels.

use snafu::ensure;

use crate::lut::LookupTable;
use crate::normalize::Sample;
use crate::parallel::Parallelism;
use crate::{OutputSizeMismatchSnafu, Result};

fn check_output(width: u32, height: u32, output: &[i32]) -> Result<usize> {
    let expected = width as usize * height as usize;
    ensure!(
        output.len() == expected,
        OutputSizeMismatchSnafu {
            expected,
            got: output.len(),
        }
    );
    Ok(width as usize)
}

/// Pack three 8-bit channels into one integer as `0x00RRGGBB`.
#[inline]
pub fn pack_rgb(r: i32, g: i32, b: i32) -> i32 {
    ((r & 0xFF) << 16) | ((g & 0xFF) << 8) | (b & 0xFF)
}

/// Render single sample pixels:
/// each output value is the sample widened to `i32`,
/// or the table's output for that sample.
pub(crate) fn render_gray<T: Sample>(
    samples: &[T],
    width: u32,
    height: u32,
    lut: Option<&dyn LookupTable>,
    output: &mut [i32],
    parallelism: &Parallelism,
) -> Result<()> {
    let width = check_output(width, height, output)?;
    match lut {
        Some(lut) => parallelism.for_each_row(output, width, |y, row| {
            let src = &samples[y * width..(y + 1) * width];
            for (out, sample) in row.iter_mut().zip(src) {
                *out = lut.lookup(sample.widen());
            }
        }),
        None => parallelism.for_each_row(output, width, |y, row| {
            let src = &samples[y * width..(y + 1) * width];
            for (out, sample) in row.iter_mut().zip(src) {
                *out = sample.widen() as i32;
            }
        }),
    }
    Ok(())
}

/// Render interleaved 8-bit RGB pixels,
/// passing each channel through the table when present.
pub(crate) fn render_rgb(
    samples: &[u8],
    width: u32,
    height: u32,
    lut: Option<&dyn LookupTable>,
    output: &mut [i32],
    parallelism: &Parallelism,
) -> Result<()> {
    let width = check_output(width, height, output)?;
    match lut {
        Some(lut) => parallelism.for_each_row(output, width, |y, row| {
            let src = &samples[y * width * 3..(y + 1) * width * 3];
            for (out, rgb) in row.iter_mut().zip(src.chunks_exact(3)) {
                *out = pack_rgb(
                    lut.lookup(i64::from(rgb[0])),
                    lut.lookup(i64::from(rgb[1])),
                    lut.lookup(i64::from(rgb[2])),
                );
            }
        }),
        None => parallelism.for_each_row(output, width, |y, row| {
            let src = &samples[y * width * 3..(y + 1) * width * 3];
            for (out, rgb) in row.iter_mut().zip(src.chunks_exact(3)) {
                *out = pack_rgb(i32::from(rgb[0]), i32::from(rgb[1]), i32::from(rgb[2]));
            }
        }),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lut::FnLut;

    #[test]
    fn gray_identity_and_lut() {
        let samples: Vec<i16> = vec![-1, 0, 1, 2047, -2048, 7];
        let mut out = vec![0; 6];
        render_gray(&samples, 3, 2, None, &mut out, &Parallelism::Sequential).unwrap();
        assert_eq!(out, vec![-1, 0, 1, 2047, -2048, 7]);

        let lut = FnLut(|v: i64| (v + 2048) as i32);
        render_gray(&samples, 3, 2, Some(&lut), &mut out, &Parallelism::default()).unwrap();
        assert_eq!(out, vec![2047, 2048, 2049, 4095, 0, 2055]);
    }

    #[test]
    fn rgb_packing() {
        let samples = [1, 2, 3, 0xFF, 0x80, 0x00];
        let mut out = vec![0; 2];
        render_rgb(&samples, 2, 1, None, &mut out, &Parallelism::Sequential).unwrap();
        assert_eq!(out, vec![0x010203, 0xFF8000]);

        let invert = FnLut(|v: i64| 255 - v as i32);
        render_rgb(&samples, 1, 2, Some(&invert), &mut out, &Parallelism::default()).unwrap();
        assert_eq!(out, vec![0xFEFDFC, 0x007FFF]);
    }

    #[test]
    fn wrong_output_size() {
        let mut out = vec![0; 5];
        let err = render_gray(&[0_u8; 6], 3, 2, None, &mut out, &Parallelism::Sequential);
        assert!(matches!(
            err,
            Err(crate::Error::OutputSizeMismatch {
                expected: 6,
                got: 5
            })
        ));
    }

    #[test]
    fn pack_masks_channels() {
        assert_eq!(pack_rgb(0x1FF, 0, 0), 0xFF0000);
        assert_eq!(pack_rgb(0, 0, -1), 0x0000FF);
    }
}
